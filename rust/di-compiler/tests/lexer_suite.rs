//! Scanner tests: token kinds, literal decoding, both comment forms, and
//! error positions.

use di_compiler::compiler::lexer::Lexer;
use di_compiler::compiler::tokens::{
    AddOp, AssignOp, Keyword, LogicalOp, MulOp, ShiftOp, TokenKind,
};
use di_core::ast::CmpOp;
use di_core::error::{DiError, ErrorKind};
use num_bigint::BigInt;

fn lex(src: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(src);
    lexer
        .tokenize()
        .expect("lex failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn lex_err(src: &str) -> DiError {
    let mut lexer = Lexer::new(src);
    lexer.tokenize().expect_err("expected a lex error")
}

fn int(v: i64) -> TokenKind {
    TokenKind::Integer(BigInt::from(v))
}

// ============================================================================
// Basic stream shape
// ============================================================================

#[test]
fn empty_source_yields_single_eof() {
    assert_eq!(lex(""), vec![TokenKind::Eof]);
}

#[test]
fn stream_always_ends_with_eof() {
    for src in ["", "1", "a := 13", "\n\n\n", "# only a comment"] {
        let kinds = lex(src);
        assert!(!kinds.is_empty());
        assert_eq!(kinds.last(), Some(&TokenKind::Eof), "source: {src:?}");
    }
}

#[test]
fn assignment_statement_tokens() {
    assert_eq!(
        lex("a := 13; 2 * a"),
        vec![
            TokenKind::Identifier("a".into()),
            TokenKind::OpAssign(AssignOp::Assign),
            int(13),
            TokenKind::EndLine,
            int(2),
            TokenKind::OpMul(MulOp::Mul),
            TokenKind::Identifier("a".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn newline_and_semicolon_both_end_lines() {
    assert_eq!(
        lex("1\n2;3"),
        vec![
            int(1),
            TokenKind::EndLine,
            int(2),
            TokenKind::EndLine,
            int(3),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn positions_are_one_based_and_track_lines() {
    let mut lexer = Lexer::new("ab\n  cd");
    let tokens = lexer.tokenize().expect("lex failed");
    assert_eq!((tokens[0].pos.line, tokens[0].pos.col), (1, 1));
    // EndLine for the newline
    assert_eq!((tokens[1].pos.line, tokens[1].pos.col), (1, 3));
    assert_eq!((tokens[2].pos.line, tokens[2].pos.col), (2, 3));
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn decimal_integers_and_floats() {
    assert_eq!(lex("42"), vec![int(42), TokenKind::Eof]);
    assert_eq!(lex("1.25"), vec![TokenKind::Float(1.25), TokenKind::Eof]);
    assert_eq!(lex("5."), vec![TokenKind::Float(5.0), TokenKind::Eof]);
}

#[test]
fn exponent_notation() {
    assert_eq!(lex("1e3"), vec![TokenKind::Float(1000.0), TokenKind::Eof]);
    assert_eq!(lex("2.5e-2"), vec![TokenKind::Float(0.025), TokenKind::Eof]);
    assert_eq!(lex("1E+2"), vec![TokenKind::Float(100.0), TokenKind::Eof]);
}

#[test]
fn bare_e_after_digits_is_an_identifier() {
    // `1e` is the integer 1 followed by the identifier `e`.
    assert_eq!(
        lex("1e"),
        vec![int(1), TokenKind::Identifier("e".into()), TokenKind::Eof]
    );
}

#[test]
fn base_prefixes() {
    assert_eq!(lex("0b1001011"), vec![int(0b1001011), TokenKind::Eof]);
    assert_eq!(lex("0o17"), vec![int(0o17), TokenKind::Eof]);
    assert_eq!(lex("0q123"), vec![int(1 * 16 + 2 * 4 + 3), TokenKind::Eof]);
    assert_eq!(lex("0xFF"), vec![int(255), TokenKind::Eof]);
    assert_eq!(lex("0xff"), vec![int(255), TokenKind::Eof]);
}

#[test]
fn base_prefix_without_digits_is_an_error() {
    let err = lex_err("0x");
    assert_eq!(err.kind, ErrorKind::StaticSyntax);
    let err = lex_err("0b2");
    assert_eq!(err.kind, ErrorKind::StaticSyntax);
}

#[test]
fn big_integer_literal_is_exact() {
    let kinds = lex("123456789012345678901234567890");
    let expected: BigInt = "123456789012345678901234567890".parse().expect("bigint");
    assert_eq!(kinds[0], TokenKind::Integer(expected));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn string_content_is_unescaped() {
    assert_eq!(
        lex(r#""hello world""#),
        vec![TokenKind::String("hello world".into()), TokenKind::Eof]
    );
    assert_eq!(
        lex(r#""a\"b""#),
        vec![TokenKind::String("a\"b".into()), TokenKind::Eof]
    );
    assert_eq!(
        lex(r#""a\\b""#),
        vec![TokenKind::String("a\\b".into()), TokenKind::Eof]
    );
}

#[test]
fn lone_backslash_stands_for_itself() {
    assert_eq!(
        lex(r#""a\nb""#),
        vec![TokenKind::String("a\\nb".into()), TokenKind::Eof]
    );
}

#[test]
fn unterminated_string_is_an_error() {
    assert_eq!(lex_err("\"abc").kind, ErrorKind::StaticSyntax);
    assert_eq!(lex_err("\"abc\ndef\"").kind, ErrorKind::StaticSyntax);
    // An escaped closing quote leaves the string open.
    assert_eq!(lex_err(r#""abc\""#).kind, ErrorKind::StaticSyntax);
}

// ============================================================================
// Words
// ============================================================================

#[test]
fn keywords_literals_and_identifiers() {
    assert_eq!(
        lex("if elif else while function class promise"),
        vec![
            TokenKind::Keyword(Keyword::If),
            TokenKind::Keyword(Keyword::Elif),
            TokenKind::Keyword(Keyword::Else),
            TokenKind::Keyword(Keyword::While),
            TokenKind::Keyword(Keyword::Function),
            TokenKind::Keyword(Keyword::Class),
            TokenKind::Keyword(Keyword::Promise),
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        lex("and or not true false null"),
        vec![
            TokenKind::OpLogical(LogicalOp::And),
            TokenKind::OpLogical(LogicalOp::Or),
            TokenKind::OpLogical(LogicalOp::Not),
            TokenKind::Boolean(true),
            TokenKind::Boolean(false),
            TokenKind::Null,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        lex("_x strangely_namedVariable123"),
        vec![
            TokenKind::Identifier("_x".into()),
            TokenKind::Identifier("strangely_namedVariable123".into()),
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn compound_operators() {
    assert_eq!(
        lex(":= =: == != <= >= << >> ** // => ..."),
        vec![
            TokenKind::OpAssign(AssignOp::Assign),
            TokenKind::OpAssign(AssignOp::Swap),
            TokenKind::OpComparison(CmpOp::Eq),
            TokenKind::OpComparison(CmpOp::Ne),
            TokenKind::OpComparison(CmpOp::Le),
            TokenKind::OpComparison(CmpOp::Ge),
            TokenKind::OpShift(ShiftOp::Shl),
            TokenKind::OpShift(ShiftOp::Shr),
            TokenKind::OpPower,
            TokenKind::OpMul(MulOp::FloorDiv),
            TokenKind::OpImplication,
            TokenKind::OpEllipsis,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn single_char_operators() {
    assert_eq!(
        lex("+ - * / % @ & | ^ ~ < > . , : ?"),
        vec![
            TokenKind::OpAdd(AddOp::Add),
            TokenKind::OpAdd(AddOp::Sub),
            TokenKind::OpMul(MulOp::Mul),
            TokenKind::OpMul(MulOp::Div),
            TokenKind::OpMul(MulOp::Mod),
            TokenKind::OpMul(MulOp::MatMul),
            TokenKind::OpBitAnd,
            TokenKind::OpBitOr,
            TokenKind::OpBitXor,
            TokenKind::OpBitNot,
            TokenKind::OpComparison(CmpOp::Lt),
            TokenKind::OpComparison(CmpOp::Gt),
            TokenKind::OpAttr,
            TokenKind::Comma,
            TokenKind::OpKeymap,
            TokenKind::OpCoalesce,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn unrecognized_symbol_reports_position() {
    let err = lex_err("a := $");
    assert_eq!(err.kind, ErrorKind::StaticSyntax);
    assert_eq!((err.line, err.col), (1, 6));
    assert!(err.message.contains('$'));
}

// ============================================================================
// Comments and the `#` operator
// ============================================================================

#[test]
fn line_comment_swallows_its_newline() {
    // The comment's own newline produces no EndLine token.
    assert_eq!(lex("# note\n1"), vec![int(1), TokenKind::Eof]);
}

#[test]
fn newline_after_comment_line_still_separates() {
    assert_eq!(
        lex("1\n# note\n2"),
        vec![int(1), TokenKind::EndLine, int(2), TokenKind::Eof]
    );
}

#[test]
fn hash_before_expression_is_the_length_operator() {
    assert_eq!(
        lex("#xs"),
        vec![
            TokenKind::OpIndex,
            TokenKind::Identifier("xs".into()),
            TokenKind::Eof
        ]
    );
    // With a space it is a comment instead.
    assert_eq!(lex("# xs"), vec![TokenKind::Eof]);
}

#[test]
fn block_comment_is_skipped() {
    assert_eq!(
        lex("1 \\* anything\nat all *\\ + 2"),
        vec![int(1), TokenKind::OpAdd(AddOp::Add), int(2), TokenKind::Eof]
    );
}

#[test]
fn unterminated_block_comment_is_an_error() {
    assert_eq!(lex_err("1 \\* never closed").kind, ErrorKind::StaticSyntax);
}
