//! Token definitions for the DI lexer.

use di_core::ast::{CmpOp, Pos};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved words. `Promise` is reserved but accepted by no grammar rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    If,
    Elif,
    Else,
    While,
    Function,
    Class,
    Promise,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Keyword> {
        match word {
            "if" => Some(Keyword::If),
            "elif" => Some(Keyword::Elif),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            "function" => Some(Keyword::Function),
            "class" => Some(Keyword::Class),
            "promise" => Some(Keyword::Promise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Function => "function",
            Keyword::Class => "class",
            Keyword::Promise => "promise",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

/// `:=` assigns and yields the new value; `=:` assigns and yields the
/// target's previous value (the swap form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Swap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MulOp {
    Mul,
    Div,
    FloorDiv,
    Mod,
    MatMul,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftOp {
    Shl,
    Shr,
}

/// Token kinds. Literal-bearing kinds carry their decoded payload; the
/// `Display` impl renders the surface lexeme for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    Empty,
    String(String),
    Integer(BigInt),
    Float(f64),
    Boolean(bool),
    Null,
    Comma,
    EndLine,
    OpenBracket,
    CloseBracket,
    OpenSquare,
    CloseSquare,
    OpenBrace,
    CloseBrace,
    OpAssign(AssignOp),
    OpKeymap,
    OpBitOr,
    OpBitXor,
    OpBitAnd,
    OpLogical(LogicalOp),
    OpComparison(CmpOp),
    OpShift(ShiftOp),
    OpAdd(AddOp),
    OpMul(MulOp),
    OpPower,
    OpBitNot,
    /// The `#` cardinality prefix.
    OpIndex,
    OpCoalesce,
    OpAttr,
    OpEllipsis,
    OpImplication,
    Keyword(Keyword),
    Identifier(String),
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Empty => f.write_str("<empty>"),
            TokenKind::String(s) => write!(f, "\"{s}\""),
            TokenKind::Integer(i) => write!(f, "{i}"),
            TokenKind::Float(x) => write!(f, "{x}"),
            TokenKind::Boolean(true) => f.write_str("true"),
            TokenKind::Boolean(false) => f.write_str("false"),
            TokenKind::Null => f.write_str("null"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::EndLine => f.write_str(";"),
            TokenKind::OpenBracket => f.write_str("("),
            TokenKind::CloseBracket => f.write_str(")"),
            TokenKind::OpenSquare => f.write_str("["),
            TokenKind::CloseSquare => f.write_str("]"),
            TokenKind::OpenBrace => f.write_str("{"),
            TokenKind::CloseBrace => f.write_str("}"),
            TokenKind::OpAssign(AssignOp::Assign) => f.write_str(":="),
            TokenKind::OpAssign(AssignOp::Swap) => f.write_str("=:"),
            TokenKind::OpKeymap => f.write_str(":"),
            TokenKind::OpBitOr => f.write_str("|"),
            TokenKind::OpBitXor => f.write_str("^"),
            TokenKind::OpBitAnd => f.write_str("&"),
            TokenKind::OpLogical(LogicalOp::And) => f.write_str("and"),
            TokenKind::OpLogical(LogicalOp::Or) => f.write_str("or"),
            TokenKind::OpLogical(LogicalOp::Not) => f.write_str("not"),
            TokenKind::OpComparison(op) => write!(f, "{op}"),
            TokenKind::OpShift(ShiftOp::Shl) => f.write_str("<<"),
            TokenKind::OpShift(ShiftOp::Shr) => f.write_str(">>"),
            TokenKind::OpAdd(AddOp::Add) => f.write_str("+"),
            TokenKind::OpAdd(AddOp::Sub) => f.write_str("-"),
            TokenKind::OpMul(MulOp::Mul) => f.write_str("*"),
            TokenKind::OpMul(MulOp::Div) => f.write_str("/"),
            TokenKind::OpMul(MulOp::FloorDiv) => f.write_str("//"),
            TokenKind::OpMul(MulOp::Mod) => f.write_str("%"),
            TokenKind::OpMul(MulOp::MatMul) => f.write_str("@"),
            TokenKind::OpPower => f.write_str("**"),
            TokenKind::OpBitNot => f.write_str("~"),
            TokenKind::OpIndex => f.write_str("#"),
            TokenKind::OpCoalesce => f.write_str("?"),
            TokenKind::OpAttr => f.write_str("."),
            TokenKind::OpEllipsis => f.write_str("..."),
            TokenKind::OpImplication => f.write_str("=>"),
            TokenKind::Keyword(kw) => f.write_str(kw.as_str()),
            TokenKind::Identifier(name) => f.write_str(name),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos) -> Self {
        Self { kind, pos }
    }
}
