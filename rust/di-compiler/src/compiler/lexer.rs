//! Position-tracking scanner for DI source code.
//!
//! The scanner is single-pass and eager: [`Lexer::tokenize`] returns the
//! full token stream, terminated by exactly one `Eof` token. Newlines and
//! `;` both produce `EndLine` tokens; spaces and tabs are skipped.
//!
//! A `#` followed by whitespace (or at end of line/file) opens a line
//! comment whose terminating newline is consumed without emitting an
//! `EndLine`; any other `#` is the cardinality operator. Block comments run
//! from `\*` to `*\` and do not nest.

use crate::compiler::tokens::{
    AddOp, AssignOp, Keyword, LogicalOp, MulOp, ShiftOp, Token, TokenKind,
};
use di_core::ast::{CmpOp, Pos};
use di_core::error::{DiError, DiResult};
use num_bigint::BigInt;

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.source.get(self.pos + 2).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.col)
    }

    /// Scan the whole source into tokens.
    pub fn tokenize(&mut self) -> DiResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            let pos = self.here();
            let Some(ch) = self.current() else {
                tokens.push(Token::new(TokenKind::Eof, pos));
                break;
            };
            let kind = match ch {
                '\n' | ';' => {
                    self.advance();
                    TokenKind::EndLine
                }
                '(' => {
                    self.advance();
                    TokenKind::OpenBracket
                }
                ')' => {
                    self.advance();
                    TokenKind::CloseBracket
                }
                '[' => {
                    self.advance();
                    TokenKind::OpenSquare
                }
                ']' => {
                    self.advance();
                    TokenKind::CloseSquare
                }
                '{' => {
                    self.advance();
                    TokenKind::OpenBrace
                }
                '}' => {
                    self.advance();
                    TokenKind::CloseBrace
                }
                ',' => {
                    self.advance();
                    TokenKind::Comma
                }
                '"' => self.read_string(pos)?,
                c if c.is_ascii_digit() => self.read_number(pos)?,
                c if c.is_alphabetic() || c == '_' => self.read_word(),
                _ => self.read_operator(pos)?,
            };
            tokens.push(Token::new(kind, pos));
        }
        Ok(tokens)
    }

    /// Skip spaces, tabs, and both comment forms.
    fn skip_trivia(&mut self) -> DiResult<()> {
        loop {
            match self.current() {
                Some(' ' | '\t' | '\r') => {
                    self.advance();
                }
                Some('\\') if self.peek() == Some('*') => {
                    let open = self.here();
                    self.advance();
                    self.advance();
                    loop {
                        match self.current() {
                            Some('*') if self.peek() == Some('\\') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => {
                                self.advance();
                            }
                            None => {
                                return Err(DiError::static_syntax(
                                    open,
                                    "unterminated block comment",
                                ))
                            }
                        }
                    }
                }
                Some('#') if matches!(self.peek(), None | Some(' ' | '\t' | '\r' | '\n')) => {
                    loop {
                        match self.advance() {
                            Some('\n') | None => break,
                            Some(_) => {}
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_number(&mut self, pos: Pos) -> DiResult<TokenKind> {
        if self.current() == Some('0') {
            let base = match self.peek() {
                Some('b') => 2,
                Some('q') => 4,
                Some('o') => 8,
                Some('x') => 16,
                _ => 0,
            };
            if base != 0 {
                self.advance();
                self.advance();
                let mut digits = String::new();
                while let Some(c) = self.current() {
                    if is_digit_in_base(c, base) {
                        digits.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
                return BigInt::parse_bytes(digits.as_bytes(), base)
                    .map(TokenKind::Integer)
                    .ok_or_else(|| {
                        DiError::static_syntax(pos, format!("invalid base-{base} integer literal"))
                    });
            }
        }

        let mut text = String::new();
        let mut saw_dot = false;
        let mut saw_exp = false;
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '.' && !saw_dot && !saw_exp {
                saw_dot = true;
                text.push(c);
                self.advance();
            } else if (c == 'e' || c == 'E') && !saw_exp {
                // An exponent marker only counts when a digit or sign follows.
                match self.peek() {
                    Some(d) if d.is_ascii_digit() => {}
                    Some('+' | '-') => {}
                    _ => break,
                }
                saw_exp = true;
                text.push(c);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.current() {
                    text.push(sign);
                    self.advance();
                }
            } else {
                break;
            }
        }

        if saw_dot || saw_exp {
            text.parse::<f64>().map(TokenKind::Float).map_err(|_| {
                DiError::static_syntax(pos, format!("invalid number literal '{text}'"))
            })
        } else {
            BigInt::parse_bytes(text.as_bytes(), 10)
                .map(TokenKind::Integer)
                .ok_or_else(|| {
                    DiError::static_syntax(pos, format!("invalid number literal '{text}'"))
                })
        }
    }

    fn read_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match word.as_str() {
            "and" => TokenKind::OpLogical(LogicalOp::And),
            "or" => TokenKind::OpLogical(LogicalOp::Or),
            "not" => TokenKind::OpLogical(LogicalOp::Not),
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            _ => match Keyword::from_word(&word) {
                Some(kw) => TokenKind::Keyword(kw),
                None => TokenKind::Identifier(word),
            },
        }
    }

    /// Read a `"…"` literal. Only `\\` and `\"` are escapes; any other
    /// backslash stands for itself. Strings may not span lines.
    fn read_string(&mut self, pos: Pos) -> DiResult<TokenKind> {
        self.advance();
        let mut content = String::new();
        loop {
            match self.current() {
                None | Some('\n') => {
                    return Err(DiError::static_syntax(pos, "unterminated string literal"))
                }
                Some('\\') => match self.peek() {
                    Some(escaped @ ('\\' | '"')) => {
                        content.push(escaped);
                        self.advance();
                        self.advance();
                    }
                    _ => {
                        content.push('\\');
                        self.advance();
                    }
                },
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    content.push(c);
                    self.advance();
                }
            }
        }
        Ok(TokenKind::String(content))
    }

    fn read_operator(&mut self, pos: Pos) -> DiResult<TokenKind> {
        let Some(ch) = self.current() else {
            return Err(DiError::static_syntax(pos, "unexpected end of input"));
        };
        let kind = match ch {
            '+' => {
                self.advance();
                TokenKind::OpAdd(AddOp::Add)
            }
            '-' => {
                self.advance();
                TokenKind::OpAdd(AddOp::Sub)
            }
            '&' => {
                self.advance();
                TokenKind::OpBitAnd
            }
            '^' => {
                self.advance();
                TokenKind::OpBitXor
            }
            '|' => {
                self.advance();
                TokenKind::OpBitOr
            }
            '~' => {
                self.advance();
                TokenKind::OpBitNot
            }
            '#' => {
                self.advance();
                TokenKind::OpIndex
            }
            '?' => {
                self.advance();
                TokenKind::OpCoalesce
            }
            '%' => {
                self.advance();
                TokenKind::OpMul(MulOp::Mod)
            }
            '@' => {
                self.advance();
                TokenKind::OpMul(MulOp::MatMul)
            }
            '*' => {
                self.advance();
                if self.current() == Some('*') {
                    self.advance();
                    TokenKind::OpPower
                } else {
                    TokenKind::OpMul(MulOp::Mul)
                }
            }
            '/' => {
                self.advance();
                if self.current() == Some('/') {
                    self.advance();
                    TokenKind::OpMul(MulOp::FloorDiv)
                } else {
                    TokenKind::OpMul(MulOp::Div)
                }
            }
            '<' => {
                self.advance();
                match self.current() {
                    Some('=') => {
                        self.advance();
                        TokenKind::OpComparison(CmpOp::Le)
                    }
                    Some('<') => {
                        self.advance();
                        TokenKind::OpShift(ShiftOp::Shl)
                    }
                    _ => TokenKind::OpComparison(CmpOp::Lt),
                }
            }
            '>' => {
                self.advance();
                match self.current() {
                    Some('=') => {
                        self.advance();
                        TokenKind::OpComparison(CmpOp::Ge)
                    }
                    Some('>') => {
                        self.advance();
                        TokenKind::OpShift(ShiftOp::Shr)
                    }
                    _ => TokenKind::OpComparison(CmpOp::Gt),
                }
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                self.advance();
                TokenKind::OpComparison(CmpOp::Ne)
            }
            '=' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.advance();
                    TokenKind::OpComparison(CmpOp::Eq)
                }
                Some(':') => {
                    self.advance();
                    self.advance();
                    TokenKind::OpAssign(AssignOp::Swap)
                }
                Some('>') => {
                    self.advance();
                    self.advance();
                    TokenKind::OpImplication
                }
                _ => return Err(unrecognized(pos, ch)),
            },
            ':' => {
                self.advance();
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::OpAssign(AssignOp::Assign)
                } else {
                    TokenKind::OpKeymap
                }
            }
            '.' => {
                self.advance();
                if self.current() == Some('.') && self.peek() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::OpEllipsis
                } else {
                    TokenKind::OpAttr
                }
            }
            _ => return Err(unrecognized(pos, ch)),
        };
        Ok(kind)
    }
}

fn unrecognized(pos: Pos, ch: char) -> DiError {
    DiError::static_syntax(pos, format!("unrecognized symbol '{ch}'"))
}

fn is_digit_in_base(c: char, base: u32) -> bool {
    match base {
        2 => matches!(c, '0' | '1'),
        4 => matches!(c, '0'..='3'),
        8 => matches!(c, '0'..='7'),
        16 => c.is_ascii_hexdigit(),
        _ => c.is_ascii_digit(),
    }
}
