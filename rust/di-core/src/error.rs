//! The single user-visible error type of the interpreter.
//!
//! Every failure a DI program can provoke — from an unterminated string to a
//! zero division deep inside a matrix multiply — surfaces as a [`DiError`]
//! carrying its category and the source position of the construct that
//! caused it.

use crate::ast::Pos;
use std::fmt;
use thiserror::Error;

/// Category of a [`DiError`], mirrored in its rendered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Lexer or parser failure.
    StaticSyntax,
    /// Assignment-target shape error discovered at evaluation time
    /// (unassignable expression, bad unpack arity, multiple splats).
    RuntimeSyntax,
    /// Identifier not bound in the environment.
    Name,
    /// Operator or value type mismatch, including calling a non-callable.
    Type,
    /// Dimension mismatch in list arithmetic or matrix multiplication.
    Value,
    /// `/`, `//` or `%` with a zero divisor.
    ZeroDivision,
    /// Subscript out of range or missing key/attribute.
    Index,
    /// Call arity does not match the parameter count.
    FunctionArgsCount,
    /// Evaluation resource failure (call depth exhausted).
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::StaticSyntax => "StaticSyntaxError",
            ErrorKind::RuntimeSyntax => "RuntimeSyntaxError",
            ErrorKind::Name => "NameError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Value => "ValueError",
            ErrorKind::ZeroDivision => "ZeroDivisionError",
            ErrorKind::Index => "IndexError",
            ErrorKind::FunctionArgsCount => "FunctionArgsCountError",
            ErrorKind::Runtime => "RuntimeError",
        };
        f.write_str(name)
    }
}

/// A located DI error: what went wrong, and where in the source.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind} at line {line}, col {col}: {message}")]
pub struct DiError {
    pub kind: ErrorKind,
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl DiError {
    pub fn new(kind: ErrorKind, pos: Pos, message: impl Into<String>) -> Self {
        Self {
            kind,
            line: pos.line,
            col: pos.col,
            message: message.into(),
        }
    }

    pub fn static_syntax(pos: Pos, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StaticSyntax, pos, message)
    }

    pub fn runtime_syntax(pos: Pos, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuntimeSyntax, pos, message)
    }

    pub fn name(pos: Pos, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, pos, message)
    }

    pub fn type_error(pos: Pos, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, pos, message)
    }

    pub fn args_count(pos: Pos, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FunctionArgsCount, pos, message)
    }

    pub fn runtime(pos: Pos, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, pos, message)
    }
}

pub type DiResult<T> = Result<T, DiError>;

/// A not-yet-located error produced by value operations.
///
/// Value arithmetic has no idea where in the source it is running; the
/// evaluator converts an `OpError` into a [`DiError`] with [`OpError::at`],
/// supplying the position of the offending node.
#[derive(Debug, Clone, PartialEq)]
pub struct OpError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OpError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ZeroDivision, message)
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message)
    }

    /// Attach a source position, producing the user-visible error.
    pub fn at(self, pos: Pos) -> DiError {
        DiError::new(self.kind, pos, self.message)
    }
}

pub type OpResult<T> = Result<T, OpError>;
