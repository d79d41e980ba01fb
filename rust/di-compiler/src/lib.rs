//! DI Compiler
//!
//! Transforms DI source text into the syntax tree executed by the runtime:
//! [`Lexer`] produces the token stream, [`Parser`] builds a single root
//! scope node from it.

pub mod compiler;

pub use compiler::lexer::Lexer;
pub use compiler::parser::Parser;

use di_core::{DiResult, Node};

/// Lex and parse a complete source text into its root scope.
pub fn parse_source(source: &str) -> DiResult<Node> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;
    Parser::new(tokens).parse_program()
}
