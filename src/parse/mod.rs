pub mod ast;
mod error;
pub mod lexer;
pub mod notation;
mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;

/// Parses one command line.
pub fn parse(s: &str) -> Result<ast::Statement, ParseError> {
    Parser::new(s).parse()
}
