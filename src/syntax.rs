//! Syntax module for the pl language
//!
//! Turns source text into [`AstNode`](crate::ast::AstNode) trees. The parser
//! is purely syntactic; names are only resolved during evaluation.

pub mod parser;

pub use parser::{decode_atom, parse, parse_program, Parser};
