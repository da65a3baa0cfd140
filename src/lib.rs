//! # pl
//!
//! A minimal interpreter for a parenthesized scripting language: a
//! recursive-descent parser producing atoms and lists, and a tree-walking
//! evaluator with lexical scopes, loops and named functions.
//!
//! ```rust
//! use pl::{evaluate, parse_program, Env, EvalOptions, NullSink, Value};
//!
//! let ast = parse_program(
//!     "(def fib (n) (if (lt n 2) (return 1) (return (+ (+ (call fib (- n 1)) (call fib (- n 2))) 1))))
//!      (call fib 5)",
//! )
//! .unwrap();
//! let value = evaluate(&Env::new(), &ast, &mut NullSink, &EvalOptions::default()).unwrap();
//! assert_eq!(value, Value::Int(15));
//! ```

pub mod ast;
pub mod atoms;
pub mod cli;
pub mod diagnostics;
pub mod engine;
pub mod runtime;
pub mod syntax;
pub mod testing;

pub use crate::ast::{AstNode, Expr, Span, Spanned};
pub use crate::atoms::{NullSink, OutputSink};
pub use crate::cli::output::{OutputBuffer, StdoutSink};
pub use crate::diagnostics::{ErrorCategory, ErrorKind, PlError};
pub use crate::engine::{Engine, Program};
pub use crate::runtime::{evaluate, Env, EvalOptions, Flow, Value};
pub use crate::syntax::{parse, parse_program};
