//! Runtime module for the pl language
//!
//! Values, the scope chain and the evaluator. Everything here operates on
//! already parsed [`AstNode`](crate::ast::AstNode)s.

pub mod env;
pub mod eval;
pub mod stack;
pub mod value;

pub use env::{BindError, Binding, Env, Function, Key};
pub use eval::{evaluate, EvalContext, EvalOptions, EvalResult, Flow};
pub use value::Value;
