//! # pl Atom System
//!
//! Atoms are the primitive operators the evaluator applies to already
//! evaluated operands. The tables are fixed: each operator symbol resolves
//! through a static `match` to a [`BinaryAtom`] or [`UnaryAtom`].
//!
//! ## Module Structure
//!
//! - **`math`**: arithmetic (`+`, `-`, `*`, `/`, unary `-`)
//! - **`logic`**: comparison and logic (`eq`, `lt`, `and`, `not`, ...)
//!
//! Atoms report failures as bare [`ErrorKind`]s; the evaluator attaches the
//! span of the form that applied them.

use crate::ast::Span;
use crate::diagnostics::ErrorKind;
use crate::runtime::value::Value;

pub mod logic;
pub mod math;

// ============================================================================
// OUTPUT
// ============================================================================

/// Output sink for `print`, to make I/O testable and injectable.
pub trait OutputSink {
    fn emit(&mut self, text: &str, span: Option<&Span>);
}

/// A null output sink for testing or running without output.
pub struct NullSink;

impl OutputSink for NullSink {
    fn emit(&mut self, _text: &str, _span: Option<&Span>) {}
}

// ============================================================================
// OPERATOR TABLES
// ============================================================================

pub type AtomResult = Result<Value, ErrorKind>;

/// Operators applied to two evaluated operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryAtom {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
    And,
    Or,
}

impl BinaryAtom {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let atom = match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "eq" => Self::Eq,
            "ne" => Self::Ne,
            "ge" => Self::Ge,
            "gt" => Self::Gt,
            "le" => Self::Le,
            "lt" => Self::Lt,
            "and" => Self::And,
            "or" => Self::Or,
            _ => return None,
        };
        Some(atom)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ge => "ge",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    pub fn apply(&self, lhs: &Value, rhs: &Value) -> AtomResult {
        match self {
            Self::Add => math::add(lhs, rhs),
            Self::Sub => math::sub(lhs, rhs),
            Self::Mul => math::mul(lhs, rhs),
            Self::Div => math::div(lhs, rhs),
            Self::Eq => Ok(Value::Bool(logic::equals(lhs, rhs))),
            Self::Ne => Ok(Value::Bool(!logic::equals(lhs, rhs))),
            Self::Ge => logic::compare(self.symbol(), lhs, rhs, |o| o.is_ge()),
            Self::Gt => logic::compare(self.symbol(), lhs, rhs, |o| o.is_gt()),
            Self::Le => logic::compare(self.symbol(), lhs, rhs, |o| o.is_le()),
            Self::Lt => logic::compare(self.symbol(), lhs, rhs, |o| o.is_lt()),
            Self::And => logic::and(lhs, rhs),
            Self::Or => logic::or(lhs, rhs),
        }
    }
}

/// Operators applied to one evaluated operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryAtom {
    Neg,
    Not,
}

impl UnaryAtom {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Self::Neg),
            "not" => Some(Self::Not),
            _ => None,
        }
    }

    pub fn apply(&self, operand: &Value) -> AtomResult {
        match self {
            Self::Neg => math::neg(operand),
            Self::Not => Ok(logic::not(operand)),
        }
    }
}

/// Builds a type mismatch for an operator.
pub(crate) fn type_mismatch(operation: &str, expected: &str, found: &[&Value]) -> ErrorKind {
    let found = found
        .iter()
        .map(|value| value.type_name())
        .collect::<Vec<_>>()
        .join(" and ");
    ErrorKind::TypeMismatch {
        operation: operation.to_string(),
        expected: expected.to_string(),
        found,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_binary_symbol_round_trips() {
        for symbol in ["+", "-", "*", "/", "eq", "ne", "ge", "gt", "le", "lt", "and", "or"] {
            let atom = BinaryAtom::from_symbol(symbol).unwrap();
            assert_eq!(atom.symbol(), symbol);
        }
        assert!(BinaryAtom::from_symbol("mod").is_none());
        assert!(BinaryAtom::from_symbol("not").is_none());
    }

    #[test]
    fn unary_table_is_minus_and_not() {
        assert_eq!(UnaryAtom::from_symbol("-"), Some(UnaryAtom::Neg));
        assert_eq!(UnaryAtom::from_symbol("not"), Some(UnaryAtom::Not));
        assert_eq!(UnaryAtom::from_symbol("+"), None);
    }

    #[test]
    fn apply_dispatches_to_the_right_operation() {
        let add = BinaryAtom::Add.apply(&Value::Int(2), &Value::Int(3));
        assert_eq!(add, Ok(Value::Int(5)));
        let lt = BinaryAtom::Lt.apply(&Value::Int(2), &Value::Float(2.5));
        assert_eq!(lt, Ok(Value::Bool(true)));
        let ne = BinaryAtom::Ne.apply(&Value::Str("a".into()), &Value::Int(1));
        assert_eq!(ne, Ok(Value::Bool(true)));
        assert_eq!(UnaryAtom::Not.apply(&Value::Null), Ok(Value::Bool(true)));
    }

    #[test]
    fn type_mismatch_names_operand_types() {
        let err = type_mismatch("+", "numbers", &[&Value::Int(1), &Value::Null]);
        assert_eq!(
            err,
            ErrorKind::TypeMismatch {
                operation: "+".into(),
                expected: "numbers".into(),
                found: "Int and Null".into(),
            }
        );
    }
}
