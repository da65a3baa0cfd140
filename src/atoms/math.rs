//! # Mathematical Operations
//!
//! Integer arithmetic is checked; any float operand makes the result a
//! float. Division is always true division.
//!
//! ## Atoms Provided
//!
//! - **Arithmetic**: `+`, `-`, `*`, `/`
//! - **Negation**: unary `-`

use crate::atoms::{type_mismatch, AtomResult};
use crate::diagnostics::ErrorKind;
use crate::runtime::value::Value;

// ============================================================================
// ARITHMETIC OPERATIONS
// ============================================================================

/// Adds numbers or concatenates strings.
///
/// Usage: (+ <a> <b>)
///
/// Example:
///   (+ 1 2) ; => 3
///   (+ 1 0.5) ; => 1.5
///   (+ "ab" "cd") ; => "abcd"
pub fn add(lhs: &Value, rhs: &Value) -> AtomResult {
    if let (Value::Str(a), Value::Str(b)) = (lhs, rhs) {
        return Ok(Value::Str(format!("{}{}", a, b)));
    }
    numeric("+", lhs, rhs, i64::checked_add, |a, b| a + b)
        .map_err(|_| type_mismatch("+", "two numbers or two strings", &[lhs, rhs]))
        .and_then(|result| result)
}

/// Subtracts two numbers.
///
/// Usage: (- <a> <b>)
pub fn sub(lhs: &Value, rhs: &Value) -> AtomResult {
    numeric_only("-", lhs, rhs, i64::checked_sub, |a, b| a - b)
}

/// Multiplies two numbers.
///
/// Usage: (* <a> <b>)
pub fn mul(lhs: &Value, rhs: &Value) -> AtomResult {
    numeric_only("*", lhs, rhs, i64::checked_mul, |a, b| a * b)
}

/// Divides two numbers, always producing a float.
///
/// Usage: (/ <a> <b>)
///
/// Example:
///   (/ 7 2) ; => 3.5
///   (/ 6 3) ; => 2.0
/// Note: Errors on division by zero.
pub fn div(lhs: &Value, rhs: &Value) -> AtomResult {
    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(type_mismatch("/", "two numbers", &[lhs, rhs]));
    };
    if b == 0.0 {
        return Err(ErrorKind::DivisionByZero);
    }
    Ok(Value::Float(a / b))
}

/// Negates a number.
///
/// Usage: (- <a>)
pub fn neg(operand: &Value) -> AtomResult {
    match operand {
        Value::Int(i) => i.checked_neg().map(Value::Int).ok_or_else(|| overflow("-")),
        Value::Float(f) => Ok(Value::Float(-f)),
        other => Err(type_mismatch("-", "a number", &[other])),
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn overflow(operation: &str) -> ErrorKind {
    ErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    }
}

fn numeric_only(
    operation: &str,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> AtomResult {
    numeric(operation, lhs, rhs, int_op, float_op)
        .map_err(|_| type_mismatch(operation, "two numbers", &[lhs, rhs]))
        .and_then(|result| result)
}

/// Applies a numeric operation. The outer error means "not two numbers";
/// the inner result carries overflow.
fn numeric(
    operation: &str,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<AtomResult, ()> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(int_op(*a, *b)
            .map(Value::Int)
            .ok_or_else(|| overflow(operation))),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => Ok(Ok(Value::Float(float_op(a, b)))),
            _ => Err(()),
        },
    }
}
