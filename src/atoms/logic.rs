//! # Logic and Comparison Operations
//!
//! `eq`/`ne` are total: values of different kinds are simply unequal.
//! Ordering is defined for numbers and for strings. `and`/`or` evaluate
//! nothing themselves; both operands arrive already evaluated, so they never
//! short-circuit.
//!
//! ## Atoms Provided
//!
//! - **Equality**: `eq`, `ne`
//! - **Ordering**: `lt`, `le`, `gt`, `ge`
//! - **Logic**: `and`, `or`, `not`

use std::cmp::Ordering;

use crate::atoms::{type_mismatch, AtomResult};
use crate::runtime::value::Value;

// ============================================================================
// EQUALITY
// ============================================================================

/// Structural equality, numeric across `Int` and `Float`.
pub fn equals(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => a == b,
        _ if lhs.is_number() && rhs.is_number() => lhs.as_f64() == rhs.as_f64(),
        _ => lhs == rhs,
    }
}

// ============================================================================
// ORDERING
// ============================================================================

/// Orders two numbers or two strings and tests the ordering with `accept`.
///
/// Usage: (lt <a> <b>), (le <a> <b>), (gt <a> <b>), (ge <a> <b>)
pub fn compare(
    operation: &str,
    lhs: &Value,
    rhs: &Value,
    accept: fn(Ordering) -> bool,
) -> AtomResult {
    let ordering = match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (lhs.as_f64(), rhs.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => return Err(type_mismatch(operation, "two numbers or two strings", &[lhs, rhs])),
        },
    };
    // NaN compares false against everything.
    Ok(Value::Bool(ordering.is_some_and(accept)))
}

// ============================================================================
// LOGIC
// ============================================================================

/// Logical and on booleans, bitwise and on integers.
///
/// Usage: (and <a> <b>)
pub fn and(lhs: &Value, rhs: &Value) -> AtomResult {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a & b)),
        _ => Err(type_mismatch("and", "two booleans or two integers", &[lhs, rhs])),
    }
}

/// Logical or on booleans, bitwise or on integers.
///
/// Usage: (or <a> <b>)
pub fn or(lhs: &Value, rhs: &Value) -> AtomResult {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a | b)),
        _ => Err(type_mismatch("or", "two booleans or two integers", &[lhs, rhs])),
    }
}

/// Negates truthiness.
///
/// Usage: (not <a>)
///
/// Example:
///   (not 0) ; => true
///   (not "x") ; => false
pub fn not(operand: &Value) -> Value {
    Value::Bool(!operand.is_truthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorKind;

    fn lt(a: Value, b: Value) -> AtomResult {
        compare("lt", &a, &b, Ordering::is_lt)
    }

    #[test]
    fn equality_is_numeric_across_kinds() {
        assert!(equals(&Value::Int(2), &Value::Float(2.0)));
        assert!(!equals(&Value::Int(2), &Value::Float(2.5)));
        assert!(equals(&Value::Str("a".into()), &Value::Str("a".into())));
        assert!(equals(&Value::Null, &Value::Null));
    }

    #[test]
    fn different_kinds_are_unequal() {
        assert!(!equals(&Value::Int(1), &Value::Bool(true)));
        assert!(!equals(&Value::Int(0), &Value::Null));
        assert!(!equals(&Value::Str("1".into()), &Value::Int(1)));
    }

    #[test]
    fn ordering_numbers_and_strings() {
        assert_eq!(lt(Value::Int(1), Value::Int(2)), Ok(Value::Bool(true)));
        assert_eq!(lt(Value::Float(2.5), Value::Int(2)), Ok(Value::Bool(false)));
        assert_eq!(
            lt(Value::Str("abc".into()), Value::Str("abd".into())),
            Ok(Value::Bool(true))
        );
        let ge = compare("ge", &Value::Int(3), &Value::Int(3), Ordering::is_ge);
        assert_eq!(ge, Ok(Value::Bool(true)));
    }

    #[test]
    fn ordering_rejects_mixed_or_unordered_kinds() {
        assert!(matches!(
            lt(Value::Str("a".into()), Value::Int(1)),
            Err(ErrorKind::TypeMismatch { .. })
        ));
        assert!(matches!(
            lt(Value::Bool(false), Value::Bool(true)),
            Err(ErrorKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn nan_is_unordered() {
        assert_eq!(lt(Value::Float(f64::NAN), Value::Int(1)), Ok(Value::Bool(false)));
    }

    #[test]
    fn and_or_on_booleans_and_integers() {
        assert_eq!(and(&Value::Bool(true), &Value::Bool(false)), Ok(Value::Bool(false)));
        assert_eq!(or(&Value::Bool(true), &Value::Bool(false)), Ok(Value::Bool(true)));
        assert_eq!(and(&Value::Int(6), &Value::Int(3)), Ok(Value::Int(2)));
        assert_eq!(or(&Value::Int(4), &Value::Int(1)), Ok(Value::Int(5)));
        assert!(matches!(
            and(&Value::Bool(true), &Value::Int(1)),
            Err(ErrorKind::TypeMismatch { .. })
        ));
    }

    #[test]
    fn not_uses_truthiness() {
        assert_eq!(not(&Value::Int(0)), Value::Bool(true));
        assert_eq!(not(&Value::Str(String::new())), Value::Bool(true));
        assert_eq!(not(&Value::Float(0.5)), Value::Bool(false));
        assert_eq!(not(&Value::Bool(true)), Value::Bool(false));
    }
}
