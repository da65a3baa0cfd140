//! Runtime values.
//!
//! The value domain is closed: null, booleans, integers, floats and strings.
//! Lists only exist as code; functions live in scopes, not in values.

use std::fmt;

use serde::Serialize;

/// Represents a value in the pl runtime.
///
/// # Examples
///
/// ```rust
/// use pl::Value;
/// let n = Value::Int(3);
/// assert_eq!(n.type_name(), "Int");
/// assert!(Value::default().is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Truthiness used by `if`, `loop` and `not`.
    ///
    /// `false`, `null`, zero and the empty string are falsy.
    ///
    /// ```rust
    /// use pl::Value;
    /// assert!(!Value::Int(0).is_truthy());
    /// assert!(!Value::Str(String::new()).is_truthy());
    /// assert!(Value::Str("0".into()).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Encodes the value as source text that decodes back to the same value.
    ///
    /// Characters that would end an atom (whitespace and parentheses) are
    /// written as `\u` escapes.
    ///
    /// Non-finite floats have no literal form and are written as `inf`,
    /// `-inf` and `NaN`. The parser never produces them, so they only show up
    /// when a run-time value is printed back as source.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Str(s) => encode_string(s),
            other => other.to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    // `{:?}` switches to exponent form outside [1e-5, 1e16), which keeps a
    // float from printing as an integer.
    fn fmt_float(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
        if !n.is_finite() {
            write!(f, "{}", n)
        } else if n.fract() == 0.0 && n.abs() < 1e16 {
            write!(f, "{:.1}", n)
        } else {
            write!(f, "{:?}", n)
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(n) => Value::fmt_float(f, *n),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

fn encode_string(s: &str) -> String {
    let json = serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s));
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        if ch.is_whitespace() || ch == '(' || ch == ')' {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        } else {
            out.push(ch);
        }
    }
    out
}
