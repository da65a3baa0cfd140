//! AST module for the pl language
//!
//! The parser produces a homogeneous tree: every node is either an atom (a
//! decoded literal or a bare symbol) or a list of nodes. Nodes carry the byte
//! span they were read from so diagnostics can point back into the source.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::runtime::value::Value;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in the source code, as byte offsets.
///
/// # Examples
///
/// ```rust
/// use pl::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        miette::SourceSpan::new(span.start.into(), span.len())
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

/// Canonical AST node type.
pub type AstNode = Spanned<Expr>;

/// The core AST node for pl expressions.
///
/// `Literal` is the tagged literal form: an atom whose text decoded as a JSON
/// scalar. Any other atom is a `Symbol`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Expr {
    Literal(Value),
    Symbol(String),
    List(Vec<AstNode>),
}

// ============================================================================
// PUBLIC API IMPLEMENTATION
// ============================================================================

impl Expr {
    /// Returns the symbol text if this is a symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the items if this is a list.
    pub fn as_list(&self) -> Option<&[AstNode]> {
        match self {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Pretty-prints the expression as source text.
    ///
    /// Literals are re-encoded so the output parses back to the same tree.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pl::ast::Expr;
    /// use pl::Value;
    /// assert_eq!(Expr::Symbol("foo".to_string()).pretty(), "foo");
    /// assert_eq!(Expr::Literal(Value::Str("hi".into())).pretty(), "\"hi\"");
    /// ```
    pub fn pretty(&self) -> String {
        match self {
            Expr::Literal(value) => value.to_literal(),
            Expr::Symbol(name) => name.clone(),
            Expr::List(items) => Self::pretty_list(items),
        }
    }

    /// Helper for pretty-printing list expressions
    fn pretty_list(items: &[AstNode]) -> String {
        let inner = items
            .iter()
            .map(|item| item.value.pretty())
            .collect::<Vec<_>>()
            .join(" ");
        format!("({})", inner)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl AstNode {
    pub fn new(value: Expr, span: Span) -> Self {
        Spanned { value, span }
    }
}

// ============================================================================
// TESTS
// ============================================================================
