//! pl Parser - recursive descent over the raw source text.
//!
//! There is no separate tokenizer pass: the parser looks at one character at
//! a time, skipping whitespace and `;` line comments between expressions.
//! Atoms are maximal runs of characters that are neither whitespace nor
//! parentheses, decoded as JSON scalars when possible and kept as symbols
//! otherwise.

use serde_json::Value as Json;

use crate::ast::{AstNode, Expr, Span};
use crate::diagnostics::{to_error_source, ErrorKind, PlError, SourceArc};
use crate::runtime::stack::ensure_sufficient_stack;
use crate::runtime::value::Value;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse exactly one expression. Trailing content other than whitespace and
/// comments is an error.
pub fn parse(source: &str) -> Result<AstNode, PlError> {
    Parser::new(source).parse_expression()
}

/// Parse a whole script: all top-level forms wrapped in an implicit `(do ...)`.
pub fn parse_program(source: &str) -> Result<AstNode, PlError> {
    Parser::new(source).parse_program()
}

/// Decodes a single atom's text into a literal or a symbol.
///
/// Decoding is strict JSON: `NaN`, `Infinity` and numbers outside the `f64`
/// range such as `1e400` are not scalars and stay symbols. Non-finite floats
/// only arise at run time.
///
/// ```rust
/// use pl::ast::Expr;
/// use pl::syntax::parser::decode_atom;
/// use pl::Value;
/// assert_eq!(decode_atom("12"), Expr::Literal(Value::Int(12)));
/// assert_eq!(decode_atom("1.5"), Expr::Literal(Value::Float(1.5)));
/// assert_eq!(decode_atom("foo"), Expr::Symbol("foo".into()));
/// ```
pub fn decode_atom(text: &str) -> Expr {
    let literal = match serde_json::from_str::<Json>(text) {
        Ok(Json::Null) => Some(Value::Null),
        Ok(Json::Bool(b)) => Some(Value::Bool(b)),
        Ok(Json::Number(n)) => n
            .as_i64()
            .map(Value::Int)
            .or_else(|| n.as_f64().map(Value::Float)),
        Ok(Json::String(s)) => Some(Value::Str(s)),
        // Arrays, objects and anything undecodable are identifiers.
        Ok(Json::Array(_)) | Ok(Json::Object(_)) | Err(_) => None,
    };
    match literal {
        Some(value) => Expr::Literal(value),
        None => Expr::Symbol(text.to_string()),
    }
}

/// Source-aware parser. Errors carry the named source for rendering.
pub struct Parser<'s> {
    text: &'s str,
    pos: usize,
    source: SourceArc,
}

impl<'s> Parser<'s> {
    pub fn new(text: &'s str) -> Self {
        Self::named("source", text)
    }

    pub fn named(name: impl AsRef<str>, text: &'s str) -> Self {
        Self {
            text,
            pos: 0,
            source: to_error_source(name, text),
        }
    }

    /// The named source errors from this parser point into.
    pub fn source(&self) -> &SourceArc {
        &self.source
    }

    pub fn parse_expression(mut self) -> Result<AstNode, PlError> {
        let node = self.parse_expr()?;
        self.skip_space();
        if self.pos < self.text.len() {
            let span = Span::new(self.pos, self.text.len());
            return Err(self.error(ErrorKind::TrailingContent, span));
        }
        Ok(node)
    }

    pub fn parse_program(mut self) -> Result<AstNode, PlError> {
        let mut items = vec![AstNode::new(Expr::Symbol("do".to_string()), Span::new(0, 0))];
        loop {
            self.skip_space();
            if self.pos >= self.text.len() {
                break;
            }
            items.push(self.parse_expr()?);
        }
        Ok(AstNode::new(Expr::List(items), Span::new(0, self.text.len())))
    }

    // ========================================================================
    // RECURSIVE DESCENT
    // ========================================================================

    fn parse_expr(&mut self) -> Result<AstNode, PlError> {
        ensure_sufficient_stack(|| self.parse_node())
    }

    fn parse_node(&mut self) -> Result<AstNode, PlError> {
        self.skip_space();
        match self.peek() {
            Some('(') => self.parse_list(),
            Some(')') => {
                let span = Span::new(self.pos, self.pos + 1);
                Err(self.error(ErrorKind::UnexpectedCloseParenthesis, span))
            }
            _ => self.parse_atom(),
        }
    }

    fn parse_list(&mut self) -> Result<AstNode, PlError> {
        let start = self.pos;
        self.bump('(');
        let mut items = Vec::new();
        loop {
            self.skip_space();
            match self.peek() {
                None => {
                    let span = Span::new(start, self.text.len());
                    return Err(self.error(ErrorKind::UnbalancedParenthesis, span));
                }
                Some(')') => {
                    self.bump(')');
                    break;
                }
                Some(_) => items.push(self.parse_expr()?),
            }
        }
        Ok(AstNode::new(Expr::List(items), Span::new(start, self.pos)))
    }

    fn parse_atom(&mut self) -> Result<AstNode, PlError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if is_atom_terminator(ch) {
                break;
            }
            self.bump(ch);
        }
        if start == self.pos {
            return Err(self.error(ErrorKind::EmptyProgram, Span::new(start, start)));
        }
        let span = Span::new(start, self.pos);
        Ok(AstNode::new(decode_atom(&self.text[start..self.pos]), span))
    }

    // ========================================================================
    // UTILITIES
    // ========================================================================

    /// Skip whitespace and line comments until a pass makes no progress.
    fn skip_space(&mut self) {
        loop {
            let save = self.pos;
            while let Some(ch) = self.peek() {
                if !ch.is_whitespace() {
                    break;
                }
                self.bump(ch);
            }
            if self.peek() == Some(';') {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump(ch);
                }
            }
            if self.pos == save {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn error(&self, kind: ErrorKind, span: Span) -> PlError {
        PlError::new(kind)
            .with_span(span)
            .with_source(SourceArc::clone(&self.source))
    }
}

fn is_atom_terminator(ch: char) -> bool {
    ch.is_whitespace() || ch == '(' || ch == ')'
}
