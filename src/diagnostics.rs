//! Unified, `miette`-based diagnostics for pl.
//!
//! Every failure in the pipeline, from a stray parenthesis to a `break`
//! outside a loop, is a [`PlError`]: an [`ErrorKind`] plus the optional span,
//! source and help text used when rendering a report.
//!
//! # Construction
//!
//! - Start from the kind: `PlError::new(ErrorKind::EmptyExpression)`.
//! - Attach location with `with_span` and the program text with `with_source`.
//! - The parser and evaluator attach both. `with_help` replaces the kind's
//!   built-in hint when the context knows better.
//!
//! ```rust
//! use pl::diagnostics::{ErrorCategory, ErrorKind, PlError};
//! let err = PlError::new(ErrorKind::DivisionByZero);
//! assert_eq!(err.kind.category(), ErrorCategory::Runtime);
//! assert_eq!(err.to_string(), "division by zero");
//! ```

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::Span;

// Type aliases for clarity and brevity
pub type SourceArc = Arc<NamedSource<String>>;

/// Converts a source string into a shared `NamedSource` for error contexts.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(name.as_ref(), source.as_ref().to_string()))
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// What went wrong.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Syntax errors
    UnbalancedParenthesis,
    UnexpectedCloseParenthesis,
    EmptyProgram,
    TrailingContent,

    // Runtime errors
    UndefinedName { name: String },
    UndefinedFunction { name: String, arity: usize },
    DuplicateName { name: String },
    DuplicateFunction { name: String, arity: usize },
    InvalidArgumentList { reason: String },
    InvalidName { form: String, found: String },
    EmptyExpression,
    UnknownExpression { head: String },
    MisplacedControlFlow { keyword: String },
    TypeMismatch { operation: String, expected: String, found: String },
    DivisionByZero,
    IntegerOverflow { operation: String },
    RecursionLimit { limit: usize },

    // Host errors
    Io { path: String, message: String },

    // Script test errors
    InvalidDirective { directive: String, message: String },
}

/// Coarse grouping used for error codes and test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Runtime,
    Io,
    Test,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Syntax => "syntax",
            ErrorCategory::Runtime => "runtime",
            ErrorCategory::Io => "io",
            ErrorCategory::Test => "test",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnbalancedParenthesis
            | Self::UnexpectedCloseParenthesis
            | Self::EmptyProgram
            | Self::TrailingContent => ErrorCategory::Syntax,

            Self::UndefinedName { .. }
            | Self::UndefinedFunction { .. }
            | Self::DuplicateName { .. }
            | Self::DuplicateFunction { .. }
            | Self::InvalidArgumentList { .. }
            | Self::InvalidName { .. }
            | Self::EmptyExpression
            | Self::UnknownExpression { .. }
            | Self::MisplacedControlFlow { .. }
            | Self::TypeMismatch { .. }
            | Self::DivisionByZero
            | Self::IntegerOverflow { .. }
            | Self::RecursionLimit { .. } => ErrorCategory::Runtime,

            Self::Io { .. } => ErrorCategory::Io,

            Self::InvalidDirective { .. } => ErrorCategory::Test,
        }
    }

    /// Error code suffix; the full code is `pl::<category>::<suffix>`.
    pub const fn code_suffix(&self) -> &'static str {
        match self {
            Self::UnbalancedParenthesis => "unbalanced_parenthesis",
            Self::UnexpectedCloseParenthesis => "unexpected_close_parenthesis",
            Self::EmptyProgram => "empty_program",
            Self::TrailingContent => "trailing_content",
            // Unknown variables and unknown (name, arity) pairs are the same class.
            Self::UndefinedName { .. } | Self::UndefinedFunction { .. } => "undefined_name",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::DuplicateFunction { .. } => "duplicate_function",
            Self::InvalidArgumentList { .. } => "invalid_argument_list",
            Self::InvalidName { .. } => "invalid_name",
            Self::EmptyExpression => "empty_expression",
            Self::UnknownExpression { .. } => "unknown_expression",
            Self::MisplacedControlFlow { .. } => "misplaced_control_flow",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::DivisionByZero => "division_by_zero",
            Self::IntegerOverflow { .. } => "integer_overflow",
            Self::RecursionLimit { .. } => "recursion_limit",
            Self::Io { .. } => "read",
            Self::InvalidDirective { .. } => "invalid_directive",
        }
    }

    /// Full diagnostic code, e.g. `pl::runtime::undefined_name`.
    pub fn code(&self) -> String {
        format!("pl::{}::{}", self.category(), self.code_suffix())
    }

    /// Short text for the primary label.
    fn label(&self) -> &'static str {
        match self {
            Self::UnbalancedParenthesis => "this list is never closed",
            Self::UnexpectedCloseParenthesis => "no matching `(`",
            Self::EmptyProgram => "expected an expression here",
            Self::TrailingContent => "unexpected content after the expression",
            Self::UndefinedName { .. } | Self::UndefinedFunction { .. } => "not defined",
            Self::DuplicateName { .. } | Self::DuplicateFunction { .. } => "already defined here",
            Self::InvalidArgumentList { .. } => "invalid parameter list",
            Self::InvalidName { .. } => "expected a name",
            Self::EmptyExpression => "empty expression",
            Self::UnknownExpression { .. } => "unknown expression",
            Self::MisplacedControlFlow { .. } => "used outside its construct",
            Self::TypeMismatch { .. } => "wrong operand type",
            Self::DivisionByZero => "division by zero",
            Self::IntegerOverflow { .. } => "overflows a 64-bit integer",
            Self::RecursionLimit { .. } => "call nested too deeply",
            Self::Io { .. } => "unreadable",
            Self::InvalidDirective { .. } => "invalid directive",
        }
    }

    /// Built-in hint shown when the error carries no explicit help.
    fn default_help(&self) -> Option<String> {
        match self {
            Self::DuplicateName { name } => Some(format!(
                "use `(set {} ...)` to change an existing variable, or declare it in an inner block",
                name
            )),
            Self::DuplicateFunction { name, arity } => Some(format!(
                "`{}` already takes {} argument(s) in this scope; define it with a different arity or in an inner block",
                name, arity
            )),
            Self::MisplacedControlFlow { keyword } if keyword == "return" => {
                Some("`return` is only valid inside a function body".to_string())
            }
            Self::MisplacedControlFlow { keyword } => Some(format!(
                "`{}` is only valid inside a `loop` in the same function",
                keyword
            )),
            Self::UnknownExpression { .. } => Some(
                "expected a special form such as `do`, `var`, `if`, `loop`, `def` or `call`, with the right number of elements"
                    .to_string(),
            ),
            Self::TrailingContent => {
                Some("a single expression was expected; wrap several forms in `(do ...)`".to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnbalancedParenthesis => write!(f, "unbalanced parenthesis"),
            ErrorKind::UnexpectedCloseParenthesis => write!(f, "bad parenthesis: unexpected `)`"),
            ErrorKind::EmptyProgram => write!(f, "empty program"),
            ErrorKind::TrailingContent => write!(f, "trailing garbage after expression"),
            ErrorKind::UndefinedName { name } => write!(f, "undefined name '{}'", name),
            ErrorKind::UndefinedFunction { name, arity } => write!(
                f,
                "undefined function '{}' taking {} argument(s)",
                name, arity
            ),
            ErrorKind::DuplicateName { name } => write!(f, "duplicated name '{}'", name),
            ErrorKind::DuplicateFunction { name, arity } => write!(
                f,
                "duplicated function '{}' taking {} argument(s)",
                name, arity
            ),
            ErrorKind::InvalidArgumentList { reason } => {
                write!(f, "invalid argument list: {}", reason)
            }
            ErrorKind::InvalidName { form, found } => {
                write!(f, "`{}` expects a name, found {}", form, found)
            }
            ErrorKind::EmptyExpression => write!(f, "empty list cannot be evaluated"),
            ErrorKind::UnknownExpression { head } => write!(f, "unknown expression '{}'", head),
            ErrorKind::MisplacedControlFlow { keyword } => {
                write!(f, "`{}` used outside of its construct", keyword)
            }
            ErrorKind::TypeMismatch {
                operation,
                expected,
                found,
            } => write!(
                f,
                "type error in `{}`: expected {}, found {}",
                operation, expected, found
            ),
            ErrorKind::DivisionByZero => write!(f, "division by zero"),
            ErrorKind::IntegerOverflow { operation } => {
                write!(f, "integer overflow in `{}`", operation)
            }
            ErrorKind::RecursionLimit { limit } => {
                write!(f, "recursion limit of {} nested calls exceeded", limit)
            }
            ErrorKind::Io { path, message } => write!(f, "cannot read '{}': {}", path, message),
            ErrorKind::InvalidDirective { directive, message } => {
                write!(f, "invalid `{}` directive: {}", directive, message)
            }
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// The single error type for every pl failure mode.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct PlError {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where it happened, as a byte span into `source_code`
    pub span: Option<Span>,
    /// The program text the span points into
    pub source_code: Option<SourceArc>,
    /// Extra hint that overrides the kind's built-in help
    pub help: Option<String>,
}

impl PlError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            span: None,
            source_code: None,
            help: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_source(mut self, source: SourceArc) -> Self {
        self.source_code = Some(source);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl From<ErrorKind> for PlError {
    fn from(kind: ErrorKind) -> Self {
        PlError::new(kind)
    }
}

impl Diagnostic for PlError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.help {
            Some(help) => Some(Box::new(help)),
            None => self
                .kind
                .default_help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.source_code
            .as_ref()
            .map(|source| source.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        // Without source text there is nothing to point into.
        self.source_code.as_ref()?;
        let span = self.span?;
        let len = span.len().max(1);
        let label = LabeledSpan::new(Some(self.kind.label().to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}
