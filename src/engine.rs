//! Source-aware execution pipeline: read, parse, evaluate.
//!
//! [`Engine`] owns the evaluation options and a global environment that
//! outlives a single run, so definitions made by one program are visible to
//! the next. The REPL relies on this.

use std::path::Path;
use std::sync::Arc;

use miette::Report;
use tracing::debug;

use crate::ast::AstNode;
use crate::atoms::OutputSink;
use crate::diagnostics::{ErrorKind, PlError, SourceArc};
use crate::runtime::{Env, EvalContext, EvalOptions, Value};
use crate::syntax::Parser;

// ============================================================================
// PROGRAM
// ============================================================================

/// A parsed program together with the named source its spans point into.
#[derive(Debug, Clone)]
pub struct Program {
    /// The implicit `(do ...)` wrapping every top-level form
    pub ast: AstNode,
    pub source: SourceArc,
}

impl Program {
    /// Top-level forms, without the implicit `do` head.
    pub fn forms(&self) -> &[AstNode] {
        match self.ast.value.as_list() {
            Some(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.forms().is_empty()
    }
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Default)]
pub struct Engine {
    pub options: EvalOptions,
    globals: Env,
}

impl Engine {
    pub fn new(options: EvalOptions) -> Self {
        Self {
            options,
            globals: Env::new(),
        }
    }

    /// The environment top-level forms are evaluated in.
    pub fn globals(&self) -> &Env {
        &self.globals
    }

    /// Parses `source` as a program named `name` (used in diagnostics).
    pub fn parse(&self, name: &str, source: &str) -> Result<Program, PlError> {
        let parser = Parser::named(name, source);
        let source_arc = Arc::clone(parser.source());
        let ast = parser.parse_program()?;
        debug!(name, forms = ast.value.as_list().map_or(0, |items| items.len() - 1), "parsed program");
        Ok(Program {
            ast,
            source: source_arc,
        })
    }

    /// Evaluates each top-level form in the global environment and returns
    /// the value of the last one.
    ///
    /// An empty program is the empty block `(do)`, which is not a valid
    /// expression.
    pub fn execute(&mut self, program: &Program, output: &mut dyn OutputSink) -> Result<Value, PlError> {
        let mut context = EvalContext::new(output, &self.options).with_source(Arc::clone(&program.source));
        if program.is_empty() {
            return context.run(&self.globals, &program.ast);
        }
        let mut last = Value::Null;
        for form in program.forms() {
            last = context.run(&self.globals, form)?;
        }
        debug!(name = program.source.name(), result = %last, "program finished");
        Ok(last)
    }

    /// Parses and executes `source` in one step.
    pub fn run(&mut self, name: &str, source: &str, output: &mut dyn OutputSink) -> Result<Value, PlError> {
        let program = self.parse(name, source)?;
        self.execute(&program, output)
    }

    /// Reads and runs a script file.
    pub fn run_file(&mut self, path: &Path, output: &mut dyn OutputSink) -> Result<Value, PlError> {
        let source = read_file(path)?;
        self.run(&path.display().to_string(), &source, output)
    }
}

/// Reads a file, mapping I/O failures into a [`PlError`].
pub fn read_file(path: &Path) -> Result<String, PlError> {
    std::fs::read_to_string(path).map_err(|error| {
        PlError::new(ErrorKind::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        })
    })
}

/// Renders an error as a full `miette` report on stderr.
pub fn print_error(error: PlError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}
