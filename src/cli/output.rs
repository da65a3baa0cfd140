//! Handles all user-facing output for the CLI.
//!
//! This module is responsible for the output sinks used by `print`, colored
//! status lines and result printing.

// ============================================================================
// OUTPUT SINKS: OutputBuffer and StdoutSink implementations
// ============================================================================

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::Span;
use crate::atoms::OutputSink;
use crate::runtime::Value;
use crate::testing::{Summary, TestOutcome};

/// OutputBuffer: collects printed lines for testing or programmatic capture.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    lines: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All printed lines joined with newlines.
    pub fn as_str(&self) -> String {
        self.lines.join("\n")
    }
}

impl OutputSink for OutputBuffer {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        self.lines.push(text.to_string());
    }
}

/// StdoutSink: writes output to stdout for CLI and default runner use.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&mut self, text: &str, _span: Option<&Span>) {
        println!("{}", text);
    }
}

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints an evaluation result, as a literal, to the console.
pub fn print_result(value: &Value) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = write!(stdout, "=>");
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", value.to_literal());
}

/// Prints one PASS/FAIL line, with the failure reason indented below.
pub fn print_outcome(outcome: &TestOutcome) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let (label, color) = if outcome.passed() {
        ("PASS", Color::Green)
    } else {
        ("FAIL", Color::Red)
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = write!(stdout, "{}", label);
    let _ = stdout.reset();
    let _ = writeln!(stdout, " {}", outcome.name());
    if let Err(failure) = &outcome.result {
        for line in failure.to_string().lines() {
            let _ = writeln!(stdout, "    {}", line);
        }
    }
}

pub fn print_summary(summary: &Summary) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if summary.is_success() {
        Color::Green
    } else {
        Color::Red
    };
    let _ = writeln!(stdout);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    let _ = writeln!(
        stdout,
        "{} passed, {} failed",
        summary.passed(),
        summary.failed()
    );
    let _ = stdout.reset();
}
