use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::atoms::logic;
use crate::cli::output::OutputBuffer;
use crate::diagnostics::PlError;
use crate::engine::Engine;
use crate::runtime::{EvalOptions, Value};
use crate::testing::discovery::{Expectation, ScriptTest, TestDiscoverer};

/// Why a script test failed.
#[derive(Debug)]
pub enum Failure {
    /// The script file could not be read or its directives are malformed.
    Invalid(PlError),
    /// The script failed although it was expected to succeed.
    UnexpectedError(PlError),
    WrongValue { expected: Value, actual: Value },
    MissingError { expected: String, actual: Value },
    WrongError { expected: String, actual: PlError },
    WrongOutput { expected: Vec<String>, actual: Vec<String> },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Invalid(err) => write!(f, "invalid test: {}", err),
            Failure::UnexpectedError(err) => {
                write!(f, "unexpected error [{}]: {}", err.kind.code(), err)
            }
            Failure::WrongValue { expected, actual } => write!(
                f,
                "expected {}, got {}",
                expected.to_literal(),
                actual.to_literal()
            ),
            Failure::MissingError { expected, actual } => write!(
                f,
                "expected error `{}`, but the script returned {}",
                expected,
                actual.to_literal()
            ),
            Failure::WrongError { expected, actual } => write!(
                f,
                "expected error `{}`, got [{}]: {}",
                expected,
                actual.kind.code(),
                actual
            ),
            Failure::WrongOutput { expected, actual } => write!(
                f,
                "output mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, actual
            ),
        }
    }
}

/// Result of running one script.
#[derive(Debug)]
pub struct TestOutcome {
    pub path: PathBuf,
    pub result: Result<(), Failure>,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }

    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Outcomes for a whole directory, in discovery order.
#[derive(Debug, Default)]
pub struct Summary {
    pub outcomes: Vec<TestOutcome>,
}

impl Summary {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs one script in a fresh engine and checks it against its directives.
pub fn run_script(test: &ScriptTest, options: &EvalOptions) -> TestOutcome {
    let mut engine = Engine::new(*options);
    let mut buffer = OutputBuffer::new();
    let result = engine.run(&test.name(), &test.source, &mut buffer);
    debug!(script = %test.name(), ok = result.is_ok(), "script finished");
    TestOutcome {
        path: test.path.clone(),
        result: check(test, result, buffer.lines()),
    }
}

fn check(test: &ScriptTest, result: Result<Value, PlError>, printed: &[String]) -> Result<(), Failure> {
    match (&test.expectation, result) {
        (Expectation::Success, Err(err)) | (Expectation::Value(_), Err(err)) => {
            return Err(Failure::UnexpectedError(err));
        }
        (Expectation::Value(expected), Ok(actual)) if !logic::equals(expected, &actual) => {
            return Err(Failure::WrongValue {
                expected: expected.clone(),
                actual,
            });
        }
        (Expectation::Error(expected), Ok(actual)) => {
            return Err(Failure::MissingError {
                expected: expected.clone(),
                actual,
            });
        }
        (Expectation::Error(expected), Err(err)) if err.kind.code_suffix() != expected => {
            return Err(Failure::WrongError {
                expected: expected.clone(),
                actual: err,
            });
        }
        _ => {}
    }
    match &test.output {
        Some(expected) if expected.as_slice() != printed => Err(Failure::WrongOutput {
            expected: expected.clone(),
            actual: printed.to_vec(),
        }),
        _ => Ok(()),
    }
}

/// Loads and runs every script under `root`.
///
/// Only a failure to walk the directory is an error; unreadable or malformed
/// scripts become failed outcomes.
pub fn run_directory(root: &Path, options: &EvalOptions) -> Result<Summary, PlError> {
    let files = TestDiscoverer::discover_test_files(root)?;
    let mut summary = Summary::default();
    for path in files {
        let outcome = match ScriptTest::load(&path) {
            Ok(test) => run_script(&test, options),
            Err(err) => TestOutcome {
                path,
                result: Err(Failure::Invalid(err)),
            },
        };
        summary.outcomes.push(outcome);
    }
    Ok(summary)
}
