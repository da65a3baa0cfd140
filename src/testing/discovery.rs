use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::ast::Expr;
use crate::diagnostics::{ErrorKind, PlError};
use crate::engine::read_file;
use crate::runtime::Value;
use crate::syntax::decode_atom;

const EXPECT: &str = "expect";
const EXPECT_ERROR: &str = "expect-error";
const OUTPUT: &str = "output";

/// What a script is expected to do when run.
#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    /// Run without error; the final value is not checked.
    Success,
    /// Finish with this value.
    Value(Value),
    /// Fail with an error whose code ends in this suffix.
    Error(String),
}

/// A script file and the directives read from its header.
#[derive(Debug, Clone)]
pub struct ScriptTest {
    pub path: PathBuf,
    pub source: String,
    pub expectation: Expectation,
    /// Expected printed lines, if the header has any `output` directive.
    pub output: Option<Vec<String>>,
}

impl ScriptTest {
    /// Reads a script file and its directives.
    pub fn load(path: &Path) -> Result<Self, PlError> {
        let source = read_file(path)?;
        Self::from_source(path, source)
    }

    /// Reads directives from the leading comment block of `source`.
    ///
    /// Directives have the form `;; <name>: <argument>`. Scanning stops at the
    /// first line that is neither blank nor a comment.
    ///
    /// ```rust
    /// use pl::testing::{Expectation, ScriptTest};
    /// use pl::Value;
    /// let test = ScriptTest::from_source("t.pl", ";; expect: 3\n(+ 1 2)".to_string()).unwrap();
    /// assert_eq!(test.expectation, Expectation::Value(Value::Int(3)));
    /// ```
    pub fn from_source(path: impl AsRef<Path>, source: String) -> Result<Self, PlError> {
        let mut expectation = Expectation::Success;
        let mut output: Option<Vec<String>> = None;

        for line in source.lines().map(str::trim) {
            if line.is_empty() {
                continue;
            }
            let Some(comment) = line.strip_prefix(';') else {
                break;
            };
            let Some((name, argument)) = parse_directive(comment) else {
                continue;
            };
            match name {
                EXPECT | EXPECT_ERROR if expectation != Expectation::Success => {
                    return Err(invalid(name, "only one `expect` or `expect-error` is allowed"));
                }
                EXPECT => match decode_atom(argument) {
                    Expr::Literal(value) => expectation = Expectation::Value(value),
                    _ => {
                        let message = format!("`{}` is not a literal value", argument);
                        return Err(invalid(name, &message));
                    }
                },
                EXPECT_ERROR if argument.is_empty() => {
                    return Err(invalid(name, "missing error code"));
                }
                EXPECT_ERROR => expectation = Expectation::Error(argument.to_string()),
                OUTPUT => output.get_or_insert_with(Vec::new).push(argument.to_string()),
                _ => {}
            }
        }

        Ok(Self {
            path: path.as_ref().to_path_buf(),
            source,
            expectation,
            output,
        })
    }

    /// Display name: the file path.
    pub fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Splits `; name: argument` into its parts, for known directive names only.
fn parse_directive(comment: &str) -> Option<(&str, &str)> {
    let body = comment.trim_start_matches(';').trim_start();
    let (name, argument) = body.split_once(':')?;
    let name = name.trim();
    if ![EXPECT, EXPECT_ERROR, OUTPUT].contains(&name) {
        return None;
    }
    // One separating space is dropped; the rest of an output line is kept.
    let argument = argument.strip_prefix(' ').unwrap_or(argument).trim_end();
    Some((name, argument))
}

fn invalid(directive: &str, message: &str) -> PlError {
    PlError::new(ErrorKind::InvalidDirective {
        directive: directive.to_string(),
        message: message.to_string(),
    })
}

/// Discovers script tests on disk.
#[derive(Debug)]
pub struct TestDiscoverer;

impl TestDiscoverer {
    /// Returns true if the given path has a .pl extension.
    fn is_script_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "pl")
    }

    /// Recursively scans a directory for `.pl` files.
    ///
    /// The returned list of files is sorted to ensure deterministic execution order.
    pub fn discover_test_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, PlError> {
        let root = root.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(root) {
            let entry = entry.map_err(|e| {
                PlError::new(ErrorKind::Io {
                    path: root.display().to_string(),
                    message: e.to_string(),
                })
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !Self::is_script_file(path) {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        Ok(files)
    }
}
