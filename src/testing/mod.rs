//! Script tests: `.pl` files whose leading comments state the expected
//! result.
//!
//! ```text
//! ;; expect: 15
//! ;; output: starting
//! (print "starting")
//! (def fib (n) ...)
//! (call fib 5)
//! ```
//!
//! Supported directives are `expect: <literal>`, `expect-error: <code suffix>`
//! and `output: <line>` (repeatable, one per printed line).

pub mod discovery;
pub mod runner;

pub use discovery::{Expectation, ScriptTest, TestDiscoverer};
pub use runner::{run_directory, run_script, Failure, Summary, TestOutcome};
