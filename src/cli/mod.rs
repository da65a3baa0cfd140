//! The pl Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::process;
use std::sync::Once;

use clap::Parser;

use crate::cli::args::{Command, PlArgs};
use crate::cli::output::{print_outcome, print_result, print_summary, StdoutSink};
use crate::diagnostics::{ErrorKind, PlError};
use crate::engine::{print_error, read_file, Engine};
use crate::runtime::EvalOptions;
use crate::testing::run_directory;

pub mod args;
pub mod output;

static TRACING_INIT: Once = Once::new();

/// Installs the `tracing` subscriber once per process.
///
/// Logging is off unless `RUST_LOG` is set or `verbose` is true; `RUST_LOG`
/// wins when both are present. Logs go to stderr so script output stays clean.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if verbose {
            EnvFilter::new("pl=debug")
        } else {
            return;
        };
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}

/// The main entry point for the CLI.
pub fn run() {
    let args = PlArgs::parse();
    init_tracing(args.verbose);
    let options = args.eval_options();

    // Dispatch to the appropriate subcommand handler.
    let result = match &args.command {
        Command::Run { file, quiet } => handle_run(file, *quiet, options),
        Command::Ast { file, json } => handle_ast(file, *json),
        Command::Test { path } => handle_test(path, options),
        Command::Repl => handle_repl(options),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(error) => {
            print_error(error);
            process::exit(1);
        }
    }
}

// Handlers return Ok(false) when they already reported a failure.

fn handle_run(file: &Path, quiet: bool, options: EvalOptions) -> Result<bool, PlError> {
    let mut engine = Engine::new(options);
    let value = engine.run_file(file, &mut StdoutSink)?;
    if !quiet {
        print_result(&value);
    }
    Ok(true)
}

fn handle_ast(file: &Path, json: bool) -> Result<bool, PlError> {
    let source = read_file(file)?;
    let program = Engine::default().parse(&file.display().to_string(), &source)?;
    if json {
        let text = serde_json::to_string_pretty(&program.ast).map_err(|e| {
            PlError::new(ErrorKind::Io {
                path: file.display().to_string(),
                message: e.to_string(),
            })
        })?;
        println!("{}", text);
    } else {
        for form in program.forms() {
            println!("{}", form.value.pretty());
        }
    }
    Ok(true)
}

fn handle_test(path: &Path, options: EvalOptions) -> Result<bool, PlError> {
    let summary = run_directory(path, &options)?;
    for outcome in &summary.outcomes {
        print_outcome(outcome);
    }
    print_summary(&summary);
    Ok(summary.is_success())
}

/// Evaluates stdin line by line against one engine. A line that leaves a list
/// open is joined with the following lines.
fn handle_repl(options: EvalOptions) -> Result<bool, PlError> {
    let mut engine = Engine::new(options);
    let interactive = io::stdin().is_terminal();
    let mut pending = String::new();

    prompt(interactive, &pending);
    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| {
            PlError::new(ErrorKind::Io {
                path: "<stdin>".to_string(),
                message: e.to_string(),
            })
        })?;
        pending.push_str(&line);
        pending.push('\n');

        match engine.parse("repl", &pending) {
            Err(err) if err.kind == ErrorKind::UnbalancedParenthesis => {}
            Err(err) => {
                print_error(err);
                pending.clear();
            }
            Ok(program) if program.is_empty() => pending.clear(),
            Ok(program) => {
                match engine.execute(&program, &mut StdoutSink) {
                    Ok(value) => print_result(&value),
                    Err(err) => print_error(err),
                }
                pending.clear();
            }
        }
        prompt(interactive, &pending);
    }
    Ok(true)
}

fn prompt(interactive: bool, pending: &str) {
    if !interactive {
        return;
    }
    let marker = if pending.is_empty() { "pl> " } else { "... " };
    print!("{}", marker);
    let _ = io::stdout().flush();
}
