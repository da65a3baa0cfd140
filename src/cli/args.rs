//! Defines the command-line arguments and subcommands for the pl CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::runtime::EvalOptions;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "pl",
    version,
    about = "A small parenthesized scripting language."
)]
pub struct PlArgs {
    /// Maximum number of nested function calls before evaluation fails.
    #[arg(long, global = true, default_value_t = EvalOptions::default().max_depth)]
    pub max_depth: usize,

    /// Log evaluator activity to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl PlArgs {
    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            max_depth: self.max_depth,
        }
    }
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse and evaluate a script.
    Run {
        /// The path to the script file to run.
        #[arg(required = true)]
        file: PathBuf,
        /// Do not print the final value.
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the Abstract Syntax Tree (AST) for a script.
    Ast {
        /// The path to the script file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree as JSON instead of source form.
        #[arg(long)]
        json: bool,
    },
    /// Discover and run all test scripts in a directory.
    Test {
        /// The path to the directory containing test scripts.
        #[arg(default_value = "tests/scripts")]
        path: PathBuf,
    },
    /// Read expressions from stdin, one per line, and evaluate them.
    Repl,
}
