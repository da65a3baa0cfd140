//! The `pl` command-line tool.
//!
//! Usage: pl [--max-depth N] [--verbose] <run|ast|test|repl> ...

fn main() {
    pl::cli::run();
}
