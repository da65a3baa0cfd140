// pl Script Runner
// Discovers all .pl files in tests/scripts/, runs them against their header
// directives, and reports pass/fail with colorized output. Integrates with cargo test.

use std::io::Write;
use std::path::Path;

use pl::testing::{run_directory, TestDiscoverer};
use pl::EvalOptions;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const SCRIPTS: &str = "tests/scripts";

#[test]
fn discovery_is_recursive_and_sorted() {
    let files = TestDiscoverer::discover_test_files(SCRIPTS).unwrap();
    assert!(files.iter().any(|f| f.ends_with("control/break.pl")));
    assert!(files.iter().any(|f| f.ends_with("errors/unbalanced.pl")));
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, sorted);
}

#[test]
fn integration_scripts() {
    let summary = run_directory(Path::new(SCRIPTS), &EvalOptions::default()).unwrap();
    assert!(
        !summary.outcomes.is_empty(),
        "No .pl test scripts found in tests/scripts/"
    );

    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for outcome in &summary.outcomes {
        if let Err(failure) = &outcome.result {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
            let _ = write!(stdout, "FAIL");
            let _ = stdout.reset();
            let _ = writeln!(stdout, " {}: {}", outcome.name(), failure);
        }
    }

    assert!(
        summary.is_success(),
        "{} of {} scripts failed",
        summary.failed(),
        summary.outcomes.len()
    );
}
