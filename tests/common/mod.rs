//! Shared helpers for the pl integration tests.

#![allow(dead_code)]

use pl::{evaluate, parse_program, Env, ErrorKind, EvalOptions, NullSink, OutputBuffer, PlError, Value};

/// Parses and evaluates `source` in a fresh root environment.
pub fn eval(source: &str) -> Result<Value, PlError> {
    let ast = parse_program(source)?;
    evaluate(&Env::new(), &ast, &mut NullSink, &EvalOptions::default())
}

/// Like [`eval`], panicking with the rendered error on failure.
pub fn eval_ok(source: &str) -> Value {
    match eval(source) {
        Ok(value) => value,
        Err(err) => panic!("evaluation of {:?} failed: {}", source, err),
    }
}

/// Evaluates `source` and returns the error kind it fails with.
pub fn eval_err(source: &str) -> ErrorKind {
    match eval(source) {
        Ok(value) => panic!("evaluation of {:?} unexpectedly returned {}", source, value),
        Err(err) => err.kind,
    }
}

/// Evaluates `source` and returns its value with every printed line.
pub fn eval_printing(source: &str) -> (Value, Vec<String>) {
    let ast = parse_program(source).unwrap();
    let mut buffer = OutputBuffer::new();
    let value = evaluate(&Env::new(), &ast, &mut buffer, &EvalOptions::default()).unwrap();
    (value, buffer.lines().to_vec())
}
