//! Tree-walking evaluator.
//!
//! Every step returns a [`Flow`]: either a value or one of the three control
//! transfers (`break`, `continue`, `return`). Errors travel separately on the
//! `Err` side, so a control transfer can never be mistaken for a failure.
//!
//! - `loop` consumes `Break` and `Continue`.
//! - `call` consumes `Return`; a `Break`/`Continue` reaching it is an error.
//! - Anything still pending at the top level is an error.
//!
//! Dispatch is on the head symbol and the element count of a list. A list
//! matching no known shape is an unknown expression.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use crate::ast::{AstNode, Expr, Span};
use crate::atoms::{BinaryAtom, OutputSink, UnaryAtom};
use crate::diagnostics::{ErrorKind, PlError, SourceArc};
use crate::runtime::env::{Env, Function};
use crate::runtime::stack::ensure_sufficient_stack;
use crate::runtime::value::Value;

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Outcome of one evaluation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal(Value),
    Break(Span),
    Continue(Span),
    Return(Value, Span),
}

pub type EvalResult = Result<Flow, PlError>;

/// Unwraps a `Normal` flow, returning any control transfer to the caller.
macro_rules! value {
    ($flow:expr) => {
        match $flow? {
            Flow::Normal(value) => value,
            other => return Ok(other),
        }
    };
}

/// Options for the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Maximum number of nested function calls.
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// State for a single evaluation.
pub struct EvalContext<'o> {
    pub output: &'o mut dyn OutputSink,
    pub source: Option<SourceArc>,
    pub max_depth: usize,
    pub depth: usize,
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Evaluates `node` in `env`, printing through `output`.
///
/// A `break`, `continue` or `return` that escapes the node is reported as
/// misplaced control flow.
///
/// ```rust
/// use pl::{evaluate, parse_program, Env, EvalOptions, NullSink, Value};
/// let ast = parse_program("(var x 20) (+ x 22)").unwrap();
/// let value = evaluate(&Env::new(), &ast, &mut NullSink, &EvalOptions::default()).unwrap();
/// assert_eq!(value, Value::Int(42));
/// ```
pub fn evaluate(
    env: &Env,
    node: &AstNode,
    output: &mut dyn OutputSink,
    options: &EvalOptions,
) -> Result<Value, PlError> {
    EvalContext::new(output, options).run(env, node)
}

impl<'o> EvalContext<'o> {
    pub fn new(output: &'o mut dyn OutputSink, options: &EvalOptions) -> Self {
        Self {
            output,
            source: None,
            max_depth: options.max_depth,
            depth: 0,
        }
    }

    /// Attaches the program text to every error raised by this context.
    pub fn with_source(mut self, source: SourceArc) -> Self {
        self.source = Some(source);
        self
    }

    /// Evaluates a top-level node, rejecting escaped control transfers.
    pub fn run(&mut self, env: &Env, node: &AstNode) -> Result<Value, PlError> {
        match self.eval(env, node)? {
            Flow::Normal(value) => Ok(value),
            Flow::Break(span) => Err(self.misplaced("break", span)),
            Flow::Continue(span) => Err(self.misplaced("continue", span)),
            Flow::Return(_, span) => Err(self.misplaced("return", span)),
        }
    }

    /// Evaluates one node. The host stack grows on demand, so only
    /// `max_depth` bounds recursion.
    pub fn eval(&mut self, env: &Env, node: &AstNode) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_node(env, node))
    }

    fn eval_node(&mut self, env: &Env, node: &AstNode) -> EvalResult {
        match &node.value {
            Expr::Literal(value) => Ok(Flow::Normal(value.clone())),
            Expr::Symbol(name) => match env.lookup_var(name) {
                Some(value) => Ok(Flow::Normal(value)),
                None => Err(self.undefined(name, node.span)),
            },
            Expr::List(items) => self.eval_list(env, items, node.span),
        }
    }

    // ========================================================================
    // DISPATCH
    // ========================================================================

    fn eval_list(&mut self, env: &Env, items: &[AstNode], span: Span) -> EvalResult {
        let Some(first) = items.first() else {
            return Err(self.error(ErrorKind::EmptyExpression, span));
        };
        let Some(head) = first.value.as_symbol() else {
            return Err(self.unknown(first, span));
        };

        // Binary before unary, so `(- a b)` subtracts and `(- a)` negates.
        if items.len() == 3 {
            if let Some(atom) = BinaryAtom::from_symbol(head) {
                return self.eval_binary(env, atom, &items[1], &items[2], span);
            }
        }
        if items.len() == 2 {
            if let Some(atom) = UnaryAtom::from_symbol(head) {
                return self.eval_unary(env, atom, &items[1], span);
            }
        }

        match (head, items.len()) {
            ("val", 2) => self.eval_val(&items[1], span),
            ("if" | "?", 3 | 4) => self.eval_if(env, &items[1..]),
            ("print", _) => self.eval_print(env, &items[1..], span),
            ("do" | "then" | "else", n) if n > 1 => self.eval_block(env, &items[1..]),
            ("var", 3) => self.eval_var(env, &items[1], &items[2], span),
            ("set", 3) => self.eval_set(env, &items[1], &items[2], span),
            ("loop", 3) => self.eval_loop(env, &items[1], &items[2]),
            ("break", 1) => Ok(Flow::Break(span)),
            ("continue", 1) => Ok(Flow::Continue(span)),
            ("def", 4) => self.eval_def(env, &items[1], &items[2], &items[3], span),
            ("call", n) if n >= 2 => self.eval_call(env, &items[1], &items[2..], span),
            ("return", 1) => Ok(Flow::Return(Value::Null, span)),
            ("return", 2) => {
                let value = value!(self.eval(env, &items[1]));
                Ok(Flow::Return(value, span))
            }
            _ => Err(self.unknown(first, span)),
        }
    }

    // ========================================================================
    // OPERATORS
    // ========================================================================

    fn eval_val(&mut self, operand: &AstNode, span: Span) -> EvalResult {
        match &operand.value {
            Expr::Literal(value) => Ok(Flow::Normal(value.clone())),
            Expr::Symbol(name) => Ok(Flow::Normal(Value::Str(name.clone()))),
            Expr::List(_) => Err(self.error(
                ErrorKind::UnknownExpression {
                    head: "val".to_string(),
                },
                span,
            )),
        }
    }

    // Both operands are always evaluated, `and`/`or` included.
    fn eval_binary(
        &mut self,
        env: &Env,
        atom: BinaryAtom,
        lhs: &AstNode,
        rhs: &AstNode,
        span: Span,
    ) -> EvalResult {
        let lhs = value!(self.eval(env, lhs));
        let rhs = value!(self.eval(env, rhs));
        atom.apply(&lhs, &rhs)
            .map(Flow::Normal)
            .map_err(|kind| self.error(kind, span))
    }

    fn eval_unary(&mut self, env: &Env, atom: UnaryAtom, operand: &AstNode, span: Span) -> EvalResult {
        let operand = value!(self.eval(env, operand));
        atom.apply(&operand)
            .map(Flow::Normal)
            .map_err(|kind| self.error(kind, span))
    }

    // ========================================================================
    // BLOCKS AND CONDITIONALS
    // ========================================================================

    /// `(if cond yes [no])`: the condition and the chosen branch share one scope.
    fn eval_if(&mut self, env: &Env, parts: &[AstNode]) -> EvalResult {
        let scope = env.child();
        let cond = value!(self.eval(&scope, &parts[0]));
        match parts.get(if cond.is_truthy() { 1 } else { 2 }) {
            Some(branch) => self.eval(&scope, branch),
            None => Ok(Flow::Normal(Value::Null)),
        }
    }

    fn eval_block(&mut self, env: &Env, forms: &[AstNode]) -> EvalResult {
        let scope = env.child();
        let mut last = Value::Null;
        for form in forms {
            last = value!(self.eval(&scope, form));
        }
        Ok(Flow::Normal(last))
    }

    fn eval_print(&mut self, env: &Env, args: &[AstNode], span: Span) -> EvalResult {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(value!(self.eval(env, arg)).to_string());
        }
        self.output.emit(&parts.join(" "), Some(&span));
        Ok(Flow::Normal(Value::Null))
    }

    // ========================================================================
    // VARIABLES
    // ========================================================================

    fn eval_var(&mut self, env: &Env, name: &AstNode, expr: &AstNode, span: Span) -> EvalResult {
        let name = self.name_of("var", name, span)?;
        let value = value!(self.eval(env, expr));
        if env.define_var(name, value.clone()).is_err() {
            let kind = ErrorKind::DuplicateName {
                name: name.to_string(),
            };
            return Err(self.error(kind, span));
        }
        Ok(Flow::Normal(value))
    }

    fn eval_set(&mut self, env: &Env, name: &AstNode, expr: &AstNode, span: Span) -> EvalResult {
        let name = self.name_of("set", name, span)?;
        let value = value!(self.eval(env, expr));
        if env.assign(name, value.clone()).is_err() {
            let kind = ErrorKind::UndefinedName {
                name: name.to_string(),
            };
            return Err(self.error(kind, span));
        }
        Ok(Flow::Normal(value))
    }

    // ========================================================================
    // LOOPS
    // ========================================================================

    /// `(loop cond body)`: each iteration runs in a fresh scope. The result is
    /// the value of the last body that completed normally.
    fn eval_loop(&mut self, env: &Env, cond: &AstNode, body: &AstNode) -> EvalResult {
        let mut result = Value::Null;
        let mut iterations = 0usize;
        loop {
            let scope = env.child();
            let test = match self.eval(&scope, cond)? {
                Flow::Normal(value) => value,
                Flow::Break(_) => break,
                Flow::Continue(_) => continue,
                ret @ Flow::Return(..) => return Ok(ret),
            };
            if !test.is_truthy() {
                break;
            }
            iterations += 1;
            match self.eval(&scope, body)? {
                Flow::Normal(value) => result = value,
                Flow::Break(_) => break,
                Flow::Continue(_) => continue,
                ret @ Flow::Return(..) => return Ok(ret),
            }
        }
        trace!(iterations, "loop finished");
        Ok(Flow::Normal(result))
    }

    // ========================================================================
    // FUNCTIONS
    // ========================================================================

    fn eval_def(
        &mut self,
        env: &Env,
        name: &AstNode,
        params: &AstNode,
        body: &AstNode,
        span: Span,
    ) -> EvalResult {
        let name = self.name_of("def", name, span)?;
        let params = self.parameter_list(params)?;
        let arity = params.len();
        let function = Function {
            name: name.to_string(),
            params,
            body: body.clone(),
            closure: env.clone(),
        };
        if env.define_function(function).is_err() {
            let kind = ErrorKind::DuplicateFunction {
                name: name.to_string(),
                arity,
            };
            return Err(self.error(kind, span));
        }
        Ok(Flow::Normal(Value::Null))
    }

    fn parameter_list(&self, params: &AstNode) -> Result<Vec<String>, PlError> {
        let invalid = |reason: String| {
            self.error(ErrorKind::InvalidArgumentList { reason }, params.span)
        };
        let Some(items) = params.value.as_list() else {
            return Err(invalid(format!(
                "expected a list of parameter names, found {}",
                params.value
            )));
        };
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(items.len());
        for item in items {
            let Some(name) = item.value.as_symbol() else {
                return Err(invalid(format!("`{}` is not a parameter name", item.value)));
            };
            if !seen.insert(name) {
                return Err(invalid(format!("parameter `{}` appears more than once", name)));
            }
            names.push(name.to_string());
        }
        Ok(names)
    }

    fn eval_call(&mut self, env: &Env, name: &AstNode, args: &[AstNode], span: Span) -> EvalResult {
        let name = self.name_of("call", name, span)?;
        let Some(function) = env.lookup_function(name, args.len()) else {
            let kind = ErrorKind::UndefinedFunction {
                name: name.to_string(),
                arity: args.len(),
            };
            return Err(self.error(kind, span));
        };
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(value!(self.eval(env, arg)));
        }
        self.invoke(&function, values, span).map(Flow::Normal)
    }

    /// Runs a function body in a new scope chained to its closure.
    #[tracing::instrument(level = "debug", skip_all, fields(name = %function.name, arity = function.arity()))]
    fn invoke(&mut self, function: &Function, args: Vec<Value>, span: Span) -> Result<Value, PlError> {
        if self.depth >= self.max_depth {
            let kind = ErrorKind::RecursionLimit {
                limit: self.max_depth,
            };
            return Err(self.error(kind, span));
        }
        let scope = function.closure.child();
        for (param, value) in function.params.iter().zip(args) {
            if scope.define_var(param, value).is_err() {
                let kind = ErrorKind::DuplicateName {
                    name: param.clone(),
                };
                return Err(self.error(kind, span));
            }
        }
        trace!(depth = self.depth, "call");

        self.depth += 1;
        let flow = self.eval(&scope, &function.body);
        self.depth -= 1;

        match flow? {
            Flow::Normal(value) | Flow::Return(value, _) => Ok(value),
            Flow::Break(at) => Err(self.misplaced("break", at)),
            Flow::Continue(at) => Err(self.misplaced("continue", at)),
        }
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn name_of<'n>(&self, form: &str, node: &'n AstNode, span: Span) -> Result<&'n str, PlError> {
        node.value.as_symbol().ok_or_else(|| {
            let kind = ErrorKind::InvalidName {
                form: form.to_string(),
                found: node.value.pretty(),
            };
            self.error(kind, span)
        })
    }

    // A symbol starting with a quote is usually a string split at a raw space.
    fn undefined(&self, name: &str, span: Span) -> PlError {
        let err = self.error(
            ErrorKind::UndefinedName {
                name: name.to_string(),
            },
            span,
        );
        if name.starts_with('"') || name.ends_with('"') {
            err.with_help("strings end at whitespace and parentheses; write them as `\\u0020`, `\\u0028` and `\\u0029`")
        } else {
            err
        }
    }

    fn unknown(&self, head: &AstNode, span: Span) -> PlError {
        let kind = ErrorKind::UnknownExpression {
            head: head.value.pretty(),
        };
        self.error(kind, span)
    }

    fn misplaced(&self, keyword: &str, span: Span) -> PlError {
        let kind = ErrorKind::MisplacedControlFlow {
            keyword: keyword.to_string(),
        };
        self.error(kind, span)
    }

    fn error(&self, kind: ErrorKind, span: Span) -> PlError {
        let err = PlError::new(kind).with_span(span);
        match &self.source {
            Some(source) => err.with_source(Arc::clone(source)),
            None => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::NullSink;
    use crate::cli::output::OutputBuffer;
    use crate::syntax::parse_program;

    fn run_with(source: &str, options: EvalOptions) -> Result<Value, PlError> {
        let ast = parse_program(source).unwrap();
        evaluate(&Env::new(), &ast, &mut NullSink, &options)
    }

    fn run(source: &str) -> Value {
        match run_with(source, EvalOptions::default()) {
            Ok(value) => value,
            Err(err) => panic!("`{}` failed: {}", source, err),
        }
    }

    fn fails(source: &str) -> ErrorKind {
        match run_with(source, EvalOptions::default()) {
            Ok(value) => panic!("`{}` returned {}", source, value),
            Err(err) => err.kind,
        }
    }

    fn misplaced(keyword: &str) -> ErrorKind {
        ErrorKind::MisplacedControlFlow {
            keyword: keyword.to_string(),
        }
    }

    #[test]
    fn literals_and_operators() {
        assert_eq!(run("(+ 1 (* 2 3))"), Value::Int(7));
        assert_eq!(run("(/ 7 2)"), Value::Float(3.5));
        assert_eq!(run("(- 4)"), Value::Int(-4));
        assert_eq!(run("(- 4 1)"), Value::Int(3));
        assert_eq!(run("(not 0)"), Value::Bool(true));
        assert_eq!(run("(eq 2 2.0)"), Value::Bool(true));
    }

    #[test]
    fn val_returns_operand_verbatim() {
        assert_eq!(run("(val 5)"), Value::Int(5));
        assert_eq!(run("(val foo)"), Value::Str("foo".into()));
        assert_eq!(
            fails("(val (+ 1 2))"),
            ErrorKind::UnknownExpression { head: "val".into() }
        );
    }

    #[test]
    fn undefined_names() {
        assert_eq!(fails("x"), ErrorKind::UndefinedName { name: "x".into() });
        assert_eq!(
            fails("(set x 1)"),
            ErrorKind::UndefinedName { name: "x".into() }
        );
    }

    #[test]
    fn shadowing_keeps_outer_binding() {
        assert_eq!(run("(do (var a 1) (do (var a 2) a))"), Value::Int(2));
        assert_eq!(run("(var a 1) (do (var a 2) (set a 3)) a"), Value::Int(1));
        assert_eq!(run("(var a 1) (do (set a 5)) a"), Value::Int(5));
    }

    #[test]
    fn duplicate_var_in_same_scope() {
        assert_eq!(
            fails("(var a 1) (var a 2)"),
            ErrorKind::DuplicateName { name: "a".into() }
        );
    }

    #[test]
    fn nested_scope_collision_program() {
        let source = "
            (var a 1)
            (var b (+ a 1))
            (do
                (var a (+ b 5))
                (set b (+ a 10)))
            (* a b)";
        assert_eq!(run(source), Value::Int(17));
    }

    #[test]
    fn if_condition_and_branch_share_a_scope() {
        assert_eq!(run("(if (var c 7) c 0)"), Value::Int(7));
        assert_eq!(run("(? false 1)"), Value::Null);
        assert_eq!(run("(if \"\" 1 2)"), Value::Int(2));
        assert_eq!(fails("(if (var c 1) 1) c"), ErrorKind::UndefinedName { name: "c".into() });
    }

    #[test]
    fn loop_result_is_last_body_value() {
        assert_eq!(run("(var i 0) (loop (lt i 3) (do (set i (+ i 1)) i))"), Value::Int(3));
        assert_eq!(run("(loop false 1)"), Value::Null);
    }

    #[test]
    fn continue_skips_even_numbers() {
        let source = "
            (var i 0) (var s 0) (var odd false)
            (loop (lt i 5) (do
                (set i (+ i 1))
                (set odd (not odd))
                (if (not odd) (continue))
                (set s (+ s i))))
            s";
        assert_eq!(run(source), Value::Int(9));
    }

    #[test]
    fn break_keeps_previous_result() {
        let source = "
            (var i 0) (var s 0)
            (loop (lt i 5) (do
                (set i (+ i 1))
                (if (gt (+ s i) 6) (break))
                (set s (+ s i))))";
        assert_eq!(run(source), Value::Int(6));
    }

    #[test]
    fn loop_iterations_get_fresh_scopes() {
        let source = "(var i 0) (loop (lt i 3) (do (var t i) (set i (+ i 1)) t))";
        assert_eq!(run(source), Value::Int(2));
        assert_eq!(fails("(var i 0) (loop (lt i 1) (var t (set i 1))) t"), ErrorKind::UndefinedName { name: "t".into() });
    }

    #[test]
    fn break_in_condition_stops_the_loop() {
        assert_eq!(run("(loop (break) 1)"), Value::Null);
    }

    #[test]
    fn control_flow_outside_its_construct() {
        assert_eq!(fails("(break)"), misplaced("break"));
        assert_eq!(fails("(do (continue))"), misplaced("continue"));
        assert_eq!(fails("(return 1)"), misplaced("return"));
        assert_eq!(fails("(def f () (break)) (loop true (call f))"), misplaced("break"));
    }

    #[test]
    fn return_unwinds_through_loops() {
        let source = "
            (def first_over (limit) (do
                (var i 0)
                (loop true (do
                    (set i (+ i 1))
                    (if (gt i limit) (return i))))))
            (call first_over 4)";
        assert_eq!(run(source), Value::Int(5));
        assert_eq!(run("(def f () (return)) (call f)"), Value::Null);
    }

    #[test]
    fn function_result_without_return_is_body_value() {
        assert_eq!(run("(def sq (x) (* x x)) (call sq 9)"), Value::Int(81));
    }

    #[test]
    fn functions_resolve_free_names_lexically() {
        let source = "(var x 1) (def get () x) (do (var x 2) (call get))";
        assert_eq!(run(source), Value::Int(1));
        assert_eq!(run("(var x 1) (def get () x) (set x 5) (call get)"), Value::Int(5));
    }

    #[test]
    fn arity_is_part_of_function_identity() {
        let source = "(def f (x) x) (def f (x y) (+ x y)) (+ (call f 5) (call f 2 3))";
        assert_eq!(run(source), Value::Int(10));
        assert_eq!(
            fails("(def f (x) x) (call f 1 2)"),
            ErrorKind::UndefinedFunction {
                name: "f".into(),
                arity: 2
            }
        );
        assert_eq!(
            fails("(def f (x) x) (def f (y) y)"),
            ErrorKind::DuplicateFunction {
                name: "f".into(),
                arity: 1
            }
        );
        assert_eq!(run("(def f (x) 1) (do (def f (x) 2) (call f 0))"), Value::Int(2));
    }

    #[test]
    fn parameter_lists_are_validated() {
        for source in ["(def f (a a) 1)", "(def f (1) 1)", "(def f x 1)"] {
            assert!(
                matches!(fails(source), ErrorKind::InvalidArgumentList { .. }),
                "{source}"
            );
        }
    }

    #[test]
    fn names_must_be_symbols() {
        assert_eq!(
            fails("(var 1 2)"),
            ErrorKind::InvalidName {
                form: "var".into(),
                found: "1".into()
            }
        );
        assert!(matches!(fails("(call (f) 1)"), ErrorKind::InvalidName { .. }));
    }

    #[test]
    fn fib_recursive_and_iterative() {
        let recursive = "
            (def fib (n)
                (if (lt n 2)
                    (then (return 1))
                    (else (return (+ (+ (call fib (- n 1)) (call fib (- n 2))) 1)))))
            (call fib 5)";
        assert_eq!(run(recursive), Value::Int(15));

        let iterative = "
            (def fib (n) (do
                (if (lt n 2) (return 1))
                (var a 1) (var b 1) (var i 1)
                (loop (lt i n) (do
                    (var c (+ (+ a b) 1))
                    (set a b)
                    (set b c)
                    (set i (+ i 1))))
                (return b)))
            (call fib 5)";
        assert_eq!(run(iterative), Value::Int(15));
    }

    #[test]
    fn and_or_evaluate_both_operands() {
        let source = "
            (var hits 0)
            (def touch () (do (set hits (+ hits 1)) true))
            (and (eq 1 2) (call touch))
            (or true (call touch))
            hits";
        assert_eq!(run(source), Value::Int(2));
    }

    #[test]
    fn unknown_and_empty_expressions() {
        assert_eq!(fails("()"), ErrorKind::EmptyExpression);
        assert_eq!(fails("(foo 1)"), ErrorKind::UnknownExpression { head: "foo".into() });
        assert_eq!(fails("(if 1)"), ErrorKind::UnknownExpression { head: "if".into() });
        assert_eq!(fails("(+ 1 2 3)"), ErrorKind::UnknownExpression { head: "+".into() });
        assert_eq!(fails("(do)"), ErrorKind::UnknownExpression { head: "do".into() });
        assert_eq!(fails("(1 2)"), ErrorKind::UnknownExpression { head: "1".into() });
    }

    #[test]
    fn runtime_errors_from_operators_carry_the_form_span() {
        let ast = parse_program("(var z 0)\n(/ 1 z)").unwrap();
        let err = evaluate(&Env::new(), &ast, &mut NullSink, &EvalOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        assert_eq!(err.span, Some(Span::new(10, 17)));
    }

    #[test]
    fn recursion_limit_is_enforced() {
        let options = EvalOptions { max_depth: 16 };
        let err = run_with("(def f (n) (call f n)) (call f 0)", options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::RecursionLimit { limit: 16 });

        let countdown = "(def down (n) (if (gt n 0) (call down (- n 1)) 0)) (call down 15)";
        assert_eq!(run_with(countdown, options).unwrap(), Value::Int(0));
    }

    #[test]
    fn recursion_up_to_the_default_limit_fits_on_a_test_thread() {
        let limit = EvalOptions::default().max_depth;
        let countdown = format!(
            "(def down (n) (if (gt n 0) (call down (- n 1)) 0)) (call down {})",
            limit - 1
        );
        assert_eq!(run(&countdown), Value::Int(0));
        let too_deep = format!(
            "(def down (n) (if (gt n 0) (call down (- n 1)) 0)) (call down {})",
            limit
        );
        assert_eq!(fails(&too_deep), ErrorKind::RecursionLimit { limit });
    }

    #[test]
    fn deep_limits_grow_the_host_stack() {
        let options = EvalOptions { max_depth: 2_000 };
        let countdown = "(def down (n) (if (gt n 0) (call down (- n 1)) 0)) (call down 1999)";
        assert_eq!(run_with(countdown, options).unwrap(), Value::Int(0));
    }

    #[test]
    fn split_string_literal_gets_a_hint() {
        let err = run_with("(print \"a b\")", EvalOptions::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UndefinedName { name: "\"a".into() });
        assert!(err.help.as_deref().is_some_and(|help| help.contains("u0020")));
        let plain = run_with("missing", EvalOptions::default()).unwrap_err();
        assert_eq!(plain.help, None);
    }

    #[test]
    fn print_joins_arguments_with_spaces() {
        let ast = parse_program("(print 1 \"a\" 2.0 null) (print) (print (+ 1 1))").unwrap();
        let mut buffer = OutputBuffer::new();
        let value = evaluate(&Env::new(), &ast, &mut buffer, &EvalOptions::default()).unwrap();
        assert_eq!(value, Value::Null);
        assert_eq!(buffer.lines(), ["1 a 2.0 null", "", "2"]);
    }

    #[test]
    fn errors_carry_context_source() {
        let source = crate::diagnostics::to_error_source("ctx.pl", "(break)");
        let ast = parse_program("(break)").unwrap();
        let mut sink = NullSink;
        let err = EvalContext::new(&mut sink, &EvalOptions::default())
            .with_source(source)
            .run(&Env::new(), &ast)
            .unwrap_err();
        let name = err.source_code.as_ref().map(|s| s.name().to_string());
        assert_eq!(name.as_deref(), Some("ctx.pl"));
    }
}
