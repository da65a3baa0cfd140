//! Environments for lexical scoping.
//!
//! An `Env` is a handle to the innermost scope of a chain. Each scope holds
//! its own bindings behind a `RefCell` and a parent link that is fixed when
//! the scope is created. Handles are reference counted, so a function can
//! keep its defining environment alive after the block that created it has
//! returned.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use im::HashMap;

use crate::ast::AstNode;
use crate::runtime::value::Value;

// ============================================================================
// KEYS AND BINDINGS
// ============================================================================

/// Identity of a binding within a scope.
///
/// Functions are keyed by name and arity, so `f/1` and `f/2` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Var(String),
    Func(String, usize),
}

/// A user function together with the environment it was defined in.
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: AstNode,
    pub closure: Env,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Debug for Function {
    // The closure is left out: it usually contains this function again.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Function(Rc<Function>),
}

/// Error returned when a binding operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindError {
    /// The key is already bound in the innermost scope.
    Duplicate,
    /// The key is not bound anywhere in the chain.
    Undefined,
}

// ============================================================================
// SCOPE CHAIN
// ============================================================================

struct Scope {
    bindings: RefCell<HashMap<Key, Binding>>,
    parent: Option<Env>,
}

/// A chain of scopes, innermost first.
#[derive(Clone)]
pub struct Env(Rc<Scope>);

impl Env {
    /// Creates an empty root environment.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    fn with_parent(parent: Option<Env>) -> Self {
        Env(Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent,
        }))
    }

    /// Creates a fresh scope whose parent is this environment.
    pub fn child(&self) -> Env {
        Self::with_parent(Some(self.clone()))
    }

    pub fn parent(&self) -> Option<&Env> {
        self.0.parent.as_ref()
    }

    /// Number of scopes in the chain, including this one.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = Some(self);
        while let Some(env) = current {
            depth += 1;
            current = env.parent();
        }
        depth
    }

    /// True if `key` is bound in this (innermost) scope.
    pub fn contains_local(&self, key: &Key) -> bool {
        self.0.bindings.borrow().contains_key(key)
    }

    /// Resolves a variable by walking outward through the chain.
    pub fn lookup_var(&self, name: &str) -> Option<Value> {
        let key = Key::Var(name.to_string());
        self.find(&key).and_then(|binding| match binding {
            Binding::Value(value) => Some(value),
            Binding::Function(_) => None,
        })
    }

    /// Resolves a function by name and arity, walking outward.
    pub fn lookup_function(&self, name: &str, arity: usize) -> Option<Rc<Function>> {
        let key = Key::Func(name.to_string(), arity);
        self.find(&key).and_then(|binding| match binding {
            Binding::Function(function) => Some(function),
            Binding::Value(_) => None,
        })
    }

    /// Binds a new variable in the innermost scope.
    pub fn define_var(&self, name: &str, value: Value) -> Result<(), BindError> {
        self.insert_local(Key::Var(name.to_string()), Binding::Value(value))
    }

    /// Binds a function under `(name, arity)` in the innermost scope.
    pub fn define_function(&self, function: Function) -> Result<Rc<Function>, BindError> {
        let key = Key::Func(function.name.clone(), function.arity());
        let function = Rc::new(function);
        self.insert_local(key, Binding::Function(Rc::clone(&function)))?;
        Ok(function)
    }

    /// Overwrites an existing variable in the scope that owns it.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), BindError> {
        let key = Key::Var(name.to_string());
        let owner = self.owner_of(&key).ok_or(BindError::Undefined)?;
        owner
            .0
            .bindings
            .borrow_mut()
            .insert(key, Binding::Value(value));
        Ok(())
    }

    /// Names bound in the innermost scope, sorted, for diagnostics and tests.
    pub fn local_keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = self.0.bindings.borrow().keys().cloned().collect();
        keys.sort_by_key(|key| match key {
            Key::Var(name) => (name.clone(), 0),
            Key::Func(name, arity) => (name.clone(), arity + 1),
        });
        keys
    }

    // ------------------------------------------------------------------------
    // Chain traversal
    // ------------------------------------------------------------------------

    fn insert_local(&self, key: Key, binding: Binding) -> Result<(), BindError> {
        let mut bindings = self.0.bindings.borrow_mut();
        if bindings.contains_key(&key) {
            return Err(BindError::Duplicate);
        }
        bindings.insert(key, binding);
        Ok(())
    }

    fn owner_of(&self, key: &Key) -> Option<&Env> {
        let mut current = Some(self);
        while let Some(env) = current {
            if env.contains_local(key) {
                return Some(env);
            }
            current = env.parent();
        }
        None
    }

    fn find(&self, key: &Key) -> Option<Binding> {
        self.owner_of(key)
            .and_then(|env| env.0.bindings.borrow().get(key).cloned())
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("locals", &self.local_keys())
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Span};

    fn body() -> AstNode {
        AstNode::new(Expr::Literal(Value::Null), Span::default())
    }

    fn function(name: &str, params: &[&str], closure: &Env) -> Function {
        Function {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body: body(),
            closure: closure.clone(),
        }
    }

    #[test]
    fn lookup_walks_outward() {
        let root = Env::new();
        root.define_var("a", Value::Int(1)).unwrap();
        let inner = root.child().child();
        assert_eq!(inner.lookup_var("a"), Some(Value::Int(1)));
        assert_eq!(inner.lookup_var("b"), None);
        assert_eq!(inner.depth(), 3);
    }

    #[test]
    fn duplicate_only_rejected_in_same_scope() {
        let root = Env::new();
        root.define_var("a", Value::Int(1)).unwrap();
        assert_eq!(root.define_var("a", Value::Int(2)), Err(BindError::Duplicate));

        let inner = root.child();
        inner.define_var("a", Value::Int(2)).unwrap();
        assert_eq!(inner.lookup_var("a"), Some(Value::Int(2)));
        assert_eq!(root.lookup_var("a"), Some(Value::Int(1)));
    }

    #[test]
    fn assign_mutates_the_owning_scope() {
        let root = Env::new();
        root.define_var("b", Value::Int(2)).unwrap();
        let inner = root.child();
        inner.assign("b", Value::Int(17)).unwrap();
        assert!(!inner.contains_local(&Key::Var("b".into())));
        assert_eq!(root.lookup_var("b"), Some(Value::Int(17)));
        assert_eq!(inner.assign("missing", Value::Null), Err(BindError::Undefined));
    }

    #[test]
    fn functions_are_keyed_by_arity() {
        let root = Env::new();
        root.define_function(function("f", &["x"], &root)).unwrap();
        root.define_function(function("f", &["x", "y"], &root)).unwrap();
        assert_eq!(root.lookup_function("f", 1).map(|f| f.arity()), Some(1));
        assert_eq!(root.lookup_function("f", 2).map(|f| f.arity()), Some(2));
        assert!(root.lookup_function("f", 3).is_none());
        assert_eq!(
            root.define_function(function("f", &["z"], &root)).map(|_| ()),
            Err(BindError::Duplicate)
        );
    }

    #[test]
    fn variables_and_functions_do_not_collide() {
        let root = Env::new();
        root.define_var("f", Value::Int(1)).unwrap();
        root.define_function(function("f", &[], &root)).unwrap();
        assert_eq!(root.lookup_var("f"), Some(Value::Int(1)));
        assert!(root.lookup_function("f", 0).is_some());
        assert_eq!(
            root.local_keys(),
            vec![Key::Var("f".into()), Key::Func("f".into(), 0)]
        );
    }

    #[test]
    fn captured_environment_outlives_its_block() {
        let root = Env::new();
        let captured = {
            let block = root.child();
            block.define_var("hidden", Value::Int(42)).unwrap();
            block.define_function(function("g", &[], &block)).unwrap()
        };
        assert_eq!(captured.closure.lookup_var("hidden"), Some(Value::Int(42)));
        assert!(root.lookup_var("hidden").is_none());
    }
}
