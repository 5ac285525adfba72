//! Variable scopes for method bodies, closures and bindings.
//!
//! A scope is shared by reference: a captured binding and the frame that
//! created it hold the same `LocalScope<Scope>`, so writes through either are
//! visible to both.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use mote_ir::Name;

use crate::value::Value;

/// Error returned by `Scope::assign` when the name is not bound anywhere
/// in the chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unbound;

/// A single-threaded, reference-counted cell for scopes.
///
/// All scope allocations go through `LocalScope::new()`. `#[repr(transparent)]`
/// keeps the layout identical to `Rc<RefCell<T>>`.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Check whether two handles share one scope.
    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A single scope: ordered local variables plus an optional parent.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
    /// Definition order of `bindings`.
    order: Vec<Name>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            parent: Some(parent),
            ..Scope::default()
        }
    }

    /// Define (or overwrite) a variable in this scope, ignoring parents.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        if self.bindings.insert(name, value).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a variable, consulting the chain outward.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(value) = self.bindings.get(&name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().lookup(name))
    }

    /// Overwrite an existing variable wherever it lives in the chain.
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), Unbound> {
        if let Some(slot) = self.bindings.get_mut(&name) {
            *slot = value;
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(Unbound),
        }
    }

    /// Local-variable assignment: update the visible variable, or define it
    /// here when no scope in the chain has it.
    pub fn set(&mut self, name: Name, value: Value) {
        if let Err(Unbound) = self.assign(name, value.clone()) {
            self.define(name, value);
        }
    }

    pub fn is_defined(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.borrow().is_defined(name))
    }

    /// Visible variable names, innermost scope first, each in definition order.
    pub fn local_names(&self) -> Vec<Name> {
        let mut names = self.order.clone();
        if let Some(parent) = &self.parent {
            for name in parent.borrow().local_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

/// Scope stack for the interpreter.
///
/// Frames push one of three shapes: a child of the current scope (blocks),
/// a fresh root scope (method bodies), or an existing captured scope
/// (binding evaluation).
pub struct Environment {
    /// Stack of scopes, with current scope at the top.
    scopes: Vec<LocalScope<Scope>>,
    /// Top-level scope (always at the bottom).
    global: LocalScope<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a child of the current scope.
    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope();
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Push a child of `parent`, which need not be the current scope.
    pub fn push_child_of(&mut self, parent: LocalScope<Scope>) {
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    /// Push a scope with no parent.
    pub fn push_fresh(&mut self) {
        self.scopes.push(LocalScope::new(Scope::new()));
    }

    /// Make an existing scope current.
    pub fn push_existing(&mut self, scope: LocalScope<Scope>) {
        self.scopes.push(scope);
    }

    /// Pop the current scope. The top-level scope is never popped.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    #[inline]
    pub fn current_scope(&self) -> LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global).clone()
    }

    pub fn global_scope(&self) -> LocalScope<Scope> {
        self.global.clone()
    }

    /// Define a variable in the current scope.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .define(name, value);
    }

    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup(name)
    }

    /// Assign-or-define, as for a local variable assignment.
    #[inline]
    pub fn set(&mut self, name: Name, value: Value) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .set(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
