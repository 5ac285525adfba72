//! Bindings and closures.
//!
//! A `Binding` holds a reference to a live scope, never a copy of it. Code
//! run against a binding reads and writes the same variables as the frame
//! that captured it.

use std::fmt;
use std::rc::Rc;

use mote_ir::{Name, SourceTag};

use crate::block_context::FrameId;
use crate::environment::{LocalScope, Scope};
use crate::method_table::NativeFn;
use crate::value::Value;

/// Captured execution context.
#[derive(Clone)]
pub struct Binding {
    scope: LocalScope<Scope>,
    receiver: Value,
    /// Frame a `return` from code in this context unwinds to.
    home: FrameId,
    /// Block of the capturing frame, seen by `yield` and `block_given?`.
    home_block: Option<Closure>,
    tag: SourceTag,
}

impl Binding {
    pub fn new(
        scope: LocalScope<Scope>,
        receiver: Value,
        home: FrameId,
        home_block: Option<Closure>,
        tag: SourceTag,
    ) -> Self {
        Binding {
            scope,
            receiver,
            home,
            home_block,
            tag,
        }
    }

    #[inline]
    pub fn scope(&self) -> &LocalScope<Scope> {
        &self.scope
    }

    #[inline]
    pub fn receiver(&self) -> &Value {
        &self.receiver
    }

    #[inline]
    pub fn home(&self) -> FrameId {
        self.home
    }

    #[inline]
    pub fn home_block(&self) -> Option<&Closure> {
        self.home_block.as_ref()
    }

    #[inline]
    pub fn tag(&self) -> SourceTag {
        self.tag
    }

    /// Same binding, reporting a different source location.
    #[must_use]
    pub fn with_tag(&self, tag: SourceTag) -> Self {
        Binding {
            tag,
            ..self.clone()
        }
    }

    pub fn local_variable_get(&self, name: Name) -> Option<Value> {
        self.scope.borrow().lookup(name)
    }

    pub fn local_variable_set(&self, name: Name, value: Value) {
        self.scope.borrow_mut().set(name, value);
    }

    pub fn local_variable_defined(&self, name: Name) -> bool {
        self.scope.borrow().is_defined(name)
    }

    pub fn local_variables(&self) -> Vec<Name> {
        self.scope.borrow().local_names()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("receiver", &self.receiver)
            .field("home", &self.home)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

/// How `return` and arguments behave inside a closure body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClosureKind {
    /// `return` unwinds to the home frame; arity is lenient.
    Proc,
    /// `return` leaves the closure itself; arity is strict.
    Lambda,
    /// `define_method` body: lambda rules, `self` is the method receiver.
    Method,
}

struct ClosureData {
    binding: Binding,
    params: Vec<Name>,
    body: NativeFn,
    kind: ClosureKind,
}

/// Proc, lambda or `define_method` body.
#[derive(Clone)]
pub struct Closure(Rc<ClosureData>);

impl Closure {
    pub fn new(binding: Binding, params: Vec<Name>, body: NativeFn, kind: ClosureKind) -> Self {
        Closure(Rc::new(ClosureData {
            binding,
            params,
            body,
            kind,
        }))
    }

    #[inline]
    pub fn binding(&self) -> &Binding {
        &self.0.binding
    }

    #[inline]
    pub fn params(&self) -> &[Name] {
        &self.0.params
    }

    #[inline]
    pub fn body(&self) -> &NativeFn {
        &self.0.body
    }

    #[inline]
    pub fn kind(&self) -> ClosureKind {
        self.0.kind
    }

    /// Lambdas and method bodies check arity and treat `return` locally.
    #[inline]
    pub fn is_lambda(&self) -> bool {
        !matches!(self.0.kind, ClosureKind::Proc)
    }

    /// Same body and binding under different closure rules.
    #[must_use]
    pub fn with_kind(&self, kind: ClosureKind) -> Self {
        if self.0.kind == kind {
            return self.clone();
        }
        Closure::new(
            self.0.binding.clone(),
            self.0.params.clone(),
            Rc::clone(&self.0.body),
            kind,
        )
    }

    #[inline]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("kind", &self.0.kind)
            .field("arity", &self.0.params.len())
            .field("home", &self.0.binding.home)
            .finish_non_exhaustive()
    }
}
