//! Method dispatch: resolution, visibility, invocation and the
//! `method_missing` fallback.
//!
//! # Visibility
//!
//! | mode         | private                   | protected                 |
//! |--------------|---------------------------|---------------------------|
//! | `Implicit`   | allowed                   | caller kind-of owner      |
//! | `Explicit`   | only when receiver is self| caller kind-of owner      |
//! | `Send`       | allowed                   | allowed                   |
//! | `PublicSend` | rejected                  | rejected                  |
//!
//! # Fallback
//!
//! A miss (not found, undefined, or rejected by visibility) goes to the
//! receiver's `method_missing` when a user override exists. If
//! `respond_to_missing?` is also overridden, its answer must agree with what
//! the fallback does; a disagreement is a `FallbackMismatch` error.

use std::rc::Rc;

use mote_ir::Name;

use crate::block_context::{CallFrame, FrameKind};
use crate::closure::Closure;
use crate::errors::{
    custom, fallback_mismatch, no_method, visibility_violation, ControlAction, EvalError,
    EvalResult,
};
use crate::method_table::{MethodBody, MethodEntry, TableOwner, Visibility};
use crate::value::Value;

use super::frame_guard::ScopeEntry;
use super::resolvers::MethodResolution;
use super::{Interpreter, Invocation};

/// How a call site names its receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallMode {
    /// `foo()`: receiver is the current self.
    Implicit,
    /// `obj.foo()`.
    Explicit,
    /// `obj.send(:foo)` / `obj.__send__(:foo)`.
    Send,
    /// `obj.public_send(:foo)`.
    PublicSend,
}

/// Why resolution did not produce a callable entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Miss {
    NotFound,
    Rejected(Visibility),
}

impl Interpreter {
    /// Call `name` on `receiver`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(method = self.name_str(name), mode = ?mode)
    )]
    pub fn call(
        &mut self,
        receiver: &Value,
        name: Name,
        mode: CallMode,
        args: Vec<Value>,
        block: Option<Closure>,
    ) -> EvalResult {
        match self.dispatcher.resolve(&self.model, receiver, name) {
            MethodResolution::Found(entry) => {
                if self.visibility_allows(&entry, receiver, mode) {
                    self.invoke_entry(entry, receiver.clone(), args, block)
                } else {
                    let miss = Miss::Rejected(entry.visibility);
                    self.dispatch_missing(receiver, name, mode, args, block, miss)
                }
            }
            MethodResolution::Undefined | MethodResolution::NotFound => {
                self.dispatch_missing(receiver, name, mode, args, block, Miss::NotFound)
            }
        }
    }

    /// `call` with a string method name.
    pub fn call_named(
        &mut self,
        receiver: &Value,
        name: &str,
        mode: CallMode,
        args: Vec<Value>,
        block: Option<Closure>,
    ) -> EvalResult {
        let name = self.intern(name);
        self.call(receiver, name, mode, args, block)
    }

    /// Implicit-receiver call on the current self.
    pub fn call_self(&mut self, name: &str, args: Vec<Value>, block: Option<Closure>) -> EvalResult {
        let receiver = self.current_self();
        self.call_named(&receiver, name, CallMode::Implicit, args, block)
    }

    /// `super(args)` from the innermost running method.
    pub fn call_super(&mut self, args: Vec<Value>, block: Option<Closure>) -> EvalResult {
        let Some(frame) = self.stack.method_frame() else {
            return Err(self.fail(custom("super called outside of method")));
        };
        let (name, receiver) = (frame.name, frame.self_value.clone());
        let Some(owner) = frame.owner else {
            return Err(self.fail(custom("super called outside of method")));
        };
        match self.model.resolve_after(&receiver, name, owner) {
            Some(entry) => self.invoke_entry(entry, receiver, args, block),
            None => self.dispatch_missing(&receiver, name, CallMode::Send, args, block, Miss::NotFound),
        }
    }

    /// `respond_to?(name, include_all)`.
    ///
    /// A defined method answers by its visibility. Otherwise the receiver's
    /// `respond_to_missing?` decides.
    pub fn respond_to(
        &mut self,
        receiver: &Value,
        name: Name,
        include_all: bool,
    ) -> Result<bool, ControlAction> {
        if let MethodResolution::Found(entry) = self.dispatcher.resolve(&self.model, receiver, name) {
            return Ok(include_all || entry.visibility == Visibility::Public);
        }
        let answer = self.call(
            receiver,
            self.names.respond_to_missing,
            CallMode::Send,
            vec![Value::symbol(name), Value::bool(include_all)],
            None,
        )?;
        Ok(answer.is_truthy())
    }

    // Visibility

    fn visibility_allows(&self, entry: &MethodEntry, receiver: &Value, mode: CallMode) -> bool {
        match (entry.visibility, mode) {
            (Visibility::Public, _) | (_, CallMode::Send) => true,
            (_, CallMode::PublicSend) => false,
            (Visibility::Private, CallMode::Implicit) => true,
            (Visibility::Private, CallMode::Explicit) => {
                self.stack.current_self().is_identical(receiver)
            }
            (Visibility::Protected, _) => self.caller_reaches_protected(entry.owner),
        }
    }

    /// Whether the current self is kind-of the table a protected entry lives in.
    fn caller_reaches_protected(&self, owner: TableOwner) -> bool {
        let caller = self.stack.current_self();
        match owner {
            TableOwner::Module(module) => self.model.is_kind_of(caller, module),
            TableOwner::Singleton(object) => caller.is_identical(&Value::Object(object)),
            TableOwner::Meta(class) => {
                matches!(caller, Value::Class(k) if self.model.inherits(*k, class))
            }
        }
    }

    /// Whether the fallback predicate is asked about private methods.
    fn reaches_private(&self, receiver: &Value, mode: CallMode) -> bool {
        match mode {
            CallMode::Implicit | CallMode::Send => true,
            CallMode::Explicit => self.stack.current_self().is_identical(receiver),
            CallMode::PublicSend => false,
        }
    }

    // Invocation

    /// Run a resolved entry with `receiver` as self.
    pub(crate) fn invoke_entry(
        &mut self,
        entry: MethodEntry,
        receiver: Value,
        args: Vec<Value>,
        block: Option<Closure>,
    ) -> EvalResult {
        match entry.body {
            MethodBody::Native { func, primitive } => {
                let id = self.stack.next_frame_id();
                let frame = CallFrame {
                    id,
                    name: entry.name,
                    kind: if primitive {
                        FrameKind::Primitive
                    } else {
                        FrameKind::Method
                    },
                    self_value: receiver.clone(),
                    block: block.clone(),
                    owner: Some(entry.owner),
                    return_target: id,
                    tag: self.location(),
                };
                let scope = if primitive {
                    ScopeEntry::Inherit
                } else {
                    ScopeEntry::Fresh
                };
                self.run_frame(frame, scope, |interp| {
                    func(interp, Invocation::new(receiver, args, block))
                })
            }
            MethodBody::Closure(closure) => {
                self.invoke_method_closure(&closure, entry.name, entry.owner, receiver, args, block)
            }
            MethodBody::Undefined => {
                let err = no_method(self.name_str(entry.name), &self.inspect(&receiver));
                Err(self.fail(err))
            }
        }
    }

    /// Run a `define_method` body. `self` is the receiver; `yield` and
    /// `block_given?` see the block of the frame that defined the method.
    fn invoke_method_closure(
        &mut self,
        closure: &Closure,
        name: Name,
        owner: TableOwner,
        receiver: Value,
        args: Vec<Value>,
        block: Option<Closure>,
    ) -> EvalResult {
        let binding = closure.binding();
        let id = self.stack.next_frame_id();
        let frame = CallFrame {
            id,
            name,
            kind: FrameKind::Block,
            self_value: receiver.clone(),
            block: binding.home_block().cloned(),
            owner: Some(owner),
            return_target: id,
            tag: binding.tag(),
        };
        let scope = ScopeEntry::ChildOf(binding.scope().clone());
        let body = Rc::clone(closure.body());
        let params = closure.params().to_vec();
        self.run_frame(frame, scope, |interp| {
            interp.bind_params(name, &params, &args, true)?;
            body(interp, Invocation::new(receiver, args, block))
        })
    }

    // Fallback

    fn dispatch_missing(
        &mut self,
        receiver: &Value,
        name: Name,
        mode: CallMode,
        args: Vec<Value>,
        block: Option<Closure>,
        miss: Miss,
    ) -> EvalResult {
        let Some(fallback) = self.user_override(receiver, self.names.method_missing) else {
            return Err(self.fail(self.miss_error(receiver, name, miss)));
        };
        let method = self.name_str(name);
        tracing::debug!(method, ?miss, "dispatching to method_missing");

        let predicate = if self
            .user_override(receiver, self.names.respond_to_missing)
            .is_some()
        {
            let include_private = self.reaches_private(receiver, mode);
            let answer = self.call(
                receiver,
                self.names.respond_to_missing,
                CallMode::Send,
                vec![Value::symbol(name), Value::bool(include_private)],
                None,
            )?;
            Some(answer.is_truthy())
        } else {
            None
        };

        let mut fallback_args = Vec::with_capacity(args.len() + 1);
        fallback_args.push(Value::symbol(name));
        fallback_args.extend(args);
        let outcome = self.invoke_entry(fallback, receiver.clone(), fallback_args, block);

        let body_missed = matches!(
            &outcome,
            Err(ControlAction::Error(e)) if e.is_no_method_for(method)
        );
        match (predicate, body_missed) {
            (Some(true), true) => {
                tracing::warn!(method, "respond_to_missing? claimed a method method_missing does not handle");
                Err(self.fail(fallback_mismatch(method, true)))
            }
            (Some(false), false) if outcome.is_ok() => {
                tracing::warn!(method, "method_missing handled a method respond_to_missing? denied");
                Err(self.fail(fallback_mismatch(method, false)))
            }
            (_, true) => Err(self.fail(self.miss_error(receiver, name, miss))),
            _ => outcome,
        }
    }

    /// Entry for `name` unless it is the `BasicObject` default.
    fn user_override(&self, receiver: &Value, name: Name) -> Option<MethodEntry> {
        let default_owner = TableOwner::Module(self.model.core().basic_object);
        self.model
            .resolve(receiver, name)
            .filter(|entry| entry.owner != default_owner)
    }

    fn miss_error(&self, receiver: &Value, name: Name, miss: Miss) -> EvalError {
        let method = self.name_str(name);
        let receiver = self.inspect(receiver);
        match miss {
            Miss::NotFound => no_method(method, &receiver),
            Miss::Rejected(visibility) => visibility_violation(method, visibility, &receiver),
        }
    }
}
