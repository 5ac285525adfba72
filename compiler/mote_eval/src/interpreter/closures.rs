//! Closures, bindings and non-local control flow.
//!
//! # Return Targets
//!
//! A `return` leaves the frame named by the current frame's return target:
//!
//! - method body: the method's own frame
//! - proc body: the frame that created the proc (its *home*)
//! - lambda or `define_method` body: the closure's own frame
//! - code run against a binding: the binding's home
//!
//! When the target is no longer on the stack the jump cannot happen and
//! fails with `DeadClosureJump`.

use std::rc::Rc;

use mote_ir::Name;

use crate::block_context::{CallFrame, FrameKind};
use crate::closure::{Binding, Closure, ClosureKind};
use crate::errors::{
    arity_mismatch, dead_closure_jump, no_block_given, ControlAction, EvalResult,
};
use crate::method_table::{native_fn, NativeFn};
use crate::value::Value;

use super::frame_guard::ScopeEntry;
use super::{Interpreter, Invocation};

impl Interpreter {
    // Capture

    /// Binding over the current scope, self, home frame and block.
    pub fn capture_binding(&self) -> Binding {
        let frame = self.stack.visible_frame();
        Binding::new(
            self.env.current_scope(),
            frame.self_value.clone(),
            frame.return_target,
            frame.block.clone(),
            frame.tag,
        )
    }

    pub(crate) fn make_closure(
        &self,
        params: &[&str],
        body: NativeFn,
        kind: ClosureKind,
    ) -> Closure {
        let params = params.iter().map(|p| self.intern(p)).collect();
        Closure::new(self.capture_binding(), params, body, kind)
    }

    /// `proc { |params| ... }` closing over the current frame.
    pub fn make_proc(
        &self,
        params: &[&str],
        body: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
    ) -> Closure {
        self.make_closure(params, native_fn(body), ClosureKind::Proc)
    }

    /// `lambda { |params| ... }` closing over the current frame.
    pub fn make_lambda(
        &self,
        params: &[&str],
        body: impl Fn(&mut Interpreter, Invocation) -> EvalResult + 'static,
    ) -> Closure {
        self.make_closure(params, native_fn(body), ClosureKind::Lambda)
    }

    // Invocation

    /// Call a closure. Parameters become locals in a child of the captured
    /// scope; `self` is the captured receiver.
    #[tracing::instrument(level = "debug", skip_all, fields(kind = ?closure.kind()))]
    pub fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        block: Option<Closure>,
    ) -> EvalResult {
        let binding = closure.binding();
        let id = self.stack.next_frame_id();
        let frame = CallFrame {
            id,
            name: self.names.block,
            kind: FrameKind::Block,
            self_value: binding.receiver().clone(),
            block: binding.home_block().cloned(),
            owner: None,
            return_target: if closure.is_lambda() { id } else { binding.home() },
            tag: binding.tag(),
        };
        let scope = ScopeEntry::ChildOf(binding.scope().clone());
        let receiver = binding.receiver().clone();
        let body = Rc::clone(closure.body());
        let params = closure.params().to_vec();
        let strict = closure.is_lambda();
        let label = self.names.block;
        self.run_frame(frame, scope, |interp| {
            interp.bind_params(label, &params, &args, strict)?;
            body(interp, Invocation::new(receiver, args, block))
        })
    }

    /// Run `code` in the binding's scope with the binding's self.
    pub fn invoke_closure(
        &mut self,
        binding: &Binding,
        code: impl FnOnce(&mut Interpreter) -> EvalResult,
    ) -> EvalResult {
        self.invoke_closure_at(binding, binding.tag(), code)
    }

    /// `invoke_closure` reporting `tag` as the executing location.
    pub fn invoke_closure_at(
        &mut self,
        binding: &Binding,
        tag: mote_ir::SourceTag,
        code: impl FnOnce(&mut Interpreter) -> EvalResult,
    ) -> EvalResult {
        let frame = CallFrame {
            id: self.stack.next_frame_id(),
            name: self.names.eval,
            kind: FrameKind::Block,
            self_value: binding.receiver().clone(),
            block: binding.home_block().cloned(),
            owner: None,
            return_target: binding.home(),
            tag,
        };
        self.run_frame(frame, ScopeEntry::Existing(binding.scope().clone()), code)
    }

    /// Bind `params` as locals of the current scope.
    ///
    /// Strict closures demand an exact count. Lenient ones pad with `nil`,
    /// drop extras and splat a lone array over several parameters.
    pub(crate) fn bind_params(
        &mut self,
        label: Name,
        params: &[Name],
        args: &[Value],
        strict: bool,
    ) -> Result<(), ControlAction> {
        if strict && params.len() != args.len() {
            let err = arity_mismatch(self.name_str(label), params.len(), args.len());
            return Err(self.fail(err));
        }
        let splat = match args {
            [single] if !strict && params.len() > 1 => single.as_array().map(<[Value]>::to_vec),
            _ => None,
        };
        let args = splat.as_deref().unwrap_or(args);
        for (i, &param) in params.iter().enumerate() {
            self.env.define(param, args.get(i).cloned().unwrap_or_default());
        }
        Ok(())
    }

    // Control flow

    /// `return value` from the current frame.
    ///
    /// Always `Err`: either the unwind signal or `DeadClosureJump` when the
    /// target frame is gone.
    pub fn return_value(&self, value: Value) -> EvalResult {
        let target = self.stack.visible_frame().return_target;
        if !self.stack.contains(target) {
            tracing::debug!(%target, "return to a dead frame");
            return Err(self.fail(dead_closure_jump(target)));
        }
        Err(ControlAction::NonLocalExit { target, value })
    }

    /// `next value`: leave the innermost block frame.
    pub fn next_value(&self, value: Value) -> EvalResult {
        Err(ControlAction::Next(value))
    }

    /// `begin body ensure cleanup end`. `cleanup` runs on every exit from
    /// `body`, including unwinding; its own failure wins.
    pub fn ensure(
        &mut self,
        body: impl FnOnce(&mut Interpreter) -> EvalResult,
        cleanup: impl FnOnce(&mut Interpreter) -> Result<(), ControlAction>,
    ) -> EvalResult {
        let outcome = body(self);
        cleanup(self)?;
        outcome
    }

    // Blocks

    /// Whether the current method received a block.
    pub fn block_given(&self) -> bool {
        self.stack.block_given()
    }

    pub fn current_block(&self) -> Option<Closure> {
        self.stack.current_block().cloned()
    }

    /// `yield args`.
    pub fn yield_block(&mut self, args: Vec<Value>) -> EvalResult {
        let Some(block) = self.current_block() else {
            return Err(self.fail(no_block_given()));
        };
        self.call_closure(&block, args, None)
    }
}
