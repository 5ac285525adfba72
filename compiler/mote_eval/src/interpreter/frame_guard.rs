//! RAII frame management.
//!
//! A `FrameGuard` exists for exactly as long as one call frame is on the
//! stack. Dropping it pops the frame and, when the frame pushed one, its
//! local scope, so every exit path (normal return, error, non-local exit,
//! panic) leaves the stack and environment balanced.

use std::ops::{Deref, DerefMut};

use crate::block_context::{CallFrame, FrameKind};
use crate::environment::{LocalScope, Scope};
use crate::errors::{custom, ControlAction, EvalResult};
use crate::stack::ensure_sufficient_stack;

use super::Interpreter;

/// How a new frame's local scope relates to the surrounding ones.
#[derive(Debug)]
pub(crate) enum ScopeEntry {
    /// No scope of its own (built-ins).
    Inherit,
    /// Fresh root scope (method bodies).
    Fresh,
    /// New child of a captured scope (closure bodies).
    ChildOf(LocalScope<Scope>),
    /// Run directly in a captured scope (binding evaluation).
    Existing(LocalScope<Scope>),
}

/// Guard over one pushed frame. Derefs to the interpreter.
pub struct FrameGuard<'a> {
    interpreter: &'a mut Interpreter,
    pushed_scope: bool,
}

impl<'a> FrameGuard<'a> {
    /// Enter a frame that has already been pushed on the call stack.
    pub(crate) fn enter(interpreter: &'a mut Interpreter, scope: ScopeEntry) -> Self {
        let pushed_scope = match scope {
            ScopeEntry::Inherit => false,
            ScopeEntry::Fresh => {
                interpreter.env.push_fresh();
                true
            }
            ScopeEntry::ChildOf(parent) => {
                interpreter.env.push_child_of(parent);
                true
            }
            ScopeEntry::Existing(scope) => {
                interpreter.env.push_existing(scope);
                true
            }
        };
        FrameGuard {
            interpreter,
            pushed_scope,
        }
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        if self.pushed_scope {
            self.interpreter.env.pop_scope();
        }
        self.interpreter.stack.pop();
    }
}

impl Deref for FrameGuard<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push `frame`, run `body` inside it and pop it again.
    ///
    /// The frame consumes a `NonLocalExit` aimed at itself. Block frames also
    /// consume `Next`; a method frame turns it into an error so it never
    /// reaches the caller's block.
    pub(crate) fn run_frame(
        &mut self,
        frame: CallFrame,
        scope: ScopeEntry,
        body: impl FnOnce(&mut Interpreter) -> EvalResult,
    ) -> EvalResult {
        let (id, kind) = (frame.id, frame.kind);
        if let Err(err) = self.stack.push(frame) {
            return Err(self.fail(err));
        }
        let outcome = {
            let mut guard = FrameGuard::enter(self, scope);
            ensure_sufficient_stack(|| body(&mut guard))
        };
        match outcome {
            Err(ControlAction::NonLocalExit { target, value }) if target == id => {
                tracing::trace!(frame = %id, "non-local exit caught");
                Ok(value)
            }
            Err(ControlAction::Next(value)) if kind == FrameKind::Block => Ok(value),
            Err(ControlAction::Next(_)) if kind == FrameKind::Method => {
                Err(self.fail(custom("next used outside of a block")))
            }
            other => other,
        }
    }
}
