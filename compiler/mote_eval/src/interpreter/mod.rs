//! The runtime.
//!
//! `Interpreter` owns the object model, the live call stack and the local
//! variable environment. Host code drives it through three surfaces:
//!
//! - definition: `class_body()`, `define_class()`, `define_module()`
//! - dispatch: `call()`, `call_named()`, `call_super()`, `respond_to()`
//! - closures: `make_proc()`, `call_closure()`, `invoke_closure()`,
//!   `return_value()`, `yield_block()`
//!
//! Every failure that leaves the interpreter carries a backtrace captured
//! where it was raised.

mod builder;
mod builtins;
mod closures;
mod frame_guard;
mod interned_names;
mod method_dispatch;
pub mod resolvers;

pub use builder::InterpreterBuilder;
pub use frame_guard::FrameGuard;
pub use method_dispatch::CallMode;

use mote_ir::{Name, SharedInterner, SourceTag, StringInterner};

use crate::block_context::{CallStack, FrameId};
use crate::closure::Closure;
use crate::config::RuntimeConfig;
use crate::environment::Environment;
use crate::errors::{
    arity_mismatch, type_mismatch, undefined_variable, ControlAction, EvalError, EvalResult,
};
use crate::object_model::{ClassBody, ClassId, ObjectModel};
use crate::value::Value;

use interned_names::RuntimeNames;
use resolvers::MethodDispatcher;

/// Arguments of one method or closure call.
#[derive(Clone, Debug)]
pub struct Invocation {
    pub receiver: Value,
    pub args: Vec<Value>,
    pub block: Option<Closure>,
}

impl Invocation {
    pub fn new(receiver: Value, args: Vec<Value>, block: Option<Closure>) -> Self {
        Invocation {
            receiver,
            args,
            block,
        }
    }

    /// Argument `index`, or `nil` when absent.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).cloned().unwrap_or_default()
    }

    /// Fail unless exactly `expected` arguments were passed.
    pub fn expect_arity(
        &self,
        interp: &Interpreter,
        method: &str,
        expected: usize,
    ) -> Result<(), ControlAction> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(interp.fail(arity_mismatch(method, expected, self.args.len())))
        }
    }

    /// Fail unless between `min` and `max` arguments were passed.
    pub fn expect_arity_range(
        &self,
        interp: &Interpreter,
        method: &str,
        min: usize,
        max: usize,
    ) -> Result<(), ControlAction> {
        let got = self.args.len();
        if (min..=max).contains(&got) {
            Ok(())
        } else {
            let expected = if got < min { min } else { max };
            Err(interp.fail(arity_mismatch(method, expected, got)))
        }
    }
}

/// Object runtime with dynamic dispatch, closures and bindings.
pub struct Interpreter {
    pub(crate) model: ObjectModel,
    pub(crate) stack: CallStack,
    pub(crate) env: Environment,
    pub(crate) interner: SharedInterner,
    pub(crate) names: RuntimeNames,
    pub(crate) dispatcher: MethodDispatcher,
    config: RuntimeConfig,
}

impl Interpreter {
    /// Interpreter with default configuration.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    // Accessors

    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ObjectModel {
        &mut self.model
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.stack
    }

    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// String for an interned name.
    #[inline]
    pub fn name_str(&self, name: Name) -> &'static str {
        StringInterner::lookup(&self.interner, name)
    }

    pub fn main_object(&self) -> Value {
        self.model.main_object()
    }

    /// `self` of the nearest non-built-in frame.
    pub fn current_self(&self) -> Value {
        self.stack.current_self().clone()
    }

    pub fn current_frame_id(&self) -> FrameId {
        self.stack.visible_frame().id
    }

    /// Human-readable form of a value, as used in error messages.
    pub fn inspect(&self, value: &Value) -> String {
        self.model.describe(value)
    }

    // Source locations

    /// Record the location the current frame is executing.
    pub fn set_location(&mut self, file: &str, line: u32) {
        let tag = SourceTag::new(self.intern(file), line);
        self.stack.current_frame_mut().tag = tag;
    }

    pub fn location(&self) -> SourceTag {
        self.stack.current_frame().tag
    }

    // Local variables

    /// Read a local variable visible from the current scope.
    pub fn lookup_var(&self, name: &str) -> Result<Value, ControlAction> {
        let name = self.intern(name);
        self.env
            .lookup(name)
            .ok_or_else(|| self.fail(undefined_variable(self.name_str(name))))
    }

    /// Assign a local: the nearest existing binding, else a new one here.
    pub fn set_var(&mut self, name: &str, value: Value) {
        let name = self.intern(name);
        self.env.set(name, value);
    }

    /// Define a local in the innermost scope, shadowing outer ones.
    pub fn define_var(&mut self, name: &str, value: Value) {
        let name = self.intern(name);
        self.env.define(name, value);
    }

    // Definitions

    pub fn define_class(
        &mut self,
        name: &str,
        superclass: Option<ClassId>,
    ) -> Result<ClassId, ControlAction> {
        self.model
            .define_class(name, superclass)
            .map_err(|e| self.fail(e))
    }

    pub fn define_module(&mut self, name: &str) -> ClassId {
        self.model.define_module(name)
    }

    /// Reopen `class` for definitions.
    pub fn class_body(&mut self, class: ClassId) -> ClassBody<'_> {
        ClassBody::new(self, class, false)
    }

    /// `class Name < Superclass ... end`: define the class unless it exists,
    /// then run `body` against it.
    pub fn with_class(
        &mut self,
        name: &str,
        superclass: Option<ClassId>,
        body: impl FnOnce(&mut ClassBody<'_>) -> Result<(), EvalError>,
    ) -> Result<ClassId, ControlAction> {
        let class = match self.model.class_named(name) {
            Some(existing) => existing,
            None => self.define_class(name, superclass)?,
        };
        let outcome = body(&mut self.class_body(class));
        outcome.map_err(|e| self.fail(e))?;
        Ok(class)
    }

    /// `module Name ... end`.
    pub fn with_module(
        &mut self,
        name: &str,
        body: impl FnOnce(&mut ClassBody<'_>) -> Result<(), EvalError>,
    ) -> Result<ClassId, ControlAction> {
        let module = match self.model.class_named(name) {
            Some(existing) => existing,
            None => self.define_module(name),
        };
        let outcome = body(&mut self.class_body(module));
        outcome.map_err(|e| self.fail(e))?;
        Ok(module)
    }

    /// Class or module argument, or a type error.
    pub fn expect_class(&self, value: &Value) -> Result<ClassId, ControlAction> {
        value
            .as_class()
            .ok_or_else(|| self.fail(type_mismatch("class or module", value.type_name())))
    }

    /// Method name from a symbol or string argument.
    pub fn expect_name(&self, value: &Value) -> Result<Name, ControlAction> {
        match value {
            Value::Symbol(name) => Ok(*name),
            Value::Str(s) => Ok(self.intern(s)),
            other => Err(self.fail(type_mismatch("symbol", other.type_name()))),
        }
    }

    // Entry point

    /// Run host code at top level. A `return` that reaches top level ends
    /// the run with its value; any other escaping signal becomes an error.
    pub fn eval_top_level(
        &mut self,
        f: impl FnOnce(&mut Interpreter) -> EvalResult,
    ) -> Result<Value, EvalError> {
        match f(self) {
            Ok(value) => Ok(value),
            Err(ControlAction::NonLocalExit { target, value }) if target == FrameId::TOP_LEVEL => {
                Ok(value)
            }
            Err(other) => {
                let err = other.into_eval_error();
                tracing::debug!(error = %err, "top level terminated");
                Err(err)
            }
        }
    }

    // Errors

    /// Attach the current backtrace to `err`.
    #[cold]
    pub fn fail(&self, err: EvalError) -> ControlAction {
        ControlAction::from(self.stack.attach_backtrace(err, &self.interner))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("model", &self.model)
            .field("depth", &self.stack.depth())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
