//! `InterpreterBuilder` for creating `Interpreter` instances.

use mote_ir::SharedInterner;

use super::interned_names::RuntimeNames;
use super::resolvers::MethodDispatcher;
use super::{builtins, Interpreter};
use crate::block_context::CallStack;
use crate::config::RuntimeConfig;
use crate::environment::Environment;
use crate::object_model::ObjectModel;

/// Builder for `Interpreter`.
///
/// The built interpreter has the core hierarchy bootstrapped and every
/// built-in method registered.
#[derive(Debug, Default)]
pub struct InterpreterBuilder {
    interner: Option<SharedInterner>,
    config: RuntimeConfig,
    main_name: Option<String>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing interner instead of creating one.
    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override just the call-depth limit. `None` means unlimited.
    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    /// Label of the top-level frame in backtraces (default `main`).
    #[must_use]
    pub fn main_name(mut self, name: impl Into<String>) -> Self {
        self.main_name = Some(name.into());
        self
    }

    pub fn build(self) -> Interpreter {
        let interner = self.interner.unwrap_or_default();
        let model = ObjectModel::new(interner.clone());
        let main_name = interner.intern(self.main_name.as_deref().unwrap_or("main"));
        let stack = CallStack::new(self.config.max_call_depth, main_name, model.main_object());
        tracing::debug!(max_call_depth = ?self.config.max_call_depth, "building interpreter");

        let mut interpreter = Interpreter {
            names: RuntimeNames::new(&interner),
            model,
            stack,
            env: Environment::new(),
            interner,
            dispatcher: MethodDispatcher::standard(),
            config: self.config,
        };
        builtins::register(&mut interpreter);
        interpreter
    }
}
