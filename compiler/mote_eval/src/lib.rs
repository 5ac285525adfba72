//! Mote Eval - dynamic object runtime.
//!
//! This crate implements a message-dispatch object model driven from Rust:
//! classes, modules and per-object singleton tables, method visibility,
//! the `method_missing` fallback, closures and bindings that share a live
//! scope, and non-local `return` from closures.
//!
//! # Architecture
//!
//! - `ObjectModel`: class hierarchy, objects, method tables, lookup paths
//! - `ClassBody`: class-body cursor tracking the default visibility section
//! - `Interpreter`: dispatch engine, call stack, local environment
//! - `MethodDispatcher`: resolver chain (singleton stage, class-chain stage)
//! - `CallStack`: frames, return targets and the `block_given?` query
//! - `Environment`: lexical scopes shared with bindings by reference
//!
//! Host code defines classes through `ClassBody` and runs method bodies as
//! Rust closures receiving `&mut Interpreter` and an `Invocation`.

pub mod block_context;
pub mod closure;
pub mod config;
pub mod environment;
pub mod errors;
pub mod interpreter;
pub mod method_table;
pub mod object_model;
mod stack;
pub mod value;

pub use block_context::{CallFrame, CallStack, FrameId, FrameKind};
pub use closure::{Binding, Closure, ClosureKind};
pub use config::{ConfigError, RuntimeConfig, MAX_DEPTH_ENV};
pub use environment::{Environment, LocalScope, Scope};
pub use errors::{ControlAction, EvalBacktrace, EvalError, EvalErrorKind, EvalResult};
pub use interpreter::resolvers::{MethodDispatcher, MethodResolution};
pub use interpreter::{CallMode, Interpreter, InterpreterBuilder, Invocation};
pub use method_table::{native_fn, MethodBody, MethodEntry, MethodTable, NativeFn, TableOwner, Visibility};
pub use object_model::{ClassBody, ClassId, ClassKind, CoreClasses, ObjectId, ObjectModel};
pub use value::Value;
