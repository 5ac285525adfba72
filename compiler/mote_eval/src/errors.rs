//! Error and control-flow types for the runtime.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` carries the typed category of a failure. Factory
//! functions (`no_method()`, `visibility_violation()`, ...) are the public way
//! to build an `EvalError`; the interpreter attaches a backtrace at the
//! failure site.

use std::fmt;

use thiserror::Error;

use crate::block_context::FrameId;
use crate::method_table::Visibility;
use crate::value::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, ControlAction>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    // Dispatch
    #[error("undefined method `{method}' for {receiver}")]
    NoMethod { method: String, receiver: String },
    #[error("{visibility} method `{method}' called for {receiver}")]
    VisibilityViolation {
        method: String,
        visibility: Visibility,
        receiver: String,
    },
    #[error(
        "method_missing for `{method}' disagrees with respond_to_missing? (answered {predicate})"
    )]
    FallbackMismatch { method: String, predicate: bool },
    #[error("undefined method `{method}' for `{owner}'")]
    UndefinedMethodName { method: String, owner: String },

    // Closures
    #[error("non-local exit to frame {target} which has already returned")]
    DeadClosureJump { target: u64 },
    #[error("no block given (yield)")]
    NoBlockGiven,
    #[error("undefined local variable `{name}'")]
    UndefinedVariable { name: String },

    // Arguments and types
    #[error("wrong number of arguments to `{name}' (given {got}, expected {expected})")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("can't define singleton for {receiver}")]
    CannotDefineSingleton { receiver: String },

    // Resources
    #[error("stack level too deep (max depth: {depth})")]
    StackOverflow { depth: usize },

    /// Catch-all for failures raised by native method bodies.
    #[error("{message}")]
    Custom { message: String },
}

/// One frame of a captured backtrace, most recent first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub name: String,
    pub location: String,
}

/// Snapshot of the call stack taken where an error was raised.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        EvalBacktrace { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "    from {} in `{}'", frame.location, frame.name)?;
        }
        Ok(())
    }
}

/// Runtime error.
#[derive(Clone, Debug)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Call stack at the failure site, attached by the interpreter.
    pub backtrace: Option<EvalBacktrace>,
    /// Extra context lines.
    pub notes: Vec<String>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        self.backtrace = Some(backtrace);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Fatal errors abort evaluation; embedders must not resume after one.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind, EvalErrorKind::DeadClosureJump { .. })
    }

    /// Whether this is a `NoMethod` failure for `method`.
    pub fn is_no_method_for(&self, method: &str) -> bool {
        matches!(&self.kind, EvalErrorKind::NoMethod { method: m, .. } if m == method)
    }

    /// Full report: message, notes, then backtrace.
    pub fn report(&self) -> String {
        let mut out = self.kind.to_string();
        for note in &self.notes {
            out.push_str("\n  note: ");
            out.push_str(note);
        }
        if let Some(bt) = &self.backtrace {
            if !bt.is_empty() {
                out.push('\n');
                out.push_str(&bt.to_string());
            }
        }
        out
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl std::error::Error for EvalError {}

/// Non-value outcome of evaluating a frame.
///
/// Errors and the two unwind signals travel on the same `Err` channel so
/// that `?` propagates all of them through intermediate frames.
#[derive(Clone, Debug)]
pub enum ControlAction {
    /// Runtime failure.
    Error(Box<EvalError>),
    /// `return` from a closure body: unwinds to `target`, whose call then
    /// evaluates to `value`.
    NonLocalExit { target: FrameId, value: Value },
    /// `next`: leaves the innermost block frame with `value`.
    Next(Value),
}

impl ControlAction {
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, ControlAction::Error(_))
    }

    /// Borrow the error, if this is one.
    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            ControlAction::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Convert a signal that escaped every frame into the error it implies.
    pub fn into_eval_error(self) -> EvalError {
        match self {
            ControlAction::Error(e) => *e,
            ControlAction::NonLocalExit { target, .. } => dead_closure_jump(target),
            ControlAction::Next(_) => custom("next used outside of a block"),
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(e: EvalError) -> Self {
        ControlAction::Error(Box::new(e))
    }
}

// Factory functions

#[cold]
pub fn no_method(method: &str, receiver: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NoMethod {
        method: method.to_string(),
        receiver: receiver.to_string(),
    })
}

#[cold]
pub fn visibility_violation(method: &str, visibility: Visibility, receiver: &str) -> EvalError {
    EvalError::new(EvalErrorKind::VisibilityViolation {
        method: method.to_string(),
        visibility,
        receiver: receiver.to_string(),
    })
}

#[cold]
pub fn fallback_mismatch(method: &str, predicate: bool) -> EvalError {
    EvalError::new(EvalErrorKind::FallbackMismatch {
        method: method.to_string(),
        predicate,
    })
}

#[cold]
pub fn undefined_method_name(method: &str, owner: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedMethodName {
        method: method.to_string(),
        owner: owner.to_string(),
    })
}

#[cold]
pub fn dead_closure_jump(target: FrameId) -> EvalError {
    EvalError::new(EvalErrorKind::DeadClosureJump {
        target: target.raw(),
    })
}

#[cold]
pub fn no_block_given() -> EvalError {
    EvalError::new(EvalErrorKind::NoBlockGiven)
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::new(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::new(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn cannot_define_singleton(receiver: &str) -> EvalError {
    EvalError::new(EvalErrorKind::CannotDefineSingleton {
        receiver: receiver.to_string(),
    })
}

#[cold]
pub fn recursion_limit_exceeded(depth: usize) -> EvalError {
    EvalError::new(EvalErrorKind::StackOverflow { depth })
}

#[cold]
pub fn custom(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Custom {
        message: message.into(),
    })
}
