//! Call frames, the live call stack and the "was a block given?" query.
//!
//! Every method, block, binding evaluation and built-in call pushes a
//! `CallFrame`. Frames pushed for built-ins are *primitive*: `block_given`,
//! `current_self` and closure capture look straight through them, so
//! `Kernel.block_given?` and `send(:block_given?)` answer for their caller.

use std::fmt;

use mote_ir::{Name, SourceTag, StringInterner};

use crate::closure::Closure;
use crate::errors::{recursion_limit_exceeded, BacktraceFrame, EvalBacktrace, EvalError};
use crate::method_table::TableOwner;
use crate::value::Value;

/// Identity of one activation. Never reused while the process runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    /// Frame of top-level code.
    pub const TOP_LEVEL: FrameId = FrameId(0);

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        FrameId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    TopLevel,
    /// User method body.
    Method,
    /// Closure body or binding evaluation.
    Block,
    /// Built-in native.
    Primitive,
}

/// A single frame in the live call stack.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub id: FrameId,
    pub name: Name,
    pub kind: FrameKind,
    pub self_value: Value,
    /// Block visible to `yield` in this frame. For block frames this is the
    /// home frame's block, not anything passed to the closure call.
    pub block: Option<Closure>,
    /// Table of the executing method, for `super`.
    pub owner: Option<TableOwner>,
    /// Where `return` in this frame unwinds to.
    pub return_target: FrameId,
    pub tag: SourceTag,
}

/// Live call stack.
///
/// The top-level frame is pushed at construction and never popped. The depth
/// limit counts frames above it.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
    next_id: u64,
}

impl CallStack {
    /// Create a stack holding only the top-level frame for `main`.
    ///
    /// `max_depth` is `None` for unlimited.
    pub fn new(max_depth: Option<usize>, main_name: Name, main: Value) -> Self {
        let top = CallFrame {
            id: FrameId::TOP_LEVEL,
            name: main_name,
            kind: FrameKind::TopLevel,
            self_value: main,
            block: None,
            owner: None,
            return_target: FrameId::TOP_LEVEL,
            tag: SourceTag::UNKNOWN,
        };
        CallStack {
            frames: vec![top],
            max_depth,
            next_id: 1,
        }
    }

    /// Reserve an id for a frame about to be pushed.
    #[inline]
    pub fn next_frame_id(&mut self) -> FrameId {
        let id = FrameId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Push a call frame, checking the depth limit.
    ///
    /// The frame is NOT pushed on overflow.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.depth() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the most recent frame. The top-level frame stays.
    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "CallStack::pop() on top-level frame");
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Frames above top level.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    #[inline]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Most recent frame, primitive or not.
    #[inline]
    pub fn current_frame(&self) -> &CallFrame {
        // frames[0] is the top-level frame and is never popped
        &self.frames[self.frames.len() - 1]
    }

    #[inline]
    pub fn current_frame_mut(&mut self) -> &mut CallFrame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Nearest frame that is not a built-in.
    pub fn visible_frame(&self) -> &CallFrame {
        self.frames
            .iter()
            .rev()
            .find(|f| f.kind != FrameKind::Primitive)
            .unwrap_or(&self.frames[0])
    }

    /// Nearest visible frame running a method body, for `super`.
    pub fn method_frame(&self) -> Option<&CallFrame> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.kind != FrameKind::Primitive && f.owner.is_some())
    }

    /// Whether the frame is still live.
    pub fn contains(&self, id: FrameId) -> bool {
        self.frames.iter().rev().any(|f| f.id == id)
    }

    /// `self` of the nearest visible frame.
    #[inline]
    pub fn current_self(&self) -> &Value {
        &self.visible_frame().self_value
    }

    /// Block of the nearest visible frame.
    #[inline]
    pub fn current_block(&self) -> Option<&Closure> {
        self.visible_frame().block.as_ref()
    }

    /// Whether the nearest visible frame received a block.
    #[inline]
    pub fn block_given(&self) -> bool {
        self.current_block().is_some()
    }

    /// Snapshot of the stack, most recent call first.
    pub fn capture(&self, interner: &StringInterner) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: interner.lookup(f.name).to_string(),
                location: f.tag.display(interner).to_string(),
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace to an error, keeping one that is already there.
    pub fn attach_backtrace(&self, err: EvalError, interner: &StringInterner) -> EvalError {
        if err.backtrace.is_some() {
            return err;
        }
        err.with_backtrace(self.capture(interner))
    }
}
