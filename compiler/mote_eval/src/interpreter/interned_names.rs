//! Pre-interned names for hot-path dispatch.
//!
//! Interned once at `Interpreter` construction so the dispatch engine
//! compares `Name`s instead of hashing strings on every call.

use mote_ir::{Name, StringInterner};

/// Names the dispatch engine and built-ins refer to directly.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RuntimeNames {
    pub(crate) initialize: Name,
    pub(crate) initialize_copy: Name,
    pub(crate) initialize_dup: Name,
    pub(crate) initialize_clone: Name,
    pub(crate) method_missing: Name,
    pub(crate) respond_to_missing: Name,
    /// Frame label for closure calls.
    pub(crate) block: Name,
    /// Frame label for binding evaluation.
    pub(crate) eval: Name,
}

impl RuntimeNames {
    pub(crate) fn new(interner: &StringInterner) -> Self {
        Self {
            initialize: interner.intern("initialize"),
            initialize_copy: interner.intern("initialize_copy"),
            initialize_dup: interner.intern("initialize_dup"),
            initialize_clone: interner.intern("initialize_clone"),
            method_missing: interner.intern("method_missing"),
            respond_to_missing: interner.intern("respond_to_missing?"),
            block: interner.intern("block"),
            eval: interner.intern("eval"),
        }
    }
}
