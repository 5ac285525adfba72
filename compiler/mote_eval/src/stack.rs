//! Stack growth for deeply nested dispatch.
//!
//! Every frame the interpreter enters goes through `ensure_sufficient_stack`,
//! so a long chain of method calls, closures and `super` grows the native
//! stack instead of overflowing it.

/// Run `f`, growing the native stack first when less than the red zone is left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Space that must remain before a frame is entered (100KB).
    const RED_ZONE: usize = 100 * 1024;

    /// Size of each new stack segment (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack; depth is bounded by `RuntimeConfig` instead.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
