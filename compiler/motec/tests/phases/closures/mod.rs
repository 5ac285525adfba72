//! Closure phase tests.
//!
//! - `bindings` - captured scopes, receivers and source tags
//! - `returns` - non-local return through nested frames

mod bindings;
mod returns;
