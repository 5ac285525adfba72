//! Mote IR - shared identifier types for the Mote object runtime.
//!
//! This crate contains the small set of types every other crate agrees on:
//! - `Name` for interned identifiers (method names, variables, symbols)
//! - `StringInterner` / `SharedInterner` for producing and resolving names
//! - `SourceTag` for the location tag carried by bindings and call frames
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: method and variable names are `Name(u32)`, so a
//!   table lookup compares integers instead of strings.
//! - **Copy Everything Small**: `Name` and `SourceTag` are `Copy` and can be
//!   stored in frames and method entries without cloning strings.

mod interner;
mod name;
mod source_tag;

pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use source_tag::SourceTag;
