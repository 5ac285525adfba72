//! Dispatch phase tests.
//!
//! - `visibility` - sections, directives, `send` and `public_send`
//! - `ancestry` - lookup order, kind-of queries, undef chains
//! - `tables` - method listings per table

mod ancestry;
mod tables;
mod visibility;
