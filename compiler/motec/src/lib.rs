//! Mote driver.
//!
//! Hosts the command handlers behind the `mote` binary, the external
//! program runner, and the fixture world: a set of classes and modules
//! exercising visibility, fallback dispatch, closures and block queries
//! on top of `mote_eval`.

pub mod commands;
pub mod fixtures;
pub mod runner;
pub mod tracing_setup;

pub use fixtures::{install, Scenario, ScratchPad, World};
pub use runner::{Command, ProgramRunner, RunnerError, SubprocessRunner};
