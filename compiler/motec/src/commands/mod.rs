//! Command handlers for the `mote` CLI.
//!
//! Each submodule implements one command. Handlers print their own output
//! and return the process exit code.

mod capture;
mod demo;

pub use capture::run_capture;
pub use demo::{demo_outcomes, run_demo, DemoOptions, ScenarioOutcome};
