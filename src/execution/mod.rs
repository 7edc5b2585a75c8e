//! Deploy script execution
//!
//! Runs the external deploy script as a child process with a wall-clock
//! timeout and captures its output for the HTTP response.

mod action;
mod executor;

pub use action::DeployAction;
pub use executor::{tail, ExecutionResult, ScriptRunner, OUTPUT_TAIL_BYTES};
