//! Execution reporting
//!
//! - `console` - human-readable, debug-level-gated display
//! - `json_log` - durable per-execution JSON log file

pub mod console;
pub mod json_log;

pub use console::{ConsoleReporter, DebugLevel};
pub use json_log::{ExecutionLogger, LogError};
