//! Engine error types

use crate::plan::LoadError;

/// Errors that can occur during plan execution
///
/// Step-level failures never surface here: they are converted into
/// `StepOutcome`s at the execution boundary. Only plan-level problems
/// (unloadable plan file) abort a plan's processing.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Plan load error: {0}")]
    PlanLoad(#[from] LoadError),

    #[error("Temporary area not created; call create() before resolving <tmp> paths")]
    TmpAreaNotCreated,

    #[error("Configuration error: {0}")]
    Config(String),
}
