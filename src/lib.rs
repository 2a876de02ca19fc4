//! # Testplan Runner
//!
//! A data-driven test automation engine. Test plans are plain JSON documents
//! (plan -> test cases -> steps); each step names a function in a registered
//! catalog and the parameters to call it with. The engine executes steps
//! sequentially, resolves `<tmp>` placeholders against a per-execution
//! scratch directory, merges stored credentials into step parameters, and
//! records every outcome in a console report and a durable JSON log.
//!
//! ## Features
//!
//! - **Declarative JSON plans** - Describe tests as data, not code
//! - **Step catalog** - File, process, and HTTP steps built in; register
//!   your own via [`StepFunction`]
//! - **Negative tests** - Invert pass/fail per test case
//! - **Credential store** - Authentication material resolved from the OS
//!   keyring, never written into plan files
//! - **Live events** - Attach a channel and observe execution as it happens
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use testplan_runner::{steps, Engine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = Engine::new(steps::builtin_registry());
//!     let summary = engine.run_plan_file(Path::new("plans/smoke.json")).await?;
//!
//!     println!(
//!         "{}/{} steps passed",
//!         summary.passed_steps(),
//!         summary.total_steps()
//!     );
//!     Ok(())
//! }
//! ```

pub mod credentials;
pub mod engine;
pub mod plan;
pub mod report;
pub mod steps;

// Re-export main types
pub use credentials::{
    CredentialError, CredentialPrompt, CredentialResolver, CredentialStore, KeyringStore,
    MemoryStore, ScriptedPrompt, StdinPrompt,
};
pub use engine::{
    run_plan_directory, Engine, EngineError, EventReceiver, EventSender, EventType,
    ExecutionEvent, ExecutionRecord, FnStep, PlanSummary, ResolveError, StepFunction,
    StepOutcome, StepRegistry, SuiteReport, SuiteRunner, TmpArea, TmpAreaInfo, TMP_TOKEN,
};
pub use plan::{AuthRef, AuthType, LoadError, PlanLoader, Step, StepNumber, TestCase, TestPlan};
pub use report::{ConsoleReporter, DebugLevel, ExecutionLogger, LogError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::credentials::{CredentialResolver, CredentialStore, MemoryStore};
    pub use crate::engine::{
        run_plan_directory, Engine, EngineError, ExecutionRecord, FnStep, PlanSummary,
        StepFunction, StepOutcome, StepRegistry, SuiteReport, SuiteRunner,
    };
    pub use crate::plan::{PlanLoader, Step, TestCase, TestPlan};
    pub use crate::report::{ConsoleReporter, DebugLevel};
    pub use crate::steps::builtin_registry;
}
