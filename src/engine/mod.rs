//! Execution engine: registry, temp area, executor, and result types

pub mod error;
pub mod events;
pub mod executor;
pub mod registry;
pub mod result;
pub mod suite_runner;
pub mod tmp_area;

pub use error::EngineError;
pub use events::{EventReceiver, EventSender, EventType, ExecutionEvent};
pub use executor::{Engine, DEFAULT_LOG_DIR};
pub use registry::{FnStep, ResolveError, StepFunction, StepRegistry};
pub use result::{ExecutionRecord, PlanSummary, StepOutcome, SuiteReport, TmpAreaInfo};
pub use suite_runner::{run_plan_directory, SuiteRunner};
pub use tmp_area::{TmpArea, TMP_TOKEN};
