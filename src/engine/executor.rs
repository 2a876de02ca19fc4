//! Plan execution engine
//!
//! Walks plan -> cases -> steps in order, resolving each step's function
//! from the registry, assembling its parameters (temp-path placeholders plus
//! stored credentials), invoking it, and recording the outcome. Step
//! failures of any kind become `ExecutionRecord`s; nothing a step does can
//! abort the surrounding plan.

use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};

use chrono::Utc;
use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::credentials::CredentialResolver;
use crate::plan::{PlanLoader, Step, TestCase, TestPlan};
use crate::report::{ConsoleReporter, ExecutionLogger};

use super::error::EngineError;
use super::events::{EventSender, ExecutionEvent};
use super::registry::StepRegistry;
use super::result::{ExecutionRecord, PlanSummary, StepOutcome};
use super::tmp_area::TmpArea;

/// Default directory for JSON execution logs
pub const DEFAULT_LOG_DIR: &str = "execution_logs";

/// The test-plan execution engine
pub struct Engine {
    registry: StepRegistry,
    credentials: CredentialResolver,
    reporter: ConsoleReporter,
    log_dir: PathBuf,
    tmp_base: Option<PathBuf>,
    test_case_id: Option<i64>,
    events: Option<EventSender>,
}

impl Engine {
    pub fn new(registry: StepRegistry) -> Self {
        Self {
            registry,
            credentials: CredentialResolver::keyring(),
            reporter: ConsoleReporter::default(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            tmp_base: None,
            test_case_id: None,
            events: None,
        }
    }

    pub fn with_credentials(mut self, credentials: CredentialResolver) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_reporter(mut self, reporter: ConsoleReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    pub fn with_tmp_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.tmp_base = Some(base.into());
        self
    }

    /// Restrict execution to the test case with this ID
    pub fn with_test_case_filter(mut self, id: Option<i64>) -> Self {
        self.test_case_id = id;
        self
    }

    /// Attach a live event channel
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn reporter(&self) -> &ConsoleReporter {
        &self.reporter
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }

    /// Load and execute a single plan file.
    ///
    /// Load and validation errors abort only this plan; the error is
    /// reported and returned so a suite run can continue with other plans.
    pub async fn run_plan_file(&self, path: &Path) -> Result<PlanSummary, EngineError> {
        let plan = PlanLoader::load_file(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "error loading test plan");
            e
        })?;

        Ok(self.run_plan(&plan, path).await)
    }

    /// Execute an already-loaded plan.
    #[instrument(skip(self, plan), fields(plan_name = %plan.name))]
    pub async fn run_plan(&self, plan: &TestPlan, plan_path: &Path) -> PlanSummary {
        info!("starting test plan: {}", plan.name);
        self.reporter.plan_start(plan);
        self.emit(ExecutionEvent::plan_started(&plan.name));

        // Temp area before any step runs; a failed create degrades the run
        // (steps referencing <tmp> will fail) but does not abort it.
        let mut tmp = TmpArea::new(self.tmp_base.clone());
        let created = tmp.create();
        if !created.passed() {
            warn!("continuing without a temporary area: {}", created.stderr);
        }

        let mut logger = ExecutionLogger::start(&self.log_dir, &plan.name, plan_path);
        let mut records = Vec::new();

        let selected: Vec<&TestCase> = match self.test_case_id {
            Some(id) => plan.test_cases.iter().filter(|c| c.id == id).collect(),
            None => plan.test_cases.iter().collect(),
        };

        if self.test_case_id.is_some() && selected.is_empty() {
            info!(
                filter = self.test_case_id,
                "no test case matched the requested ID"
            );
        }

        for case in selected {
            self.reporter.case_start(&case.name, &case.description);
            self.emit(ExecutionEvent::case_started(&plan.name, &case.name));

            for step in &case.steps {
                self.emit(ExecutionEvent::step_started(
                    &plan.name,
                    &case.name,
                    step.step_number.to_string(),
                ));

                let record = self.execute_step(&tmp, case, step).await;

                self.reporter.step_result(&record);
                logger.add_step_result(&record);
                self.emit(ExecutionEvent::step_completed(&plan.name, &record));
                records.push(record);
            }
        }

        let summary = PlanSummary {
            plan_name: plan.name.clone(),
            plan_path: plan_path.display().to_string(),
            timestamp: Utc::now(),
            tmp_area_info: tmp.info(),
            records,
        };

        self.reporter.plan_summary(&summary);

        match logger.finish() {
            Ok(log_path) => self.reporter.log_written(&log_path),
            Err(e) => warn!(error = %e, "execution log not persisted"),
        }

        let cleaned = tmp.cleanup();
        if !cleaned.passed() {
            warn!("temporary area cleanup failed: {}", cleaned.stderr);
        }

        self.emit(ExecutionEvent::plan_completed(&summary));
        info!(
            total = summary.total_steps(),
            passed = summary.passed_steps(),
            "test plan finished"
        );

        summary
    }

    /// Execute one step and build its record. Every failure mode is
    /// converted into a `StepOutcome` here: resolution failures become
    /// returncode 3, parameter or invocation failures returncode 4.
    async fn execute_step(&self, tmp: &TmpArea, case: &TestCase, step: &Step) -> ExecutionRecord {
        let (parameters, outcome) = match self
            .registry
            .resolve(&step.test_script, &step.test_function)
        {
            Err(e) => {
                debug!(error = %e, "step function resolution failed");
                (
                    step.parameters.clone(),
                    StepOutcome::failure(
                        3,
                        format!("Failed to import function {}: {}", step.test_function, e),
                        "Function import failed",
                    ),
                )
            }
            Ok(function) => match tmp.process_parameters(&step.parameters) {
                Err(e) => (
                    step.parameters.clone(),
                    StepOutcome::failure(4, format!("Execution error: {}", e), e.to_string()),
                ),
                Ok(resolved) => {
                    let merged = self.assemble_parameters(&resolved, step);

                    let outcome = match AssertUnwindSafe(function.call(&merged))
                        .catch_unwind()
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(panic) => {
                            let message = panic_message(panic);
                            StepOutcome::failure(
                                4,
                                format!("Execution error: {}", message),
                                message,
                            )
                        }
                    };

                    // The record keeps resolved parameters but not the
                    // merged credential values.
                    (resolved, outcome)
                }
            },
        };

        let (outcome, original_returncode) = if case.negative_test {
            let original = outcome.returncode;
            let inverted = if original != 0 { 0 } else { 1 };
            (
                StepOutcome {
                    returncode: inverted,
                    ..outcome
                },
                Some(original),
            )
        } else {
            (outcome, None)
        };

        ExecutionRecord {
            test_case: case.name.clone(),
            step_number: step.step_number.clone(),
            test_script: step.test_script.clone(),
            test_function: step.test_function.clone(),
            parameters,
            authentication: step.authentication.clone(),
            timestamp: Utc::now(),
            is_negative_test: case.negative_test,
            original_returncode,
            result: outcome,
        }
    }

    /// Merge resolved credentials into the step parameters. Credential keys
    /// overwrite same-named parameters.
    fn assemble_parameters(
        &self,
        resolved: &Value,
        step: &Step,
    ) -> serde_json::Map<String, Value> {
        let mut merged = resolved.as_object().cloned().unwrap_or_default();

        let credentials = self
            .credentials
            .resolve_authentication(step.authentication.as_ref());
        for (key, value) in credentials {
            merged.insert(key, value);
        }

        merged
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "step function panicked".to_string()
    }
}
