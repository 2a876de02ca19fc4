//! Execution result types
//!
//! `StepOutcome` is the fixed ABI every step function returns. The engine
//! wraps outcomes into `ExecutionRecord`s and aggregates them per plan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plan::{AuthRef, StepNumber};

/// The fixed result shape returned by every step function.
///
/// `returncode == 0` means success. All other fields default to empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepOutcome {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exception: String,
    pub returncode: i32,
}

impl Default for StepOutcome {
    fn default() -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            exception: String::new(),
            returncode: 0,
        }
    }
}

impl StepOutcome {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn failure(
        returncode: i32,
        stderr: impl Into<String>,
        exception: impl Into<String>,
    ) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exception: exception.into(),
            returncode,
        }
    }

    pub fn passed(&self) -> bool {
        self.returncode == 0
    }
}

/// The stored outcome of one executed step, including negative-test
/// bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub test_case: String,
    pub step_number: StepNumber,
    pub test_script: String,
    pub test_function: String,
    /// Parameters as passed to the function (after `<tmp>` resolution)
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthRef>,
    pub timestamp: DateTime<Utc>,
    pub is_negative_test: bool,
    /// Present only for negative tests: the code before inversion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_returncode: Option<i32>,
    pub result: StepOutcome,
}

impl ExecutionRecord {
    pub fn passed(&self) -> bool {
        self.result.passed()
    }

    pub fn status(&self) -> &'static str {
        if self.passed() {
            "PASSED"
        } else {
            "FAILED"
        }
    }
}

/// Information about the temp area used by one plan execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmpAreaInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Aggregated result of one plan execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub plan_name: String,
    pub plan_path: String,
    pub timestamp: DateTime<Utc>,
    pub tmp_area_info: TmpAreaInfo,
    pub records: Vec<ExecutionRecord>,
}

impl PlanSummary {
    pub fn total_steps(&self) -> usize {
        self.records.len()
    }

    pub fn passed_steps(&self) -> usize {
        self.records.iter().filter(|r| r.passed()).count()
    }

    pub fn failed_steps(&self) -> usize {
        self.total_steps() - self.passed_steps()
    }

    /// Success rate in percent; 0.0 when no steps ran.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_steps();
        if total == 0 {
            0.0
        } else {
            (self.passed_steps() as f64 / total as f64) * 100.0
        }
    }
}

/// Aggregate report across a suite of plans
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    pub plans: Vec<PlanSummary>,
}

impl SuiteReport {
    pub fn total_plans(&self) -> usize {
        self.plans.len()
    }

    pub fn total_steps(&self) -> usize {
        self.plans.iter().map(|p| p.total_steps()).sum()
    }

    pub fn passed_steps(&self) -> usize {
        self.plans.iter().map(|p| p.passed_steps()).sum()
    }

    pub fn failed_steps(&self) -> usize {
        self.total_steps() - self.passed_steps()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_steps();
        if total == 0 {
            0.0
        } else {
            (self.passed_steps() as f64 / total as f64) * 100.0
        }
    }
}
