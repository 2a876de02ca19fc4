//! Durable JSON execution log
//!
//! One logger instance per plan execution. `start()` captures the execution
//! identity, `add_step_result()` keeps running totals, `finish()` writes
//! `log_<plan-name>_<YYYY-MM-DD_HH_MM>.json` into the log directory.
//! Write failures are logged and returned as values; they never panic or
//! propagate past this boundary.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local, Utc};
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::engine::ExecutionRecord;

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Log write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Accumulates one plan execution into a JSON log document
pub struct ExecutionLogger {
    log_dir: PathBuf,
    execution_id: String,
    started_wall: DateTime<Utc>,
    started: Instant,
    plan_name: String,
    plan_path: String,
    command_line: String,
    current_user: String,
    total_steps: usize,
    passed_steps: usize,
    detailed_results: Vec<serde_json::Value>,
}

impl ExecutionLogger {
    pub fn start(log_dir: impl Into<PathBuf>, plan_name: &str, plan_path: &Path) -> Self {
        Self {
            log_dir: log_dir.into(),
            execution_id: Uuid::new_v4().to_string(),
            started_wall: Utc::now(),
            started: Instant::now(),
            plan_name: plan_name.to_string(),
            plan_path: plan_path.display().to_string(),
            command_line: std::env::args().collect::<Vec<_>>().join(" "),
            current_user: std::env::var("USER")
                .or_else(|_| std::env::var("USERNAME"))
                .unwrap_or_else(|_| "unknown".to_string()),
            total_steps: 0,
            passed_steps: 0,
            detailed_results: Vec::new(),
        }
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    pub fn add_step_result(&mut self, record: &ExecutionRecord) {
        self.total_steps += 1;
        if record.passed() {
            self.passed_steps += 1;
        }

        let mut entry = json!({
            "test_case": record.test_case,
            "step_number": record.step_number,
            "test_script": record.test_script,
            "test_function": record.test_function,
            "status": record.status(),
            "returncode": record.result.returncode,
            "timestamp": record.timestamp,
            "stdout": record.result.stdout,
            "stderr": record.result.stderr,
            "exception": record.result.exception,
        });
        if let Some(original) = record.original_returncode {
            entry["original_returncode"] = json!(original);
        }

        self.detailed_results.push(entry);
    }

    fn success_rate(&self) -> f64 {
        if self.total_steps == 0 {
            0.0
        } else {
            (self.passed_steps as f64 / self.total_steps as f64) * 100.0
        }
    }

    /// Filename derived from the plan name (spaces become underscores) and a
    /// minute-granularity local timestamp.
    fn file_name(&self) -> String {
        let clean_name = self.plan_name.replace(' ', "_");
        format!(
            "log_{}_{}.json",
            clean_name,
            Local::now().format("%Y-%m-%d_%H_%M")
        )
    }

    /// Serialize the full document to disk and return the file path.
    pub fn finish(self) -> Result<PathBuf, LogError> {
        let document = json!({
            "execution_id": self.execution_id,
            "timestamp": self.started_wall,
            "current_user": self.current_user,
            "test_plan": self.plan_path,
            "test_plan_name": self.plan_name,
            "command_line": self.command_line,
            "execution_time_seconds": self.started.elapsed().as_secs_f64(),
            "results": {
                "total_steps": self.total_steps,
                "passed_steps": self.passed_steps,
                "failed_steps": self.total_steps - self.passed_steps,
                "success_rate": self.success_rate(),
            },
            "detailed_results": self.detailed_results,
        });

        let write = || -> Result<PathBuf, LogError> {
            std::fs::create_dir_all(&self.log_dir)?;
            let path = self.log_dir.join(self.file_name());
            std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
            Ok(path)
        };

        write().map_err(|e| {
            warn!(error = %e, "failed to write execution log");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StepOutcome;
    use crate::plan::StepNumber;
    use tempfile::tempdir;

    fn record(returncode: i32) -> ExecutionRecord {
        ExecutionRecord {
            test_case: "case".to_string(),
            step_number: StepNumber::Int(1),
            test_script: "files/create_file.py".to_string(),
            test_function: "create_file".to_string(),
            parameters: serde_json::json!({}),
            authentication: None,
            timestamp: Utc::now(),
            is_negative_test: false,
            original_returncode: None,
            result: StepOutcome {
                returncode,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_log_document_shape() {
        let dir = tempdir().unwrap();
        let mut logger =
            ExecutionLogger::start(dir.path(), "My Plan", Path::new("plans/my_plan.json"));
        logger.add_step_result(&record(0));
        logger.add_step_result(&record(1));

        let path = logger.finish().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("log_My_Plan_"), "unexpected name: {}", name);
        assert!(name.ends_with(".json"));

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["test_plan_name"], "My Plan");
        assert_eq!(doc["results"]["total_steps"], 2);
        assert_eq!(doc["results"]["passed_steps"], 1);
        assert_eq!(doc["results"]["failed_steps"], 1);
        assert_eq!(doc["results"]["success_rate"], 50.0);
        assert_eq!(doc["detailed_results"][0]["status"], "PASSED");
        assert_eq!(doc["detailed_results"][1]["status"], "FAILED");
        assert!(doc["execution_id"].as_str().is_some());
        assert!(doc["execution_time_seconds"].as_f64().is_some());
    }

    #[test]
    fn test_empty_run_has_zero_rate() {
        let dir = tempdir().unwrap();
        let logger = ExecutionLogger::start(dir.path(), "empty", Path::new("empty.json"));
        let path = logger.finish().unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["results"]["total_steps"], 0);
        assert_eq!(doc["results"]["success_rate"], 0.0);
    }

    #[test]
    fn test_unwritable_dir_is_error_not_panic() {
        let logger = ExecutionLogger::start(
            "/proc/definitely/not/writable",
            "plan",
            Path::new("plan.json"),
        );
        assert!(logger.finish().is_err());
    }
}
