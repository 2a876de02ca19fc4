//! Directory suite runner
//!
//! Runs every `*.json` plan in a directory sequentially and aggregates the
//! per-plan summaries. A plan that fails to load is reported and skipped;
//! the rest of the suite still runs.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::error::EngineError;
use super::executor::Engine;
use super::result::SuiteReport;

/// Runs all plans found in one directory through a shared engine
pub struct SuiteRunner {
    directory: PathBuf,
}

impl SuiteRunner {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Execute every plan file in the directory, in name order.
    pub async fn run(&self, engine: &Engine) -> Result<SuiteReport, EngineError> {
        let plan_files = self.plan_files()?;
        if plan_files.is_empty() {
            warn!(dir = %self.directory.display(), "no test plan files found");
        } else {
            info!(
                count = plan_files.len(),
                dir = %self.directory.display(),
                "running test plan suite"
            );
        }

        let mut report = SuiteReport::default();
        for path in &plan_files {
            match engine.run_plan_file(path).await {
                Ok(summary) => report.plans.push(summary),
                // Already reported by the engine; keep going with the rest.
                Err(_) => continue,
            }
        }

        engine.reporter().suite_report(&report);
        Ok(report)
    }

    fn plan_files(&self) -> Result<Vec<PathBuf>, EngineError> {
        let entries = std::fs::read_dir(&self.directory).map_err(|e| {
            EngineError::Config(format!(
                "cannot read plan directory {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().map(|ext| ext == "json").unwrap_or(false)
            })
            .collect();
        files.sort();
        Ok(files)
    }
}

/// Convenience wrapper over [`SuiteRunner`]
pub async fn run_plan_directory(
    directory: &Path,
    engine: &Engine,
) -> Result<SuiteReport, EngineError> {
    SuiteRunner::new(directory).run(engine).await
}
