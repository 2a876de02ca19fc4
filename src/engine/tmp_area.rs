//! Per-execution temporary area
//!
//! Each plan execution owns one scratch directory. String parameters may
//! carry the literal `<tmp>` token, which resolves to that directory once it
//! has been created. Resolution is only valid between `create()` and
//! `cleanup()` - steps receive fully resolved, concrete paths.

use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::EngineError;
use super::result::{StepOutcome, TmpAreaInfo};

/// Placeholder token replaced with the active temp path
pub const TMP_TOKEN: &str = "<tmp>";

/// Scratch-directory context for one plan execution.
///
/// Owned by the engine for the duration of a single run; two concurrent
/// executions each get their own `TmpArea`, so there is no process-global
/// slot to collide on.
#[derive(Debug)]
pub struct TmpArea {
    base: PathBuf,
    execution_id: Option<String>,
    active_path: Option<PathBuf>,
}

impl TmpArea {
    /// Create an inactive temp area rooted at `base` (defaults to the
    /// platform temp dir). No directory is created yet.
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| std::env::temp_dir().join("testplan_runner"));
        Self {
            base,
            execution_id: None,
            active_path: None,
        }
    }

    /// Create the execution directory. Returns a `StepOutcome` rather than an
    /// error: infrastructure failures degrade the run, they do not abort it.
    pub fn create(&mut self) -> StepOutcome {
        let execution_id = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self.base.join(&execution_id);

        match std::fs::create_dir_all(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "temporary area created");
                self.execution_id = Some(execution_id);
                let outcome =
                    StepOutcome::success(format!("Temporary area created: {}", path.display()));
                self.active_path = Some(path);
                outcome
            }
            Err(e) => {
                warn!(error = %e, "failed to create temporary area");
                StepOutcome::failure(
                    2,
                    format!("Failed to create temporary area: {}", e),
                    e.to_string(),
                )
            }
        }
    }

    /// Recursively remove the execution directory. Missing directory is a
    /// no-op success, so cleanup is idempotent.
    pub fn cleanup(&mut self) -> StepOutcome {
        let path = match self.active_path.take() {
            Some(p) => p,
            None => return StepOutcome::default(),
        };

        if !path.exists() {
            return StepOutcome::default();
        }

        match std::fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "temporary area cleaned up");
                StepOutcome::success(format!("Temporary area cleaned up: {}", path.display()))
            }
            Err(e) => {
                warn!(error = %e, "failed to clean up temporary area");
                StepOutcome::failure(
                    2,
                    format!("Failed to clean up temporary area: {}", e),
                    e.to_string(),
                )
            }
        }
    }

    /// Substitute the `<tmp>` token in a string and normalize separators.
    /// Strings without the token pass through unchanged.
    pub fn resolve(&self, input: &str) -> Result<String, EngineError> {
        if !input.contains(TMP_TOKEN) {
            return Ok(input.to_string());
        }

        let path = self.path()?;
        let substituted = input.replace(TMP_TOKEN, &path.to_string_lossy());

        // Normalize to the platform separator without touching URL-like text
        let normalized: PathBuf = PathBuf::from(substituted).components().collect();
        Ok(normalized.to_string_lossy().into_owned())
    }

    /// Deep-walk a parameter tree, resolving `<tmp>` in every string leaf.
    /// Objects and arrays are recursed into; other values pass through.
    /// Returns a new tree; the input is never mutated.
    pub fn process_parameters(&self, params: &Value) -> Result<Value, EngineError> {
        match params {
            Value::String(s) => Ok(Value::String(self.resolve(s)?)),
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), self.process_parameters(value)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.process_parameters(item)?);
                }
                Ok(Value::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// The active execution directory, or an error before `create()`.
    pub fn path(&self) -> Result<&Path, EngineError> {
        self.active_path
            .as_deref()
            .ok_or(EngineError::TmpAreaNotCreated)
    }

    pub fn is_active(&self) -> bool {
        self.active_path.is_some()
    }

    pub fn info(&self) -> TmpAreaInfo {
        TmpAreaInfo {
            execution_id: self.execution_id.clone(),
            path: self
                .active_path
                .as_ref()
                .map(|p| p.display().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_before_create_fails() {
        let area = TmpArea::new(None);
        let err = area.resolve("<tmp>/out.txt").unwrap_err();
        assert!(matches!(err, EngineError::TmpAreaNotCreated));
    }

    #[test]
    fn test_string_without_token_passes_before_create() {
        let area = TmpArea::new(None);
        assert_eq!(area.resolve("plain.txt").unwrap(), "plain.txt");
    }

    #[test]
    fn test_create_resolve_cleanup() {
        let base = tempdir().unwrap();
        let mut area = TmpArea::new(Some(base.path().to_path_buf()));

        let created = area.create();
        assert_eq!(created.returncode, 0);
        assert!(area.path().unwrap().exists());

        let resolved = area.resolve("<tmp>/out.txt").unwrap();
        assert!(resolved.starts_with(&area.path().unwrap().to_string_lossy().to_string()));
        assert!(resolved.ends_with("out.txt"));

        let cleaned = area.cleanup();
        assert_eq!(cleaned.returncode, 0);
        assert!(!area.is_active());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let base = tempdir().unwrap();
        let mut area = TmpArea::new(Some(base.path().to_path_buf()));
        area.create();

        assert_eq!(area.cleanup().returncode, 0);
        assert_eq!(area.cleanup().returncode, 0);
    }

    #[test]
    fn test_process_parameters_recurses() {
        let base = tempdir().unwrap();
        let mut area = TmpArea::new(Some(base.path().to_path_buf()));
        area.create();
        let root = area.path().unwrap().to_string_lossy().to_string();

        let params = json!({
            "file_path": "<tmp>/data.txt",
            "config": {
                "input_dir": "<tmp>/input",
                "retries": 3
            },
            "files": ["<tmp>/a.txt", "plain.txt", true, null]
        });

        let processed = area.process_parameters(&params).unwrap();

        assert_eq!(
            processed["file_path"].as_str().unwrap(),
            format!("{}/data.txt", root)
        );
        assert_eq!(
            processed["config"]["input_dir"].as_str().unwrap(),
            format!("{}/input", root)
        );
        assert_eq!(processed["config"]["retries"], json!(3));
        assert_eq!(
            processed["files"][0].as_str().unwrap(),
            format!("{}/a.txt", root)
        );
        assert_eq!(processed["files"][1], json!("plain.txt"));
        assert_eq!(processed["files"][2], json!(true));
        assert_eq!(processed["files"][3], json!(null));

        // Input untouched
        assert_eq!(params["file_path"], json!("<tmp>/data.txt"));
    }

    #[test]
    fn test_info_before_and_after_create() {
        let base = tempdir().unwrap();
        let mut area = TmpArea::new(Some(base.path().to_path_buf()));
        assert!(area.info().path.is_none());

        area.create();
        let info = area.info();
        assert!(info.execution_id.is_some());
        assert!(info.path.is_some());
    }
}
