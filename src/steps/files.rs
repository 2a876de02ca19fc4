//! File steps: create files and check file properties

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{get_bool, get_str, missing_param};
use crate::engine::{StepFunction, StepOutcome};

/// `files/create_file.py::create_file`
///
/// Parameters: `file_path` (required), `content` (default empty),
/// `ensure_parent_dirs` (default true).
pub struct CreateFile;

#[async_trait]
impl StepFunction for CreateFile {
    async fn call(&self, params: &Map<String, Value>) -> StepOutcome {
        let file_path = match get_str(params, "file_path") {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return missing_param("file_path"),
        };
        let content = get_str(params, "content").unwrap_or("").to_string();
        let ensure_parent_dirs = get_bool(params, "ensure_parent_dirs", true);

        let write = || -> std::io::Result<()> {
            if ensure_parent_dirs {
                if let Some(parent) = std::path::Path::new(&file_path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
            }
            std::fs::write(&file_path, content.as_bytes())
        };

        match write() {
            Ok(()) => StepOutcome::success(format!("File created: {}", file_path)),
            Err(e) => StepOutcome::failure(
                1,
                format!("Failed to create file {}: {}", file_path, e),
                e.to_string(),
            ),
        }
    }
}

/// `files/check_files.py::check_file`
///
/// Parameters: `file_path` (required), `expected_permission` (optional Unix
/// octal string such as "644"). A missing file is an ordinary failure.
pub struct CheckFile;

#[async_trait]
impl StepFunction for CheckFile {
    async fn call(&self, params: &Map<String, Value>) -> StepOutcome {
        let file_path = match get_str(params, "file_path") {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => return missing_param("file_path"),
        };

        let metadata = match std::fs::metadata(&file_path) {
            Ok(m) => m,
            Err(_) => {
                return StepOutcome::failure(
                    1,
                    format!("File does not exist: {}", file_path),
                    "",
                )
            }
        };

        if let Some(expected) = get_str(params, "expected_permission") {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let actual = format!("{:o}", metadata.permissions().mode() & 0o777);
                if actual != expected {
                    return StepOutcome::failure(
                        1,
                        format!(
                            "Permission mismatch for {}: expected {}, found {}",
                            file_path, expected, actual
                        ),
                        "",
                    );
                }
            }
            #[cfg(not(unix))]
            {
                let _ = expected;
            }
        }

        StepOutcome::success(format!("File exists: {}", file_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_file_with_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dir/out.txt");

        let outcome = CreateFile
            .call(&params(json!({
                "file_path": path.to_string_lossy(),
                "content": "hello"
            })))
            .await;

        assert_eq!(outcome.returncode, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_create_file_missing_param() {
        let outcome = CreateFile.call(&Map::new()).await;
        assert_eq!(outcome.returncode, 4);
        assert!(outcome.stderr.contains("file_path"));
    }

    #[tokio::test]
    async fn test_check_file_missing_is_failure() {
        let outcome = CheckFile
            .call(&params(json!({ "file_path": "/nonexistent/file.txt" })))
            .await;
        assert_eq!(outcome.returncode, 1);
        assert!(outcome.stderr.contains("does not exist"));
        assert!(outcome.exception.is_empty());
    }

    #[tokio::test]
    async fn test_check_file_exists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("present.txt");
        std::fs::write(&path, "x").unwrap();

        let outcome = CheckFile
            .call(&params(json!({ "file_path": path.to_string_lossy() })))
            .await;
        assert_eq!(outcome.returncode, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_check_file_permission_mismatch() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("mode.txt");
        std::fs::write(&path, "x").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).unwrap();

        let outcome = CheckFile
            .call(&params(json!({
                "file_path": path.to_string_lossy(),
                "expected_permission": "644"
            })))
            .await;
        assert_eq!(outcome.returncode, 1);
        assert!(outcome.stderr.contains("Permission mismatch"));
    }
}
