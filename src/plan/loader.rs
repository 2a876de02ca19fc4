//! Test plan loader
//!
//! Load plan JSON files individually or from a directory.

use std::path::Path;

use super::model::TestPlan;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error in {file}: {error}")]
    Json {
        file: String,
        error: serde_json::Error,
    },

    #[error("Invalid test plan {file}: {reason}")]
    Invalid { file: String, reason: String },
}

pub struct PlanLoader;

impl PlanLoader {
    pub fn load_file(path: &Path) -> Result<TestPlan, LoadError> {
        let content = std::fs::read_to_string(path)?;
        let plan: TestPlan = serde_json::from_str(&content).map_err(|e| LoadError::Json {
            file: path.display().to_string(),
            error: e,
        })?;

        plan.validate().map_err(|reason| LoadError::Invalid {
            file: path.display().to_string(),
            reason,
        })?;

        Ok(plan)
    }

    pub fn load_directory(dir: &Path) -> Result<Vec<(std::path::PathBuf, TestPlan)>, LoadError> {
        let mut plans = Vec::new();

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                let plan = Self::load_file(&path)?;
                plans.push((path, plan));
            }
        }

        // Deterministic execution order regardless of readdir ordering
        plans.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plan.json");

        fs::write(
            &path,
            r#"{
                "name": "single-plan",
                "test_cases": [{
                    "id": 1,
                    "name": "case",
                    "description": "desc",
                    "steps": [{
                        "step_number": 1,
                        "test_script": "files/create_file.py",
                        "test_function": "create_file",
                        "parameters": {}
                    }]
                }]
            }"#,
        )
        .unwrap();

        let plan = PlanLoader::load_file(&path).unwrap();
        assert_eq!(plan.name, "single-plan");
    }

    #[test]
    fn test_load_directory_skips_non_json() {
        let dir = tempdir().unwrap();

        fs::write(
            dir.path().join("a.json"),
            r#"{"name": "plan-a", "test_cases": []}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"name": "plan-b", "test_cases": []}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let plans = PlanLoader::load_directory(dir.path()).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].1.name, "plan-a");
        assert_eq!(plans[1].1.name, "plan-b");
    }

    #[test]
    fn test_missing_required_field_is_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"description": "no name or cases"}"#).unwrap();

        match PlanLoader::load_file(&path) {
            Err(LoadError::Json { file, .. }) => assert!(file.ends_with("bad.json")),
            other => panic!("expected Json error, got {:?}", other.map(|p| p.name)),
        }
    }

    #[test]
    fn test_unreadable_plan_is_io_error() {
        let err = PlanLoader::load_file(Path::new("/nonexistent/plan.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
