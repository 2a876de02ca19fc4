//! Shared helpers for integration tests: plan JSON builders and stub step
//! functions.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use testplan_runner::credentials::{CredentialResolver, MemoryStore, ScriptedPrompt};
use testplan_runner::{FnStep, StepOutcome, StepRegistry};

/// Serialize a plan document into `dir/<file_name>` and return its path.
pub fn write_plan(dir: &Path, file_name: &str, plan: &Value) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, serde_json::to_string_pretty(plan).unwrap()).unwrap();
    path
}

/// One-case, one-step plan document around the given step object.
pub fn single_step_plan(plan_name: &str, case_id: i64, negative: bool, step: Value) -> Value {
    json!({
        "name": plan_name,
        "description": "integration fixture",
        "test_cases": [
            {
                "id": case_id,
                "name": format!("case {}", case_id),
                "description": "fixture case",
                "negative_test": negative,
                "steps": [step]
            }
        ]
    })
}

/// Step object invoking a stub registered with [`stub_registry`].
pub fn stub_step(step_number: i64, function: &str, parameters: Value) -> Value {
    json!({
        "step_number": step_number,
        "test_script": "stubs/steps.py",
        "test_function": function,
        "parameters": parameters
    })
}

/// Registry of deterministic stub functions:
/// - `ok` returns 0 and echoes its parameters on stdout
/// - `fail` returns the `returncode` parameter (default 5)
/// - `panic` panics
pub fn stub_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();

    registry.register(
        "stubs/steps.py",
        "ok",
        Arc::new(FnStep(|params: serde_json::Map<String, Value>| async move {
            StepOutcome::success(Value::Object(params).to_string())
        })),
    );
    registry.register(
        "stubs/steps.py",
        "fail",
        Arc::new(FnStep(|params: serde_json::Map<String, Value>| async move {
            let code = params
                .get("returncode")
                .and_then(Value::as_i64)
                .unwrap_or(5) as i32;
            StepOutcome::failure(code, "stub failure", "")
        })),
    );
    registry.register(
        "stubs/steps.py",
        "panic",
        Arc::new(FnStep(|_params: serde_json::Map<String, Value>| async move {
            panic!("stub panicked")
        })),
    );

    registry
}

/// Resolver over an in-memory store with no prompt answers.
pub fn memory_credentials() -> CredentialResolver {
    CredentialResolver::new(
        Box::new(MemoryStore::new()),
        Box::new(ScriptedPrompt::new(vec![])),
    )
}

/// Read the single JSON execution log written into `log_dir`.
pub fn read_only_log(log_dir: &Path) -> Value {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(log_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one log file");
    let path = entries.pop().unwrap();
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
