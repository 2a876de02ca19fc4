//! Builtin step catalog
//!
//! Step implementations registered under the same `(script, function)`
//! identifiers test plans already use. Every implementation honors the step
//! ABI: parameters in, `StepOutcome` out, with validation failures reported
//! as returncode 4 and operational failures as returncode 1.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::engine::{StepOutcome, StepRegistry};

pub mod files;
pub mod git;
pub mod http;
pub mod process;

/// Registry preloaded with the builtin file, process, git, and HTTP steps
pub fn builtin_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();

    registry.register(
        "files/create_file.py",
        "create_file",
        Arc::new(files::CreateFile),
    );
    registry.register(
        "files/check_files.py",
        "check_file",
        Arc::new(files::CheckFile),
    );
    registry.register(
        "process/execute_command.py",
        "execute_command",
        Arc::new(process::ExecuteCommand),
    );
    registry.register(
        "http/http_request.py",
        "make_http_request",
        Arc::new(http::HttpRequest),
    );
    registry.register("git/git_operations.py", "git_clone", Arc::new(git::GitClone));
    registry.register(
        "git/git_operations.py",
        "git_push_file",
        Arc::new(git::GitPushFile),
    );
    registry.register(
        "git/git_operations.py",
        "git_delete_file",
        Arc::new(git::GitDeleteFile),
    );
    registry.register(
        "git/git_operations.py",
        "git_validate_connectivity",
        Arc::new(git::GitValidateConnectivity),
    );

    registry
}

// ============================================================================
// Parameter helpers
// ============================================================================

pub(crate) fn get_str<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str)
}

pub(crate) fn get_bool(params: &Map<String, Value>, key: &str, default: bool) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(default)
}

pub(crate) fn get_u64(params: &Map<String, Value>, key: &str, default: u64) -> u64 {
    params.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// Missing-required-parameter outcome shared by all builtins
pub(crate) fn missing_param(name: &str) -> StepOutcome {
    StepOutcome::failure(4, format!("{} parameter is required", name), "")
}
