//! Process step: execute local shell commands

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::info;

use super::{get_str, get_u64, missing_param};
use crate::engine::{StepFunction, StepOutcome};

/// `process/execute_command.py::execute_command`
///
/// Parameters: `command` (required), `run_location` (optional working
/// directory), `timeout` (seconds, default 30), `search_string` (optional
/// substring asserted against stdout+stderr).
pub struct ExecuteCommand;

#[async_trait]
impl StepFunction for ExecuteCommand {
    async fn call(&self, params: &Map<String, Value>) -> StepOutcome {
        let command = match get_str(params, "command") {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => return missing_param("command"),
        };
        let run_location = get_str(params, "run_location").map(String::from);
        let timeout_secs = get_u64(params, "timeout", 30);
        let search_string = get_str(params, "search_string").map(String::from);

        info!(command = %command, "executing command");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&command);
        if let Some(dir) = &run_location {
            cmd.current_dir(dir);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
            .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return StepOutcome::failure(
                    1,
                    format!("Failed to execute command: {}", e),
                    e.to_string(),
                );
            }
            Err(_) => {
                return StepOutcome::failure(
                    1,
                    format!("Command timed out after {} seconds", timeout_secs),
                    "timeout",
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let mut returncode = output.status.code().unwrap_or(-1);

        // Optional content assertion over both streams
        if returncode == 0 {
            if let Some(needle) = &search_string {
                if !stdout.contains(needle.as_str()) && !stderr.contains(needle.as_str()) {
                    return StepOutcome {
                        stdout,
                        stderr: format!("Search string not found in output: {}", needle),
                        exception: String::new(),
                        returncode: 1,
                    };
                }
            }
        }

        if returncode < 0 {
            returncode = 1;
        }

        StepOutcome {
            stdout,
            stderr,
            exception: String::new(),
            returncode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_execute_command() {
        let outcome = ExecuteCommand
            .call(&params(json!({ "command": "echo hello" })))
            .await;
        assert_eq!(outcome.returncode, 0);
        assert_eq!(outcome.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_failing_command_is_result_not_error() {
        let outcome = ExecuteCommand
            .call(&params(json!({ "command": "exit 3" })))
            .await;
        assert_eq!(outcome.returncode, 3);
    }

    #[tokio::test]
    async fn test_missing_command_param() {
        let outcome = ExecuteCommand.call(&Map::new()).await;
        assert_eq!(outcome.returncode, 4);
    }

    #[tokio::test]
    async fn test_search_string_miss_fails() {
        let outcome = ExecuteCommand
            .call(&params(json!({
                "command": "echo hello",
                "search_string": "goodbye"
            })))
            .await;
        assert_eq!(outcome.returncode, 1);
        assert!(outcome.stderr.contains("Search string not found"));
    }

    #[tokio::test]
    async fn test_run_location() {
        let outcome = ExecuteCommand
            .call(&params(json!({
                "command": "pwd",
                "run_location": "/tmp"
            })))
            .await;
        assert_eq!(outcome.returncode, 0);
        let cwd = outcome.stdout.trim();
        assert!(cwd == "/tmp" || cwd == "/private/tmp");
    }

    #[tokio::test]
    async fn test_timeout() {
        let outcome = ExecuteCommand
            .call(&params(json!({
                "command": "sleep 5",
                "timeout": 1
            })))
            .await;
        assert_eq!(outcome.returncode, 1);
        assert!(outcome.stderr.contains("timed out"));
    }
}
