//! JSON execution log contents produced by real plan runs.

mod common;

use common::{memory_credentials, read_only_log, single_step_plan, stub_registry, stub_step,
    write_plan};
use serde_json::json;
use tempfile::tempdir;
use testplan_runner::Engine;

#[tokio::test]
async fn test_log_document_identity_fields() {
    let plans = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let tmp = tempdir().unwrap();

    let path = write_plan(
        plans.path(),
        "identity.json",
        &single_step_plan("Identity Plan", 1, false, stub_step(1, "ok", json!({}))),
    );

    Engine::new(stub_registry())
        .with_credentials(memory_credentials())
        .with_log_dir(logs.path())
        .with_tmp_base(tmp.path())
        .run_plan_file(&path)
        .await
        .unwrap();

    let log = read_only_log(logs.path());
    assert!(log["execution_id"].as_str().is_some());
    assert_eq!(log["test_plan_name"], "Identity Plan");
    assert_eq!(
        log["test_plan"].as_str().unwrap(),
        path.display().to_string()
    );
    assert!(log["command_line"].as_str().is_some());
    assert!(log["current_user"].as_str().is_some());
    assert!(log["execution_time_seconds"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_detailed_results_carry_step_output() {
    let plans = tempdir().unwrap();
    let logs = tempdir().unwrap();
    let tmp = tempdir().unwrap();

    let path = write_plan(
        plans.path(),
        "detail.json",
        &single_step_plan(
            "Detail Plan",
            1,
            false,
            stub_step(1, "fail", json!({"returncode": 2})),
        ),
    );

    Engine::new(stub_registry())
        .with_credentials(memory_credentials())
        .with_log_dir(logs.path())
        .with_tmp_base(tmp.path())
        .run_plan_file(&path)
        .await
        .unwrap();

    let log = read_only_log(logs.path());
    let entry = &log["detailed_results"][0];
    assert_eq!(entry["test_case"], "case 1");
    assert_eq!(entry["test_script"], "stubs/steps.py");
    assert_eq!(entry["test_function"], "fail");
    assert_eq!(entry["status"], "FAILED");
    assert_eq!(entry["returncode"], 2);
    assert_eq!(entry["stderr"], "stub failure");
    assert!(entry.get("original_returncode").is_none());
    assert_eq!(log["results"]["success_rate"], 0.0);
}
