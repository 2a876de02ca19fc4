//! Live execution events
//!
//! A caller (such as a web backend triggering a run) can attach an unbounded
//! channel to the engine and receive typed events as the plan executes,
//! instead of scraping the process output streams of a child invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{ExecutionRecord, PlanSummary};

pub type EventSender = tokio::sync::mpsc::UnboundedSender<ExecutionEvent>;
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<ExecutionEvent>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PlanStarted,
    CaseStarted,
    StepStarted,
    StepCompleted,
    PlanCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub plan_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returncode: Option<i32>,
}

impl ExecutionEvent {
    pub fn plan_started(plan_name: &str) -> Self {
        Self {
            event_type: EventType::PlanStarted,
            timestamp: Utc::now(),
            plan_name: plan_name.to_string(),
            case_name: None,
            step_number: None,
            status: None,
            returncode: None,
        }
    }

    pub fn case_started(plan_name: &str, case_name: &str) -> Self {
        Self {
            event_type: EventType::CaseStarted,
            timestamp: Utc::now(),
            plan_name: plan_name.to_string(),
            case_name: Some(case_name.to_string()),
            step_number: None,
            status: None,
            returncode: None,
        }
    }

    pub fn step_started(plan_name: &str, case_name: &str, step_number: String) -> Self {
        Self {
            event_type: EventType::StepStarted,
            timestamp: Utc::now(),
            plan_name: plan_name.to_string(),
            case_name: Some(case_name.to_string()),
            step_number: Some(step_number),
            status: None,
            returncode: None,
        }
    }

    pub fn step_completed(plan_name: &str, record: &ExecutionRecord) -> Self {
        Self {
            event_type: EventType::StepCompleted,
            timestamp: Utc::now(),
            plan_name: plan_name.to_string(),
            case_name: Some(record.test_case.clone()),
            step_number: Some(record.step_number.to_string()),
            status: Some(record.status().to_string()),
            returncode: Some(record.result.returncode),
        }
    }

    pub fn plan_completed(summary: &PlanSummary) -> Self {
        Self {
            event_type: EventType::PlanCompleted,
            timestamp: Utc::now(),
            plan_name: summary.plan_name.clone(),
            case_name: None,
            step_number: None,
            status: Some(if summary.failed_steps() == 0 {
                "PASSED".to_string()
            } else {
                "FAILED".to_string()
            }),
            returncode: None,
        }
    }
}
