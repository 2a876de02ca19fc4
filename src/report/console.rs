//! Console log manager
//!
//! Human-readable reporting, gated by a debug level:
//! - 0: status line only
//! - 1: status + stdout/stderr/exception detail for failed steps
//! - 2: detail for every step

use crate::engine::{ExecutionRecord, PlanSummary, SuiteReport};
use crate::plan::TestPlan;

/// Console verbosity for step detail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Quiet,
    OnFailure,
    Always,
}

impl DebugLevel {
    pub fn from_u8(level: u8) -> Self {
        match level {
            0 => DebugLevel::Quiet,
            1 => DebugLevel::OnFailure,
            _ => DebugLevel::Always,
        }
    }
}

/// Renders execution progress and summaries to stdout
#[derive(Debug, Default, Clone)]
pub struct ConsoleReporter {
    debug_level: DebugLevel,
}

impl ConsoleReporter {
    pub fn new(debug_level: DebugLevel) -> Self {
        Self { debug_level }
    }

    fn should_show_detail(&self, record: &ExecutionRecord) -> bool {
        match self.debug_level {
            DebugLevel::Quiet => false,
            DebugLevel::OnFailure => !record.passed(),
            DebugLevel::Always => true,
        }
    }

    pub fn plan_start(&self, plan: &TestPlan) {
        println!("\n{}", "=".repeat(60));
        println!("Executing Test Plan: {}", plan.name);
        println!(
            "Description: {}",
            plan.description.as_deref().unwrap_or("No description")
        );
        println!("Timestamp: {}", chrono::Local::now().to_rfc3339());
        println!("{}", "=".repeat(60));
    }

    pub fn case_start(&self, name: &str, description: &str) {
        println!("\nExecuting Test Case: {}", name);
        println!("Description: {}", description);
    }

    pub fn step_result(&self, record: &ExecutionRecord) {
        // Negative steps show both the inverted and the original code
        if record.is_negative_test {
            let original = record.original_returncode.unwrap_or(record.result.returncode);
            println!(
                "  Step {} ({}) [negative]: {} (returncode {}, original {})",
                record.step_number,
                record.test_case,
                record.status(),
                record.result.returncode,
                original
            );
        } else {
            println!(
                "  Step {} ({}): {}",
                record.step_number,
                record.test_case,
                record.status()
            );
        }

        if self.should_show_detail(record) {
            self.step_detail(record);
        }
    }

    fn step_detail(&self, record: &ExecutionRecord) {
        let indent = "    ";

        let stdout = record.result.stdout.trim();
        if !stdout.is_empty() {
            println!("{}STDOUT: {}", indent, stdout);
        }

        let stderr = record.result.stderr.trim();
        if !stderr.is_empty() {
            println!("{}STDERR: {}", indent, stderr);
        }

        let exception = record.result.exception.trim();
        if !exception.is_empty() {
            println!("{}EXCEPTION: {}", indent, exception);
        }

        println!("{}RETURNCODE: {}", indent, record.result.returncode);
    }

    pub fn plan_summary(&self, summary: &PlanSummary) {
        println!("\n{}", "=".repeat(60));
        println!("Test Plan Summary: {}", summary.plan_name);
        println!("Total Steps: {}", summary.total_steps());
        println!("Passed: {}", summary.passed_steps());
        println!("Failed: {}", summary.failed_steps());

        if summary.total_steps() > 0 {
            println!("Success Rate: {:.1}%", summary.success_rate());
        } else {
            println!("Success Rate: N/A");
        }

        println!("{}", "=".repeat(60));
    }

    pub fn log_written(&self, path: &std::path::Path) {
        println!("Detailed report saved to: {}", path.display());
    }

    pub fn suite_report(&self, report: &SuiteReport) {
        println!("\n{}", "#".repeat(80));
        println!("# FINAL EXECUTION REPORT");
        println!("{}", "#".repeat(80));

        println!("Total Test Plans Executed: {}", report.total_plans());
        println!("Total Test Steps Executed: {}", report.total_steps());
        println!("Total Steps Passed: {}", report.passed_steps());
        println!("Total Steps Failed: {}", report.failed_steps());

        if report.total_steps() > 0 {
            println!("Overall Success Rate: {:.1}%", report.success_rate());
        }

        println!("{}", "#".repeat(80));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StepOutcome;
    use crate::plan::StepNumber;
    use chrono::Utc;

    fn record(returncode: i32, negative: bool, original: Option<i32>) -> ExecutionRecord {
        ExecutionRecord {
            test_case: "case".to_string(),
            step_number: StepNumber::Int(1),
            test_script: "s".to_string(),
            test_function: "f".to_string(),
            parameters: serde_json::json!({}),
            authentication: None,
            timestamp: Utc::now(),
            is_negative_test: negative,
            original_returncode: original,
            result: StepOutcome {
                returncode,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_detail_gating() {
        let quiet = ConsoleReporter::new(DebugLevel::Quiet);
        let on_failure = ConsoleReporter::new(DebugLevel::OnFailure);
        let always = ConsoleReporter::new(DebugLevel::Always);

        let passed = record(0, false, None);
        let failed = record(1, false, None);

        assert!(!quiet.should_show_detail(&passed));
        assert!(!quiet.should_show_detail(&failed));

        assert!(!on_failure.should_show_detail(&passed));
        assert!(on_failure.should_show_detail(&failed));

        assert!(always.should_show_detail(&passed));
        assert!(always.should_show_detail(&failed));
    }

    #[test]
    fn test_debug_level_from_u8() {
        assert_eq!(DebugLevel::from_u8(0), DebugLevel::Quiet);
        assert_eq!(DebugLevel::from_u8(1), DebugLevel::OnFailure);
        assert_eq!(DebugLevel::from_u8(2), DebugLevel::Always);
    }
}
