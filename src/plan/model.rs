//! Test plan, test case, and step definitions
//!
//! This module contains the core data model for JSON test plans.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Test Plan
// ============================================================================

/// A complete test plan definition
///
/// A plan is immutable once loaded: the engine walks its cases and steps in
/// the order given, without reordering or mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPlan {
    /// Plan name (required)
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Test cases to execute, in order
    pub test_cases: Vec<TestCase>,
}

impl TestPlan {
    /// Validate required fields beyond what deserialization enforces.
    ///
    /// Plans are rejected (non-fatally to the whole run) when a case or step
    /// is missing a required field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Missing required field: name".to_string());
        }

        for (i, case) in self.test_cases.iter().enumerate() {
            if case.name.trim().is_empty() {
                return Err(format!("Test case {} missing required field: name", i));
            }
            if case.description.trim().is_empty() {
                return Err(format!(
                    "Test case {} missing required field: description",
                    i
                ));
            }

            for (j, step) in case.steps.iter().enumerate() {
                if step.test_script.trim().is_empty() {
                    return Err(format!(
                        "Step {} in test case {} missing required field: test_script",
                        j, i
                    ));
                }
                if step.test_function.trim().is_empty() {
                    return Err(format!(
                        "Step {} in test case {} missing required field: test_function",
                        j, i
                    ));
                }
                if !step.parameters.is_object() {
                    return Err(format!(
                        "Step {} in test case {} parameters must be an object",
                        j, i
                    ));
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Test Case
// ============================================================================

/// A named group of ordered steps, optionally marked as a negative test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Numeric case ID, used by the `-i` execution filter
    pub id: i64,

    /// Case name
    pub name: String,

    /// Case description (required by the plan format)
    pub description: String,

    /// When true, pass/fail interpretation is flipped for every step
    #[serde(default)]
    pub negative_test: bool,

    /// Steps to execute, in order
    pub steps: Vec<Step>,
}

// ============================================================================
// Step
// ============================================================================

/// A single unit of work: a catalog function reference plus parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Step identifier within the case (plans use both ints and strings)
    pub step_number: StepNumber,

    /// Script identifier in the step catalog (e.g. "files/create_file.py")
    pub test_script: String,

    /// Function name within the script
    pub test_function: String,

    /// Parameter tree passed to the function. Values may be scalars, nested
    /// objects, or arrays; string leaves may contain the `<tmp>` placeholder.
    pub parameters: Value,

    /// Optional stored-credential reference merged into the parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthRef>,
}

/// Step number: plans in the wild carry both integers and strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepNumber {
    Int(i64),
    Text(String),
}

impl std::fmt::Display for StepNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepNumber::Int(n) => write!(f, "{}", n),
            StepNumber::Text(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Reference to a stored credential entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRef {
    /// Credential shape: basic (username/password) or token
    pub authentication_type: AuthType,

    /// Name of the stored entry, combined with a fixed service prefix
    pub authentication_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Basic,
    Token,
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthType::Basic => write!(f, "basic"),
            AuthType::Token => write!(f, "token"),
        }
    }
}
