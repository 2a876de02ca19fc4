//! Test plan types and loading
//!
//! This module contains everything for defining and parsing test plans:
//! - `model` - TestPlan, TestCase, Step, and authentication references
//! - `loader` - Load plans from files and directories

pub mod loader;
pub mod model;

pub use loader::{LoadError, PlanLoader};
pub use model::{AuthRef, AuthType, Step, StepNumber, TestCase, TestPlan};
