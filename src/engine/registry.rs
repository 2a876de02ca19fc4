//! Step function catalog
//!
//! Steps reference their implementation by a `(script, function)` pair. The
//! registry maps those pairs to trait objects satisfying a single-call
//! contract: a parameter map in, a fixed-shape `StepOutcome` out.
//! Implementations convert their own failures into the outcome shape; the
//! registry only reports resolution failures.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::result::StepOutcome;

/// The single-call contract every step implementation satisfies.
///
/// Implementations must not panic or error out of this call: validation and
/// operational failures are reported through the returned outcome.
#[async_trait]
pub trait StepFunction: Send + Sync {
    async fn call(&self, params: &Map<String, Value>) -> StepOutcome;
}

/// Blanket impl so plain async closures can be registered in tests.
pub struct FnStep<F>(pub F);

#[async_trait]
impl<F, Fut> StepFunction for FnStep<F>
where
    F: Fn(Map<String, Value>) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = StepOutcome> + Send,
{
    async fn call(&self, params: &Map<String, Value>) -> StepOutcome {
        (self.0)(params.clone()).await
    }
}

impl std::fmt::Debug for dyn StepFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StepFunction")
    }
}

/// Resolution failures, distinguishing a missing script from a missing
/// function within a known script.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("Function '{function}' not found in {script}")]
    FunctionNotFound { script: String, function: String },
}

/// Catalog mapping `(script, function)` to registered implementations
#[derive(Default)]
pub struct StepRegistry {
    scripts: HashMap<String, HashMap<String, Arc<dyn StepFunction>>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        script: impl Into<String>,
        function: impl Into<String>,
        step: Arc<dyn StepFunction>,
    ) {
        self.scripts
            .entry(script.into())
            .or_default()
            .insert(function.into(), step);
    }

    /// Look up a step implementation. Performed per call at execution time;
    /// there is no caching layer to invalidate.
    pub fn resolve(
        &self,
        script: &str,
        function: &str,
    ) -> Result<Arc<dyn StepFunction>, ResolveError> {
        let functions = self
            .scripts
            .get(script)
            .ok_or_else(|| ResolveError::ScriptNotFound(script.to_string()))?;

        functions
            .get(function)
            .cloned()
            .ok_or_else(|| ResolveError::FunctionNotFound {
                script: script.to_string(),
                function: function.to_string(),
            })
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
