//! Mock condenser for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Condenser, CondenserError, LengthBudget};

/// Mock condenser that returns a deterministic summary.
///
/// Records every input and budget so tests can check what the dispatcher
/// passed through. Useful for testing without loading an engine.
#[derive(Default)]
pub struct MockCondenser {
    failure: Option<String>,
    calls: Mutex<Vec<(String, LengthBudget)>>,
}

impl MockCondenser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with an engine error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// `(input, budget)` for every call, in order.
    pub fn calls(&self) -> Vec<(String, LengthBudget)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Condenser for MockCondenser {
    async fn condense(&self, text: &str, budget: LengthBudget) -> Result<String, CondenserError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((text.to_string(), budget));

        if let Some(message) = &self.failure {
            return Err(CondenserError::Engine(message.clone()));
        }

        Ok(format!("Condensed {} chars to {}", text.chars().count(), budget))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
