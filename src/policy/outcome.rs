//! Validation result passed from the registry to the dispatcher.

use serde_json::Value;

/// Result of validating one call. Produced once per call and discarded after
/// the dispatcher consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub allowed: bool,
    pub reason: Option<String>,
    pub sanitized_arguments: Option<Vec<Value>>,
}

impl ValidationOutcome {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            sanitized_arguments: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            sanitized_arguments: None,
        }
    }

    /// Attach the sanitized arguments of an allowed call.
    pub fn with_sanitized(mut self, args: Vec<Value>) -> Self {
        self.sanitized_arguments = Some(args);
        self
    }
}
