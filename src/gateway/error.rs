//! Gateway outcome and error types.

use std::any::Any;

use serde_json::Value;

use crate::config::validation::{join_errors, ValidationError};
use crate::policy::ValidationOutcome;
use crate::security::SecurityViolation;

/// Error surfaced to the caller of [`Gateway::invoke`](crate::gateway::Gateway::invoke).
///
/// The `Display` form is the short machine-checkable reason string, e.g.
/// `Security: Rate limit exceeded` or `Validation: Valid UUID required`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Security: {0}")]
    Security(#[from] SecurityViolation),
    #[error("Validation: {0}")]
    Validation(String),
    /// The privileged operation ran and reported a failure.
    #[error("Operation: {0}")]
    Operation(String),
    /// Something unexpected went wrong; details are only logged.
    #[error("Security: Security check failed")]
    Internal,
}

/// A policy decision to refuse a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Security(SecurityViolation),
    Validation(String),
}

impl From<Rejection> for GatewayError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Security(v) => GatewayError::Security(v),
            Rejection::Validation(r) => GatewayError::Validation(r),
        }
    }
}

/// The pipeline's verdict on one call.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Forward these (sanitized) arguments.
    Admitted { arguments: Vec<Value> },
    Rejected(Rejection),
}

impl From<ValidationOutcome> for Decision {
    fn from(outcome: ValidationOutcome) -> Self {
        if outcome.allowed {
            Decision::Admitted {
                arguments: outcome.sanitized_arguments.unwrap_or_default(),
            }
        } else {
            Decision::Rejected(Rejection::Validation(
                outcome
                    .reason
                    .unwrap_or_else(|| "Invalid arguments".to_string()),
            ))
        }
    }
}

/// An unexpected failure inside the gateway, as opposed to a policy
/// decision. Never shown to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal gateway failure: {0}")]
pub struct InternalFailure(pub String);

impl InternalFailure {
    /// Build from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        Self(message)
    }
}

/// Errors constructing a gateway.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("invalid configuration: {}", join_errors(.0))]
    Config(Vec<ValidationError>),
    #[error("failed to compile pattern: {0}")]
    Pattern(#[from] regex::Error),
}
