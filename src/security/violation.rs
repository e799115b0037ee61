//! Security rejection categories.

use serde::Serialize;

/// A hard security rejection. Never retried by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum SecurityViolation {
    #[error("Invalid channel")]
    InvalidChannel,
    #[error("Unknown channel")]
    UnknownChannel,
    #[error("Gateway is shut down")]
    ShutDown,
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
    #[error("Dangerous operation detected")]
    DangerousOperation,
    #[error("Privilege escalation attempt detected")]
    PrivilegeEscalation,
    #[error("Malicious pattern detected")]
    MaliciousPattern,
}
