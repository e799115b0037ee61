//! Audit records.

use serde::Serialize;

use crate::gateway::context::SecurityContext;

/// Outcome recorded for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditDecision {
    Allowed,
    Blocked,
    Error,
}

impl AuditDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditDecision::Allowed => "allowed",
            AuditDecision::Blocked => "blocked",
            AuditDecision::Error => "error",
        }
    }
}

/// Immutable record of one admit/deny/error decision.
///
/// Holds only scalar data derived from the call; the arguments themselves are
/// never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub timestamp: u64,
    pub channel: String,
    pub decision: AuditDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub context: SecurityContext,
}

impl AuditEntry {
    pub fn new(decision: AuditDecision, reason: Option<String>, context: SecurityContext) -> Self {
        Self {
            timestamp: context.timestamp(),
            channel: context.channel().to_string(),
            decision,
            reason,
            context,
        }
    }
}
