//! Per-call security metadata.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Who is calling, as reported by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOrigin {
    pub origin: String,
    pub user_agent: String,
    pub session_id: String,
}

impl CallOrigin {
    pub fn new(
        origin: impl Into<String>,
        user_agent: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            user_agent: user_agent.into(),
            session_id: session_id.into(),
        }
    }
}

/// Immutable metadata for one call. Lives only as long as the audit entry
/// that embeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityContext {
    channel: String,
    timestamp: u64,
    origin: String,
    user_agent: String,
    session_id: String,
}

impl SecurityContext {
    pub fn new(channel: impl Into<String>, origin: &CallOrigin) -> Self {
        Self {
            channel: channel.into(),
            timestamp: now_millis(),
            origin: origin.origin.clone(),
            user_agent: origin.user_agent.clone(),
            session_id: origin.session_id.clone(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
