//! In-memory audit trail.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::audit::entry::{AuditDecision, AuditEntry};
use crate::audit::ring::RingBuffer;
use crate::config::AuditConfig;

/// One row of the most-blocked-channels ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedChannel {
    pub channel: String,
    pub count: usize,
}

/// Aggregate view over the entries currently in the buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityStats {
    pub total: usize,
    pub allowed: usize,
    pub blocked: usize,
    pub errors: usize,
    pub top_blocked_channels: Vec<BlockedChannel>,
}

/// Fixed-capacity, overwrite-on-full record of every gateway decision.
pub struct AuditLog {
    buffer: Mutex<RingBuffer<AuditEntry>>,
    default_top: usize,
}

impl AuditLog {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            buffer: Mutex::new(RingBuffer::with_capacity(config.capacity)),
            default_top: config.top_blocked,
        }
    }

    // A panic while holding the lock cannot leave the ring half-written, so
    // a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, RingBuffer<AuditEntry>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, entry: AuditEntry) {
        self.lock().push(entry);
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.lock().iter().cloned().collect()
    }

    /// The newest `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let buffer = self.lock();
        let skip = buffer.len().saturating_sub(limit);
        buffer.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Stats using the configured ranking length.
    pub fn stats(&self) -> SecurityStats {
        self.stats_top(self.default_top)
    }

    /// Counts per decision plus the `top_n` most-blocked channels, computed
    /// from the current buffer contents.
    pub fn stats_top(&self, top_n: usize) -> SecurityStats {
        let mut stats = SecurityStats::default();
        let mut blocked_by_channel: HashMap<String, usize> = HashMap::new();

        {
            let buffer = self.lock();
            for entry in buffer.iter() {
                stats.total += 1;
                match entry.decision {
                    AuditDecision::Allowed => stats.allowed += 1,
                    AuditDecision::Blocked => {
                        stats.blocked += 1;
                        *blocked_by_channel.entry(entry.channel.clone()).or_default() += 1;
                    }
                    AuditDecision::Error => stats.errors += 1,
                }
            }
        }

        let mut ranking: Vec<BlockedChannel> = blocked_by_channel
            .into_iter()
            .map(|(channel, count)| BlockedChannel { channel, count })
            .collect();
        ranking.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.channel.cmp(&b.channel)));
        ranking.truncate(top_n);
        stats.top_blocked_channels = ranking;
        stats
    }
}
