//! Aggregated per-channel statistics.

use serde::Serialize;

/// Running statistics for one channel, folded from completed samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelStats {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub average_duration_ms: f64,
    pub min_duration_ms: f64,
    pub max_duration_ms: f64,
    /// Completion time of the latest call, ms since epoch.
    pub last_call_time: u64,
}

impl ChannelStats {
    /// Fold one completed call into the running figures.
    pub fn record(&mut self, duration_ms: f64, success: bool, ended_at: u64) {
        self.total_calls += 1;
        if success {
            self.successful_calls += 1;
        } else {
            self.failed_calls += 1;
        }

        let n = self.total_calls as f64;
        self.average_duration_ms += (duration_ms - self.average_duration_ms) / n;

        if self.total_calls == 1 {
            self.min_duration_ms = duration_ms;
            self.max_duration_ms = duration_ms;
        } else {
            self.min_duration_ms = self.min_duration_ms.min(duration_ms);
            self.max_duration_ms = self.max_duration_ms.max(duration_ms);
        }
        self.last_call_time = self.last_call_time.max(ended_at);
    }

    /// Fraction of calls that failed, 0.0 when nothing was recorded.
    pub fn error_rate(&self) -> f64 {
        if self.total_calls == 0 {
            return 0.0;
        }
        self.failed_calls as f64 / self.total_calls as f64
    }
}
