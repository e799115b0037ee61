//! Call latency and success recording.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::PerformanceConfig;
use crate::gateway::context::now_millis;
use crate::observability::metrics;
use crate::performance::stats::ChannelStats;

/// Identifier handed out by [`PerformanceRecorder::start`].
pub type SampleId = u64;

/// Errors from closing a sample.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecorderError {
    #[error("no in-flight sample with id {0}")]
    UnknownSample(SampleId),
}

/// Timing record for one forwarded call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSample {
    pub id: SampleId,
    pub channel: String,
    /// ms since epoch.
    pub start_time: u64,
    pub end_time: Option<u64>,
    pub duration_ms: Option<f64>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Serialized size of the call arguments in bytes.
    pub payload_size: usize,
}

struct InFlight {
    sample: PerformanceSample,
    started: Instant,
}

/// Latency/success statistics keyed per channel.
pub struct PerformanceRecorder {
    next_id: AtomicU64,
    in_flight: DashMap<SampleId, InFlight>,
    stats: DashMap<String, ChannelStats>,
    history: Mutex<VecDeque<PerformanceSample>>,
    history_capacity: usize,
}

impl PerformanceRecorder {
    pub fn new(config: &PerformanceConfig) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            in_flight: DashMap::new(),
            stats: DashMap::new(),
            history: Mutex::new(VecDeque::with_capacity(config.history_capacity)),
            history_capacity: config.history_capacity,
        }
    }

    fn history(&self) -> MutexGuard<'_, VecDeque<PerformanceSample>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a sample for a call on `channel`.
    pub fn start(&self, channel: &str, payload: &[Value]) -> SampleId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload_size = serde_json::to_vec(payload).map(|b| b.len()).unwrap_or(0);
        let sample = PerformanceSample {
            id,
            channel: channel.to_string(),
            start_time: now_millis(),
            end_time: None,
            duration_ms: None,
            success: false,
            error: None,
            payload_size,
        };
        self.in_flight.insert(
            id,
            InFlight {
                sample,
                started: Instant::now(),
            },
        );
        id
    }

    /// Close a sample and fold it into its channel's stats.
    pub fn end(
        &self,
        id: SampleId,
        success: bool,
        error: Option<String>,
    ) -> Result<PerformanceSample, RecorderError> {
        let (_, InFlight { mut sample, started }) = self
            .in_flight
            .remove(&id)
            .ok_or(RecorderError::UnknownSample(id))?;

        let elapsed = started.elapsed();
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        let end_time = now_millis();

        sample.end_time = Some(end_time);
        sample.duration_ms = Some(duration_ms);
        sample.success = success;
        sample.error = error;

        self.stats
            .entry(sample.channel.clone())
            .or_default()
            .record(duration_ms, success, end_time);

        metrics::record_call_duration(&sample.channel, success, elapsed);

        {
            let mut history = self.history();
            if history.len() >= self.history_capacity {
                history.pop_front();
            }
            if self.history_capacity > 0 {
                history.push_back(sample.clone());
            }
        }

        Ok(sample)
    }

    pub fn channel_stats(&self, channel: &str) -> Option<ChannelStats> {
        self.stats.get(channel).map(|s| s.clone())
    }

    pub fn all_stats(&self) -> HashMap<String, ChannelStats> {
        self.stats
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    /// The newest `limit` completed samples, oldest first.
    pub fn recent_samples(&self, limit: usize) -> Vec<PerformanceSample> {
        let history = self.history();
        let skip = history.len().saturating_sub(limit);
        history.iter().skip(skip).cloned().collect()
    }

    /// Samples started but not yet ended.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Drop stats and history. In-flight samples are kept so their `end`
    /// calls still succeed.
    pub fn clear(&self) {
        self.stats.clear();
        self.history().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(history_capacity: usize) -> PerformanceRecorder {
        PerformanceRecorder::new(&PerformanceConfig { history_capacity })
    }

    #[test]
    fn test_start_end_updates_stats() {
        let rec = recorder(10);
        let id = rec.start("config:get", &[json!("theme")]);
        assert_eq!(rec.in_flight(), 1);

        let sample = rec.end(id, true, None).unwrap();
        assert_eq!(rec.in_flight(), 0);
        assert!(sample.success);
        assert!(sample.duration_ms.unwrap() >= 0.0);
        assert_eq!(sample.payload_size, r#"["theme"]"#.len());

        let id = rec.start("config:get", &[]);
        rec.end(id, false, Some("disk full".into())).unwrap();

        let stats = rec.channel_stats("config:get").unwrap();
        assert_eq!(stats.total_calls, 2);
        assert_eq!(stats.successful_calls, 1);
        assert_eq!(stats.failed_calls, 1);
        assert!(stats.min_duration_ms <= stats.max_duration_ms);
        assert!(rec.channel_stats("other").is_none());
    }

    #[test]
    fn test_unknown_sample() {
        let rec = recorder(10);
        assert_eq!(rec.end(42, true, None), Err(RecorderError::UnknownSample(42)));

        let id = rec.start("a", &[]);
        rec.end(id, true, None).unwrap();
        assert_eq!(rec.end(id, true, None), Err(RecorderError::UnknownSample(id)));
    }

    #[test]
    fn test_history_drops_oldest() {
        let rec = recorder(3);
        for i in 0..5 {
            let id = rec.start(&format!("ch:{i}"), &[]);
            rec.end(id, true, None).unwrap();
        }
        let channels: Vec<_> = rec.recent_samples(10).into_iter().map(|s| s.channel).collect();
        assert_eq!(channels, vec!["ch:2", "ch:3", "ch:4"]);
        assert_eq!(rec.recent_samples(1)[0].channel, "ch:4");
        assert_eq!(rec.all_stats().len(), 5);
    }

    #[test]
    fn test_clear_keeps_in_flight() {
        let rec = recorder(3);
        let done = rec.start("a", &[]);
        rec.end(done, true, None).unwrap();
        let pending = rec.start("a", &[]);

        rec.clear();
        assert!(rec.all_stats().is_empty());
        assert!(rec.recent_samples(10).is_empty());

        rec.end(pending, true, None).unwrap();
        assert_eq!(rec.channel_stats("a").unwrap().total_calls, 1);
    }
}
