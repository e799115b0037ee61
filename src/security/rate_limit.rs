//! Per-channel call frequency limiting.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::config::RateLimitConfig;

/// Call count for one channel within the current window.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    reset_at: Instant,
}

impl RateWindow {
    fn start(now: Instant, length: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + length,
        }
    }
}

/// Sliding-window call-frequency guard, keyed per channel.
///
/// Windows are created lazily on a channel's first call and restarted once
/// the current time passes the window deadline.
pub struct RateLimiter {
    windows: DashMap<String, RateWindow>,
    enabled: bool,
    max_calls: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            enabled: config.enabled,
            max_calls: config.max_calls,
            window: Duration::from_secs(config.window_secs),
        }
    }

    /// Check and count one call on `channel`.
    pub fn is_allowed(&self, channel: &str) -> bool {
        self.is_allowed_at(channel, Instant::now())
    }

    /// Same as [`is_allowed`](Self::is_allowed) with an explicit clock.
    pub fn is_allowed_at(&self, channel: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        // The entry guard holds the shard lock, so check-and-increment is
        // atomic per channel.
        match self.windows.entry(channel.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateWindow::start(now, self.window));
                true
            }
            Entry::Occupied(mut slot) => {
                let window = slot.get_mut();
                if now > window.reset_at {
                    *window = RateWindow::start(now, self.window);
                    return true;
                }
                window.count = window.count.saturating_add(1);
                window.count <= self.max_calls
            }
        }
    }

    /// Calls counted so far in the channel's current window.
    pub fn current_count(&self, channel: &str) -> u32 {
        self.windows.get(channel).map(|w| w.count).unwrap_or(0)
    }

    /// Number of channels with a tracked window.
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    /// Drop every window.
    pub fn reset(&self) {
        self.windows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_calls: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_calls,
            window_secs,
        })
    }

    #[test]
    fn test_ceiling_boundary() {
        let limiter = limiter(100, 60);
        let now = Instant::now();
        for i in 1..=100 {
            assert!(limiter.is_allowed_at("config:get", now), "call {i} rejected");
        }
        assert!(!limiter.is_allowed_at("config:get", now));
        assert!(!limiter.is_allowed_at("config:get", now));
    }

    #[test]
    fn test_window_reset_restores_admission() {
        let limiter = limiter(2, 60);
        let start = Instant::now();
        assert!(limiter.is_allowed_at("a", start));
        assert!(limiter.is_allowed_at("a", start));
        assert!(!limiter.is_allowed_at("a", start));

        // Exactly at the deadline the window is still live.
        assert!(!limiter.is_allowed_at("a", start + Duration::from_secs(60)));

        let later = start + Duration::from_secs(61);
        assert!(limiter.is_allowed_at("a", later));
        assert_eq!(limiter.current_count("a"), 1);
    }

    #[test]
    fn test_channels_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();
        assert!(limiter.is_allowed_at("a", now));
        assert!(!limiter.is_allowed_at("a", now));
        assert!(limiter.is_allowed_at("b", now));
        assert_eq!(limiter.window_count(), 2);
    }

    #[test]
    fn test_reset_clears_windows() {
        let limiter = limiter(1, 60);
        assert!(limiter.is_allowed("a"));
        assert!(!limiter.is_allowed("a"));
        limiter.reset();
        assert_eq!(limiter.window_count(), 0);
        assert!(limiter.is_allowed("a"));
    }

    #[test]
    fn test_disabled_admits_everything() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: false,
            max_calls: 1,
            window_secs: 60,
        });
        for _ in 0..10 {
            assert!(limiter.is_allowed("a"));
        }
        assert_eq!(limiter.window_count(), 0);
    }

    #[test]
    fn test_concurrent_counting() {
        let limiter = std::sync::Arc::new(limiter(1000, 60));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..100).filter(|_| limiter.is_allowed("shared")).count()
                })
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 800);
        assert_eq!(limiter.current_count("shared"), 800);
    }
}
