//! Performance subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted call:
//!     → recorder.start(channel, payload)   (monotonic start, payload size)
//!     → privileged handler runs
//!     → recorder.end(id, success, error)   (duration, outcome)
//!     → stats.rs (incremental mean, min, max per channel)
//!     → bounded history of completed samples
//! ```
//!
//! # Design Decisions
//! - Durations come from `Instant`, wall-clock times only label samples
//! - Samples keep the payload size, never the payload
//! - History drops oldest first once full

pub mod recorder;
pub mod stats;

pub use recorder::{PerformanceRecorder, PerformanceSample, RecorderError, SampleId};
pub use stats::ChannelStats;
