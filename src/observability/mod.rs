//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway pipeline produces:
//!     → logging.rs (structured log events per decision)
//!     → metrics.rs (decision counters, call latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON lines)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON optional) for machine parsing
//! - Log fields carry channel and session, never raw arguments
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
