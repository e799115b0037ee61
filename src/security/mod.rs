//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming call:
//!     → channel.rs (check identifier charset)
//!     → rate_limit.rs (check per-channel limits)
//!     → threat.rs (scan for malicious, dangerous, escalation patterns)
//!     → object_safety.rs (refuse prototype-polluting keys)
//!     → policy (channel contract)
//!     → sanitizer.rs (strip residual markup)
//!     → Pass to privileged handler
//! ```
//!
//! # Design Decisions
//! - Defense in depth: multiple layers of protection
//! - Fail closed: reject on any security check failure
//! - No trust in caller input

pub mod channel;
pub mod object_safety;
pub mod rate_limit;
pub mod sanitizer;
pub mod threat;
pub mod violation;

pub use rate_limit::RateLimiter;
pub use sanitizer::ArgumentSanitizer;
pub use threat::{BuildMode, ThreatReport, ThreatScanner};
pub use violation::SecurityViolation;
