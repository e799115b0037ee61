//! Audit subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway decision (allowed / blocked / error)
//!     → entry.rs (AuditEntry built from the call's SecurityContext)
//!     → log.rs (append under lock)
//!     → ring.rs (overwrite oldest once full)
//!
//! Introspection:
//!     → entries() / recent(n) for raw records
//!     → stats() computed on demand from current contents
//! ```
//!
//! # Design Decisions
//! - Bounded memory: capacity fixed at construction, oldest-first eviction
//! - No incremental counters, the buffer is the only source of truth
//! - Entries are immutable and hold no call arguments

pub mod entry;
pub mod log;
pub mod ring;

pub use entry::{AuditDecision, AuditEntry};
pub use log::{AuditLog, BlockedChannel, SecurityStats};
pub use ring::RingBuffer;
