//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Logging/metrics → Gateway::new → Admin listener
//!
//! Shutdown (shutdown.rs):
//!     Gateway::shutdown → broadcast → Admin server drains → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Gateway::shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: observability first, then the gateway, then listeners
//! - One shutdown source of truth: the gateway's coordinator

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
