//! Gateway dispatcher subsystem.
//!
//! # Data Flow
//! ```text
//! invoke(channel, args, origin)
//!     → context.rs (fresh SecurityContext)
//!     → dispatcher.rs
//!         channel check → rate limit → threat scan
//!         → object safety + contract → sanitize
//!     → AuditLog entry (allowed / blocked / error)
//!     → handler.rs (privileged operation, timed by PerformanceRecorder)
//! ```
//!
//! # Design Decisions
//! - Services are owned by one `Gateway` value; no process-wide singletons
//! - Policy rejections and internal failures are different types
//! - Callers only ever see short reason strings

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;

pub use context::{CallOrigin, SecurityContext};
pub use dispatcher::Gateway;
pub use error::{Decision, GatewayError, InitError, InternalFailure, Rejection};
pub use handler::{FnHandler, HandlerError, HandlerRegistry, PrivilegedHandler};
