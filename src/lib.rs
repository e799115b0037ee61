//! Secure IPC gateway library.
//!
//! Every call from an untrusted caller to a privileged operation passes
//! through [`Gateway::invoke`], which admits or rejects it and audits the
//! decision.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller ──invoke(channel, args, origin)──▶ ┌──────────────────────────────┐
//!                                             │           gateway            │
//!                                             │  channel check               │
//!                                             │  security::RateLimiter       │
//!                                             │  security::ThreatScanner     │
//!                                             │  policy::ChannelPolicyRegistry│
//!                                             │  security::ArgumentSanitizer │
//!                                             └──────┬───────────────┬───────┘
//!                                                    │               │
//!                                      audit::AuditLog        PrivilegedHandler
//!                                                                    │
//!                                                 performance::PerformanceRecorder
//!
//!   Cross-cutting: config, observability, lifecycle, admin (read/clear HTTP)
//! ```

// Core pipeline
pub mod gateway;
pub mod policy;
pub mod security;

// Records
pub mod audit;
pub mod performance;

// Cross-cutting concerns
pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::GatewayConfig;
pub use gateway::{CallOrigin, Gateway, GatewayError, HandlerError, HandlerRegistry, PrivilegedHandler};
pub use lifecycle::Shutdown;
pub use security::BuildMode;
