//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to Gateway::new, which sizes every service from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a new gateway is built for new limits
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, AuditConfig, GatewayConfig, ObservabilityConfig, PerformanceConfig,
    RateLimitConfig, ThreatConfig,
};
