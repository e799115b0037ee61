//! Per-channel argument policy.
//!
//! # Data Flow
//! ```text
//! (channel, arguments)
//!     → registry.rs (look up contract, default Unconstrained)
//!     → object safety check on every composite argument
//!     → contract.rs (count and shape checks)
//!     → outcome.rs (ValidationOutcome)
//! ```
//!
//! # Design Decisions
//! - Closed enum of contracts: adding a shape is a compile-checked change
//! - Table is built once and never mutated afterwards
//! - Reasons are specific and short; they are meant for logs, not end users

pub mod contract;
pub mod outcome;
pub mod registry;

pub use contract::ChannelContract;
pub use outcome::ValidationOutcome;
pub use registry::ChannelPolicyRegistry;
