//! Channel → contract table.

use std::collections::HashMap;

use serde_json::Value;

use crate::policy::contract::ChannelContract;
use crate::policy::outcome::ValidationOutcome;
use crate::security::object_safety::find_unsafe_key;

const THEMES: &[&str] = &["light", "dark", "system"];
const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Channels shipped with a specific contract.
const DEFAULT_CONTRACTS: &[(&str, ChannelContract)] = &[
    ("db:agents:get", ChannelContract::Uuid),
    ("db:agents:delete", ChannelContract::Uuid),
    ("db:agents:toggle", ChannelContract::UuidWithFlag { field: "enabled" }),
    ("db:agents:list", ChannelContract::OptionalOptions),
    ("db:conversations:get", ChannelContract::Uuid),
    ("db:conversations:delete", ChannelContract::Uuid),
    ("db:conversations:archive", ChannelContract::UuidWithFlag { field: "archived" }),
    ("db:conversations:list", ChannelContract::OptionalOptions),
    ("config:get", ChannelContract::NonEmptyKey),
    ("config:delete", ChannelContract::NonEmptyKey),
    ("config:set", ChannelContract::KeyValue),
    ("keychain:get", ChannelContract::NonEmptyKey),
    ("keychain:delete", ChannelContract::NonEmptyKey),
    ("keychain:set", ChannelContract::KeyValue),
    ("window:setTheme", ChannelContract::OneOf { allowed: THEMES }),
    ("app:setLogLevel", ChannelContract::OneOf { allowed: LOG_LEVELS }),
];

/// Immutable mapping from channel to argument contract.
///
/// Built once, then shared read-only; channels without an entry fall back to
/// [`ChannelContract::Unconstrained`].
#[derive(Debug, Clone)]
pub struct ChannelPolicyRegistry {
    table: HashMap<String, ChannelContract>,
}

impl ChannelPolicyRegistry {
    /// Registry with the default channel table.
    pub fn new() -> Self {
        Self {
            table: DEFAULT_CONTRACTS
                .iter()
                .map(|(channel, contract)| (channel.to_string(), *contract))
                .collect(),
        }
    }

    /// Registry with no channel-specific contracts.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Bind (or rebind) a channel's contract while building the registry.
    pub fn with_contract(mut self, channel: impl Into<String>, contract: ChannelContract) -> Self {
        self.table.insert(channel.into(), contract);
        self
    }

    pub fn contract_for(&self, channel: &str) -> ChannelContract {
        self.table
            .get(channel)
            .copied()
            .unwrap_or(ChannelContract::Unconstrained)
    }

    /// Channels with a specific contract, sorted.
    pub fn channels(&self) -> Vec<&str> {
        let mut channels: Vec<&str> = self.table.keys().map(String::as_str).collect();
        channels.sort_unstable();
        channels
    }

    /// Object-safety check followed by the channel's shape contract.
    pub fn validate(&self, channel: &str, args: &[Value]) -> ValidationOutcome {
        if let Some(key) = args.iter().find_map(find_unsafe_key) {
            return ValidationOutcome::deny(format!("Unsafe object key '{key}'"));
        }

        let contract = self.contract_for(channel);
        match contract.check(args) {
            Ok(()) => ValidationOutcome::allow(),
            Err(reason) => {
                tracing::debug!(
                    channel = %channel,
                    contract = contract.name(),
                    reason = %reason,
                    "Arguments failed channel contract"
                );
                ValidationOutcome::deny(reason)
            }
        }
    }
}

impl Default for ChannelPolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_table() {
        let registry = ChannelPolicyRegistry::new();
        assert_eq!(registry.contract_for("db:agents:get"), ChannelContract::Uuid);
        assert_eq!(registry.contract_for("config:set"), ChannelContract::KeyValue);
        assert_eq!(
            registry.contract_for("window:minimize"),
            ChannelContract::Unconstrained
        );
        assert!(registry.channels().contains(&"keychain:set"));
    }

    #[test]
    fn test_unsafe_keys_rejected_before_contract() {
        let registry = ChannelPolicyRegistry::new();
        for key in ["__proto__", "constructor", "prototype"] {
            let mut payload = serde_json::Map::new();
            payload.insert(key.to_string(), json!({"isAdmin": true}));
            let outcome = registry.validate("config:set", &[json!("theme"), payload.into()]);
            assert!(!outcome.allowed);
            assert_eq!(outcome.reason.as_deref(), Some(format!("Unsafe object key '{key}'").as_str()));
        }

        // Unconstrained channels still get the structural check.
        let outcome = registry.validate("window:minimize", &[json!({"a": {"eval": 1}})]);
        assert!(!outcome.allowed);
    }

    #[test]
    fn test_contract_reasons_pass_through() {
        let registry = ChannelPolicyRegistry::new();
        let outcome = registry.validate("db:agents:get", &[json!("not-a-uuid")]);
        assert!(!outcome.allowed);
        assert_eq!(outcome.reason.as_deref(), Some("Valid UUID required"));
        assert!(outcome.sanitized_arguments.is_none());
    }

    #[test]
    fn test_with_contract_overrides() {
        let registry = ChannelPolicyRegistry::empty()
            .with_contract("custom:op", ChannelContract::NonEmptyKey);
        assert!(registry.validate("custom:op", &[json!("k")]).allowed);
        assert!(!registry.validate("custom:op", &[]).allowed);
        assert!(registry.validate("db:agents:get", &[json!("x")]).allowed);
    }
}
