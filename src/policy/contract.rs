//! Argument-shape contracts.
//!
//! Every channel is bound to exactly one [`ChannelContract`]. Each variant
//! checks argument count first, then argument types, and reports the first
//! problem as a short caller-facing reason.

use serde_json::Value;
use uuid::Uuid;

/// Shape contract for a channel's arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelContract {
    /// Exactly one argument, a hyphenated UUID.
    Uuid,
    /// A UUID plus an update object holding exactly `field`, a strict boolean.
    UuidWithFlag { field: &'static str },
    /// Exactly one argument, a non-empty string.
    NonEmptyKey,
    /// A non-empty string key plus any value.
    KeyValue,
    /// No arguments, or one plain object (`null` counts as absent).
    OptionalOptions,
    /// Exactly one string argument from a fixed set.
    OneOf { allowed: &'static [&'static str] },
    /// No constraint beyond the basic safety checks.
    Unconstrained,
}

impl ChannelContract {
    /// Check `args` against the contract.
    pub fn check(&self, args: &[Value]) -> Result<(), String> {
        match *self {
            ChannelContract::Uuid => {
                expect_count(args, 1)?;
                expect_uuid(&args[0])
            }
            ChannelContract::UuidWithFlag { field } => {
                expect_count(args, 2)?;
                expect_uuid(&args[0])?;
                expect_flag_update(&args[1], field)
            }
            ChannelContract::NonEmptyKey => {
                expect_count(args, 1)?;
                expect_key(&args[0])
            }
            ChannelContract::KeyValue => {
                expect_count(args, 2)?;
                expect_key(&args[0])
            }
            ChannelContract::OptionalOptions => match args {
                [] | [Value::Null] | [Value::Object(_)] => Ok(()),
                [_] => Err("Options must be a plain object".to_string()),
                _ => Err(format!("Expected at most 1 argument, got {}", args.len())),
            },
            ChannelContract::OneOf { allowed } => {
                expect_count(args, 1)?;
                let Some(value) = args[0].as_str() else {
                    return Err("Expected a string value".to_string());
                };
                if allowed.contains(&value) {
                    Ok(())
                } else {
                    Err(format!(
                        "Invalid value '{}', expected one of: {}",
                        value,
                        allowed.join(", ")
                    ))
                }
            }
            ChannelContract::Unconstrained => Ok(()),
        }
    }

    /// Short name used in logs and introspection.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelContract::Uuid => "uuid",
            ChannelContract::UuidWithFlag { .. } => "uuid_with_flag",
            ChannelContract::NonEmptyKey => "non_empty_key",
            ChannelContract::KeyValue => "key_value",
            ChannelContract::OptionalOptions => "optional_options",
            ChannelContract::OneOf { .. } => "one_of",
            ChannelContract::Unconstrained => "unconstrained",
        }
    }
}

fn expect_count(args: &[Value], expected: usize) -> Result<(), String> {
    if args.len() == expected {
        return Ok(());
    }
    let noun = if expected == 1 { "argument" } else { "arguments" };
    Err(format!("Expected exactly {expected} {noun}, got {}", args.len()))
}

/// Accepts the canonical 36-character hyphenated form only.
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::try_parse(value).is_ok()
}

fn expect_uuid(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(s) if is_uuid(s) => Ok(()),
        _ => Err("Valid UUID required".to_string()),
    }
}

fn expect_key(value: &Value) -> Result<(), String> {
    match value {
        Value::String(s) if s.trim().is_empty() => Err("Key must not be empty".to_string()),
        Value::String(_) => Ok(()),
        _ => Err("Key must be a string".to_string()),
    }
}

fn expect_flag_update(value: &Value, field: &str) -> Result<(), String> {
    let Value::Object(update) = value else {
        return Err("Update must be an object".to_string());
    };

    let extra: Vec<&str> = update
        .keys()
        .map(String::as_str)
        .filter(|k| *k != field)
        .collect();
    if !extra.is_empty() {
        return Err(format!("Unexpected fields in update: {}", extra.join(", ")));
    }

    match update.get(field) {
        None => Err(format!("{field} is required")),
        Some(Value::Bool(_)) => Ok(()),
        Some(other) => Err(format!("{field} must be a boolean, got {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
