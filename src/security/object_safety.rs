//! Structural safety checks for composite arguments.
//!
//! Runs before shape validation and before sanitization, so a structurally
//! unsafe payload is refused instead of being quietly rewritten.

use serde_json::Value;

/// Keys that may never appear anywhere inside a composite argument.
pub const UNSAFE_KEYS: &[&str] = &[
    "__proto__",
    "constructor",
    "prototype",
    "require",
    "process",
    "global",
    "window",
    "document",
    "eval",
    "Function",
];

/// Find the first unsafe key in `value`, searching nested objects and
/// arrays.
pub fn find_unsafe_key(value: &Value) -> Option<&str> {
    let mut stack = vec![value];
    while let Some(current) = stack.pop() {
        match current {
            Value::Object(map) => {
                for (key, item) in map {
                    if UNSAFE_KEYS.contains(&key.as_str()) {
                        return Some(key.as_str());
                    }
                    stack.push(item);
                }
            }
            Value::Array(items) => stack.extend(items.iter()),
            _ => {}
        }
    }
    None
}

/// Nesting depth of a value: scalars are 0, `[]` and `{}` are 1.
///
/// Iterative so hostile nesting cannot exhaust the stack.
pub fn nesting_depth(value: &Value) -> usize {
    let mut max = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((current, depth)) = stack.pop() {
        match current {
            Value::Object(map) => {
                max = max.max(depth + 1);
                stack.extend(map.values().map(|v| (v, depth + 1)));
            }
            Value::Array(items) => {
                max = max.max(depth + 1);
                stack.extend(items.iter().map(|v| (v, depth + 1)));
            }
            _ => {}
        }
    }
    max
}
