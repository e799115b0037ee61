//! Argument sanitization.
//!
//! # Responsibilities
//! - Strip script-bearing markup from strings
//! - Rebuild objects with sanitized keys without dropping colliding entries
//!
//! # Design Decisions
//! - Last-mile defense: runs only after scanning and validation passed
//! - String rules repeat until nothing changes, so sanitizing twice is a no-op
//! - Non-string scalars pass through untouched

use regex::Regex;
use serde_json::{Map, Value};

/// Tags removed together with everything between open and close.
const BLOCK_TAGS: [&str; 4] = ["script", "iframe", "object", "embed"];

/// Removal rules applied in order on every pass.
fn rule_patterns() -> Vec<String> {
    let mut patterns: Vec<String> = BLOCK_TAGS
        .iter()
        .map(|tag| format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
        .collect();
    patterns.extend(
        [
            // Dangling open or close tags, including ones cut off before `>`.
            r"(?i)</?(?:script|iframe|object|embed)\b[^>]*>?",
            r"(?i)</?(?:style|meta|link)\b[^>]*>?",
            r"(?i)javascript\s*:",
            r#"(?i)\bon\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#,
        ]
        .into_iter()
        .map(String::from),
    );
    patterns
}

/// Recursively neutralizes unsafe string and object content.
#[derive(Debug, Clone)]
pub struct ArgumentSanitizer {
    rules: Vec<Regex>,
}

impl ArgumentSanitizer {
    /// Compile the sanitization rules.
    pub fn new() -> Result<Self, regex::Error> {
        let rules = rule_patterns()
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Sanitize every argument of a call.
    pub fn sanitize_all(&self, args: &[Value]) -> Vec<Value> {
        args.iter().map(|arg| self.sanitize(arg)).collect()
    }

    /// Sanitize one value recursively.
    pub fn sanitize(&self, value: &Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.sanitize_str(s)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.sanitize(v)).collect()),
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, item) in map {
                    let key = unique_key(&out, self.sanitize_str(key));
                    out.insert(key, self.sanitize(item));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }

    /// Sanitize a single string.
    pub fn sanitize_str(&self, input: &str) -> String {
        let mut current = input.to_string();
        loop {
            let mut next = current.clone();
            for rule in &self.rules {
                if rule.is_match(&next) {
                    next = rule.replace_all(&next, "").into_owned();
                }
            }
            let next = next.trim();
            // Rules only ever delete, so an unchanged length means a fixpoint.
            if next.len() == current.len() {
                return current;
            }
            current = next.to_string();
        }
    }
}

/// Pick a key that is not yet present in `out`, suffixing `_1`, `_2`, ...
fn unique_key(out: &Map<String, Value>, key: String) -> String {
    if !out.contains_key(&key) {
        return key;
    }
    let mut n = 1usize;
    loop {
        let candidate = format!("{key}_{n}");
        if !out.contains_key(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sanitizer() -> ArgumentSanitizer {
        ArgumentSanitizer::new().unwrap()
    }

    #[test]
    fn test_strips_complete_script_block() {
        let s = sanitizer();
        assert_eq!(s.sanitize_str("<script>alert(1)</script>"), "");
        assert_eq!(
            s.sanitize_str("before<SCRIPT type=\"x\">\nbad()\n</script >after"),
            "beforeafter"
        );
        assert_eq!(s.sanitize_str("<iframe src=x></iframe>ok"), "ok");
    }

    #[test]
    fn test_strips_dangling_tags() {
        let s = sanitizer();
        assert_eq!(s.sanitize_str("<script>alert(1)"), "alert(1)");
        assert_eq!(s.sanitize_str("hello <embed src=x"), "hello");
        assert_eq!(s.sanitize_str("<style>body{}</style>"), "body{}");
        assert_eq!(s.sanitize_str("<meta http-equiv=refresh>x"), "x");
    }

    #[test]
    fn test_strips_scheme_and_handlers() {
        let s = sanitizer();
        assert_eq!(
            s.sanitize_str("<a href=\"javascript:go()\">x</a>"),
            "<a href=\"go()\">x</a>"
        );
        let out = s.sanitize_str("<img src=x onerror=alert(1)>");
        assert!(!out.contains("onerror"));
        assert!(out.starts_with("<img src=x"));
        let out = s.sanitize_str("<div onclick=\"steal()\">hi</div>");
        assert_eq!(out, "<div >hi</div>");
    }

    #[test]
    fn test_nested_tag_cannot_reassemble() {
        let s = sanitizer();
        let once = s.sanitize_str("<scr<script>x</script>ipt>alert(1)</script>");
        assert!(!once.to_lowercase().contains("<script"));
        assert_eq!(s.sanitize_str(&once), once);
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(sanitizer().sanitize_str("  padded \n"), "padded");
    }

    #[test]
    fn test_safe_object_unchanged() {
        let s = sanitizer();
        let value = json!({
            "name": "Research agent",
            "temperature": 0.7,
            "tags": ["a", "b"],
            "nested": {"enabled": true, "limit": null}
        });
        assert_eq!(s.sanitize(&value), value);
    }

    #[test]
    fn test_key_collision_appends_suffix() {
        let s = sanitizer();
        let value = json!({
            "title": 1,
            "title<style>": 2,
            "<link>title": 3
        });
        let out = s.sanitize(&value);
        let map = out.as_object().unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.contains_key("title"));
        assert!(map.contains_key("title_1"));
        assert!(map.contains_key("title_2"));
        let mut values: Vec<_> = map.values().filter_map(Value::as_i64).collect();
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_non_strings_pass_through() {
        let s = sanitizer();
        assert_eq!(s.sanitize(&json!(42)), json!(42));
        assert_eq!(s.sanitize(&json!(false)), json!(false));
        assert_eq!(s.sanitize(&Value::Null), Value::Null);
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(input in ".{0,64}") {
            let s = sanitizer();
            let once = s.sanitize_str(&input);
            prop_assert_eq!(s.sanitize_str(&once), once);
        }

        #[test]
        fn sanitize_is_idempotent_on_markup(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("<script>".to_string()),
                    Just("</script>".to_string()),
                    Just("<scr".to_string()),
                    Just("ipt>".to_string()),
                    Just("javascript:".to_string()),
                    Just(" onload=".to_string()),
                    Just("<style".to_string()),
                    "[a-z ]{0,6}",
                ],
                0..12,
            )
        ) {
            let s = sanitizer();
            let input = parts.concat();
            let once = s.sanitize_str(&input);
            prop_assert_eq!(s.sanitize_str(&once), once);
        }
    }
}
