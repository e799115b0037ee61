//! Channel identifier validation.

/// Longest channel identifier accepted.
pub const MAX_CHANNEL_LEN: usize = 128;

/// Returns true if `raw` is a well-formed channel identifier.
pub fn is_valid_channel(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_CHANNEL_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-'))
}

/// Clip an arbitrary (possibly malformed) channel string for storage in
/// audit entries.
pub fn clip_for_audit(raw: &str) -> String {
    raw.chars().take(MAX_CHANNEL_LEN).collect()
}
