//! Pattern-based threat detection.
//!
//! # Responsibilities
//! - Flag code-execution primitives and markup injection (malicious)
//! - Flag traversal, control characters and escape smuggling (dangerous)
//! - Flag shell metacharacters on credential-store channels (escalation)
//! - Refuse developer-tooling channels in production builds
//!
//! # Design Decisions
//! - Pattern sets are compiled once at construction and shared read-only
//! - Each argument is flattened to text independently: strings as-is, every
//!   other value as JSON
//! - Markup is judged on what the sanitizer would leave behind; markup the
//!   sanitizer removes is not a threat
//! - Detection never repairs a call, it only reports

use regex::RegexSet;
use serde::Serialize;
use serde_json::Value;

use crate::security::sanitizer::ArgumentSanitizer;
use crate::security::violation::SecurityViolation;

/// Environment variable carrying the build mode.
pub const BUILD_MODE_ENV: &str = "GATEWAY_ENV";

/// Channels with credential-store access; the only ones escalation-scanned.
pub const PRIVILEGED_CHANNELS: &[&str] = &["keychain:get", "keychain:set", "keychain:delete"];

/// Channels that must never be reachable in a production build.
pub const DEV_ONLY_CHANNELS: &[&str] = &["dev:openDevTools", "dev:reload", "dev:inspectElement"];

const MALICIOUS_CODE: &[&str] = &[
    r"(?i)\beval\s*\(",
    r"\bFunction\s*\(",
    r"(?i)\bsetTimeout\s*\(",
    r"(?i)\bsetInterval\s*\(",
    r"(?i)\brequire\s*\(",
    r"(?i)\bimport\s*\(",
    r"(?i)\bprocess\.[a-z_$]",
    r"(?i)\bglobal\.[a-z_$]",
    r"(?i)\bwindow\.[a-z_$]",
    r"(?i)\bdocument\.[a-z_$]",
    r"(?i)data:text/html",
    r"(?i)vbscript:",
];

const MALICIOUS_MARKUP: &[&str] = &[r"(?i)<script", r"(?i)javascript\s*:", r"(?i)\bon\w+\s*="];

const DANGEROUS: &[&str] = &[
    r"\.\./",
    r"\.\.\\",
    r"(?i)%2e%2e(?:%2f|%5c|/|\\)",
    r"\x00",
    r"[\x01-\x08\x0B\x0C\x0E-\x1F\x7F]",
    r"(?i)\\u[0-9a-f]{4}",
    r"(?i)\\u\{[0-9a-f]+\}",
    r"(?i)\\x[0-9a-f]{2}",
];

const ESCALATION: &[&str] = &[r"\*", r"\$\{", r"`", r"\|", r"&&", r";"];

/// Production vs development build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    Production,
    #[default]
    Development,
}

impl BuildMode {
    /// Read the build mode from [`BUILD_MODE_ENV`].
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(BUILD_MODE_ENV).ok().as_deref())
    }

    /// `production` (any case) selects production; anything else, or an
    /// unset variable, is development.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Result of scanning one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreatReport {
    pub dangerous: bool,
    pub escalation: bool,
    pub malicious: bool,
}

impl ThreatReport {
    pub fn is_clean(&self) -> bool {
        !(self.dangerous || self.escalation || self.malicious)
    }

    /// The most severe category found, if any.
    pub fn violation(&self) -> Option<SecurityViolation> {
        if self.dangerous {
            Some(SecurityViolation::DangerousOperation)
        } else if self.escalation {
            Some(SecurityViolation::PrivilegeEscalation)
        } else if self.malicious {
            Some(SecurityViolation::MaliciousPattern)
        } else {
            None
        }
    }
}

/// Pattern-based detector for malicious and dangerous argument content.
#[derive(Debug, Clone)]
pub struct ThreatScanner {
    malicious_code: RegexSet,
    malicious_markup: RegexSet,
    dangerous: RegexSet,
    escalation: RegexSet,
    sanitizer: ArgumentSanitizer,
    build_mode: BuildMode,
}

impl ThreatScanner {
    /// Compile every pattern family.
    pub fn new(build_mode: BuildMode, sanitizer: ArgumentSanitizer) -> Result<Self, regex::Error> {
        Ok(Self {
            malicious_code: RegexSet::new(MALICIOUS_CODE)?,
            malicious_markup: RegexSet::new(MALICIOUS_MARKUP)?,
            dangerous: RegexSet::new(DANGEROUS)?,
            escalation: RegexSet::new(ESCALATION)?,
            sanitizer,
            build_mode,
        })
    }

    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    /// Scan one call's arguments.
    pub fn scan(&self, channel: &str, args: &[Value]) -> ThreatReport {
        let flattened: Vec<String> = args.iter().map(flatten).collect();

        let dev_blocked =
            self.build_mode.is_production() && DEV_ONLY_CHANNELS.contains(&channel);

        let dangerous = dev_blocked || flattened.iter().any(|text| self.dangerous.is_match(text));

        let escalation = PRIVILEGED_CHANNELS.contains(&channel)
            && flattened.iter().any(|text| self.escalation.is_match(text));

        let malicious = flattened.iter().any(|text| self.malicious_code.is_match(text))
            || args.iter().any(|arg| {
                let residue = flatten(&self.sanitizer.sanitize(arg));
                self.malicious_markup.is_match(&residue)
            });

        ThreatReport {
            dangerous,
            escalation,
            malicious,
        }
    }
}

/// Flatten an argument to the text the pattern sets are matched against.
pub fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| other.to_string()),
    }
}
