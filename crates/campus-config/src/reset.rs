//! Password reset token policy.
//!
//! # Environment Variables
//!
//! - `RESET_TOKEN_TTL_SECONDS`: token lifetime (default: 86400, i.e. 24 hours).
//!   Values outside `1..=31536000` (one year) fall back to the default.
//! - `RESET_TOKEN_ISSUE_ATTEMPTS`: how many fresh token strings to try when the
//!   store reports a collision (default: 3)
//! - `RESET_TOKEN_PRIOR_POLICY`: `keep` or `revoke` (default: `keep`)

use chrono::Duration;
use std::env;
use std::str::FromStr;

/// What happens to a user's outstanding tokens when a new one is issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriorTokenPolicy {
    /// Earlier tokens stay valid until they expire or are used.
    #[default]
    Keep,
    /// Earlier unused tokens expire at the moment the new one is issued.
    Revoke,
}

impl FromStr for PriorTokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "revoke" => Ok(Self::Revoke),
            other => Err(format!("unknown prior token policy '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordResetConfig {
    pub token_ttl: Duration,
    pub issue_attempts: u32,
    pub prior_tokens: PriorTokenPolicy,
}

impl PasswordResetConfig {
    pub const DEFAULT_TTL_SECONDS: i64 = 24 * 60 * 60;
    pub const MAX_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;
    pub const DEFAULT_ISSUE_ATTEMPTS: u32 = 3;

    #[must_use]
    pub fn from_env() -> Self {
        Self {
            token_ttl: env::var("RESET_TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|v| parse_ttl(&v))
                .unwrap_or_else(|| Duration::seconds(Self::DEFAULT_TTL_SECONDS)),
            issue_attempts: env::var("RESET_TOKEN_ISSUE_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(Self::DEFAULT_ISSUE_ATTEMPTS),
            prior_tokens: env::var("RESET_TOKEN_PRIOR_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn parse_ttl(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=PasswordResetConfig::MAX_TTL_SECONDS).contains(secs))
        .and_then(Duration::try_seconds)
}

impl Default for PasswordResetConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::seconds(Self::DEFAULT_TTL_SECONDS),
            issue_attempts: Self::DEFAULT_ISSUE_ATTEMPTS,
            prior_tokens: PriorTokenPolicy::Keep,
        }
    }
}
