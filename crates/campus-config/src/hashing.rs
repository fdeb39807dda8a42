//! Credential hashing and password policy settings.
//!
//! # Environment Variables
//!
//! - `BCRYPT_COST`: bcrypt work factor (default: 12)
//! - `PASSWORD_MIN_LENGTH`: minimum password length in characters (default: 8)
//! - `PASSWORD_MAX_LENGTH`: maximum password length in bytes (default: 72)

use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashingConfig {
    pub bcrypt_cost: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self { bcrypt_cost: 12 }
    }
}

impl HashingConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::default().bcrypt_cost),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 72,
        }
    }
}

impl PasswordPolicyConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let min_length = env::var("PASSWORD_MIN_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.min_length);
        let max_length = env::var("PASSWORD_MAX_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_length);

        Self {
            min_length,
            max_length: max_length.max(min_length),
        }
    }
}
