//! Process-level configuration assembled from the `campus-config` structs.
//!
//! # Environment Variables
//!
//! - `BIND_ADDR`: listen address (default: `0.0.0.0:3000`)
//! - `OBSERVABILITY_ENABLED`: install the Prometheus recorder and expose
//!   `/metrics` (default: `true`; `false` or `0` disables)
//! - `BOOTSTRAP_ADMIN_USERNAME`, `BOOTSTRAP_ADMIN_EMAIL`,
//!   `BOOTSTRAP_ADMIN_PASSWORD`: when all three are set, a super-admin with
//!   these credentials is created at startup if the username is free

use std::env;

use campus_config::{
    CorsConfig, DatabaseConfig, HashingConfig, JwtConfig, PasswordPolicyConfig,
    PasswordResetConfig,
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl BootstrapAdmin {
    pub fn from_env() -> Option<Self> {
        Some(Self {
            username: env::var("BOOTSTRAP_ADMIN_USERNAME").ok()?,
            email: env::var("BOOTSTRAP_ADMIN_EMAIL").ok()?,
            password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub observability_enabled: bool,
    pub jwt: JwtConfig,
    pub reset: PasswordResetConfig,
    pub hashing: HashingConfig,
    pub password_policy: PasswordPolicyConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            observability_enabled: false,
            jwt: JwtConfig::default(),
            reset: PasswordResetConfig::default(),
            hashing: HashingConfig::default(),
            password_policy: PasswordPolicyConfig::default(),
            cors: CorsConfig::default(),
            database: DatabaseConfig::default(),
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            observability_enabled: env::var("OBSERVABILITY_ENABLED")
                .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0"))
                .unwrap_or(true),
            jwt: JwtConfig::from_env(),
            reset: PasswordResetConfig::from_env(),
            hashing: HashingConfig::from_env(),
            password_policy: PasswordPolicyConfig::from_env(),
            cors: CorsConfig::from_env(),
            database: DatabaseConfig::from_env(),
            bootstrap_admin: BootstrapAdmin::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert!(!config.observability_enabled);
        assert!(config.bootstrap_admin.is_none());
    }

    #[test]
    fn test_bootstrap_admin_debug_hides_password() {
        let admin = BootstrapAdmin {
            username: "root".into(),
            email: "root@example.com".into(),
            password: "Sup3r@Secret".into(),
        };
        let rendered = format!("{:?}", admin);
        assert!(rendered.contains("root@example.com"));
        assert!(!rendered.contains("Sup3r@Secret"));
    }
}
