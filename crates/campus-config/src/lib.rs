//! # Campus Config
//!
//! Configuration types for the Campus identity service.
//!
//! Every structure is loaded from environment variables with `from_env()` and
//! falls back to documented defaults. Values are passed to services at
//! construction; nothing here is global.
//!
//! - [`jwt`]: access token signing
//! - [`reset`]: password reset token TTL, collision retries, prior-token policy
//! - [`hashing`]: bcrypt cost and password length policy
//! - [`cors`]: allowed origins
//! - [`database`]: store backend and pool limits
//!
//! # Example
//!
//! ```ignore
//! use campus_config::{JwtConfig, PasswordResetConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let reset_config = PasswordResetConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod hashing;
pub mod jwt;
pub mod reset;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::{DatabaseConfig, StoreBackend};
pub use hashing::{HashingConfig, PasswordPolicyConfig};
pub use jwt::JwtConfig;
pub use reset::{PasswordResetConfig, PriorTokenPolicy};
