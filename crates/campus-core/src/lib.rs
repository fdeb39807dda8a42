//! # Campus Core
//!
//! Core types, errors, and credential utilities for the Campus identity service.
//!
//! - [`errors`]: [`AuthError`] domain taxonomy and the HTTP-facing [`AppError`]
//! - [`password`]: bcrypt hashing with a configurable cost
//! - [`password_policy`]: pluggable password strength predicate
//! - [`clock`]: time source used for token expiry
//! - [`permissions`]: permission code constants
//!
//! # Example
//!
//! ```ignore
//! use campus_core::{PasswordHasher, PasswordPolicy, StrengthPolicy};
//!
//! StrengthPolicy::default().check("Strong@Pass2")?;
//! let hash = PasswordHasher::new(12).hash("Strong@Pass2")?;
//! ```

pub mod clock;
pub mod errors;
pub mod password;
pub mod password_policy;
pub mod permissions;

pub use clock::{Clock, SystemClock};
pub use errors::{AppError, AuthError};
pub use password::PasswordHasher;
pub use password_policy::{PasswordPolicy, PolicyViolation, StrengthPolicy};
