//! # Campus Identity
//!
//! Identity service for the campus platform: accounts, credentials,
//! password reset tokens and role-based permissions, served over HTTP with
//! Axum.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── campus-core/     # AuthError, AppError, hashing, password policy, clock
//! ├── campus-config/   # env-driven configuration
//! ├── campus-models/   # typed ids, value types, records and DTOs
//! ├── campus-auth/     # JWT claims, signing and verification
//! └── campus-db/       # store traits, PostgreSQL and in-memory stores
//! src/
//! ├── middleware/      # bearer-token and permission extractors
//! └── modules/
//!     ├── auth/        # gate, reset tokens, sign-in and reset endpoints
//!     ├── users/       # account administration
//!     ├── roles/       # roles and permissions
//!     └── health/
//! ```
//!
//! Each feature module keeps the `controller.rs` / `service.rs` /
//! `router.rs` split.
//!
//! ## Password reset
//!
//! 1. `POST /api/auth/forgot-password` issues a single-use token that expires
//!    after `RESET_TOKEN_TTL_SECONDS` (24 hours by default). The response is the
//!    same whether or not the email is registered.
//! 2. `POST /api/auth/reset-password/validate` reports whether a token can
//!    still be redeemed.
//! 3. `POST /api/auth/reset-password` redeems it. Marking the token used and
//!    replacing the password hash commit together or not at all.
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod config;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use campus_auth;
pub use campus_config;
pub use campus_core;
pub use campus_db;
pub use campus_models;
