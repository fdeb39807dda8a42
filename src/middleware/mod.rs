//! Extractors for authentication and permission checks.
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the JWT and exposes its claims
//! 3. `Require*` extractors reject callers missing a permission with 403
//!
//! ```ignore
//! use crate::middleware::auth::RequireUsersDelete;
//!
//! async fn delete_user(RequireUsersDelete(caller): RequireUsersDelete) { /* ... */ }
//! ```

pub mod auth;
