//! # Campus Auth
//!
//! Access token claims and JWT utilities for the Campus identity service.
//!
//! - [`claims`]: the [`Claims`] carried by access tokens
//! - [`jwt`]: token creation from an authenticated identity, and verification

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
