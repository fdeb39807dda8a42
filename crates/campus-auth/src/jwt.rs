//! JWT access token creation and verification.
//!
//! Tokens are HS256-signed with the secret from [`JwtConfig`] and carry the
//! identity resolved by the authentication gate.
//!
//! # Example
//!
//! ```ignore
//! use campus_auth::{create_access_token, verify_token};
//! use campus_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(&identity, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use campus_config::JwtConfig;
use campus_core::AppError;
use campus_models::AuthenticatedIdentity;

use crate::claims::Claims;

/// Creates an access token embedding the identity's roles and permissions.
///
/// # Errors
///
/// Returns an internal error if the expiry overflows or token encoding fails.
pub fn create_access_token(
    identity: &AuthenticatedIdentity,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let issued_at = Utc::now().timestamp();
    let expires_at = issued_at
        .checked_add(jwt_config.access_token_expiry.max(0))
        .ok_or_else(|| AppError::internal_error("Access token expiry out of range"))?;
    let now = usize::try_from(issued_at)
        .map_err(|_| AppError::internal_error("System clock before Unix epoch"))?;
    let exp = usize::try_from(expires_at)
        .map_err(|_| AppError::internal_error("Access token expiry out of range"))?;

    let claims = Claims {
        sub: identity.user_id.to_string(),
        username: identity.username.to_string(),
        email: identity.email.to_string(),
        role_ids: identity.roles.iter().map(|r| r.id.into_inner()).collect(),
        permissions: identity.permissions.iter().cloned().collect(),
        is_super_admin: identity.is_super_admin,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired or is malformed.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}
