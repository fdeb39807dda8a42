//! Password reset token models and DTOs.

use campus_core::AuthError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ResetTokenId, UserId};

/// A stored password reset token.
///
/// A token is redeemable iff it is unused and `now < expires_at`. The check
/// is always made against a caller-supplied instant, never cached.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PasswordResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Used before expired: a consumed token reports `TokenAlreadyUsed` even
    /// after its expiry has passed.
    pub fn ensure_redeemable(&self, now: DateTime<Utc>) -> Result<(), AuthError> {
        if self.is_used {
            return Err(AuthError::TokenAlreadyUsed);
        }
        if now >= self.expires_at {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.ensure_redeemable(now).is_ok()
    }
}

/// Insert payload for a freshly generated token.
#[derive(Debug, Clone)]
pub struct NewResetToken {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// What the manager hands to the delivery collaborator after issuance.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedResetToken")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<PasswordResetToken> for IssuedResetToken {
    fn from(row: PasswordResetToken) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            expires_at: row.expires_at,
        }
    }
}

/// Forgot password request to initiate password reset.
///
/// The response is identical whether or not an account uses this email.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email)]
    #[schema(example = "user@example.com")]
    pub email: String,
}

/// Reset password request carrying the emailed token and the new password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    #[schema(example = "Str0ng@Pass")]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateResetTokenRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

/// Side-effect-free pre-check result for a reset token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResetTokenValidity {
    pub valid: bool,
    /// Failure kind (`token_not_found`, `token_already_used`, `token_expired`)
    pub reason: Option<String>,
}

impl ResetTokenValidity {
    pub fn from_result<T>(result: &Result<T, AuthError>) -> Self {
        match result {
            Ok(_) => Self {
                valid: true,
                reason: None,
            },
            Err(err) => Self {
                valid: false,
                reason: Some(err.kind().to_string()),
            },
        }
    }
}
