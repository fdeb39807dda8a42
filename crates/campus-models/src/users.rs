//! User account models and DTOs.
//!
//! [`UserAccount`] is the stored entity and carries the password hash, so it
//! is never serialized. Responses use [`AccountProfile`].

use std::fmt;

use campus_core::AuthError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{RoleId, UserId};
use crate::value_types::{Email, Username};

/// Administrative status of an account.
///
/// Deletion is tracked separately by [`UserAccount::is_deleted`] and is
/// terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "account_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Blocked,
}

impl AccountStatus {
    /// Status gate for sign-in. Only active accounts pass.
    pub fn ensure_can_authenticate(self) -> Result<(), AuthError> {
        match self {
            Self::Active => Ok(()),
            Self::Inactive => Err(AuthError::AccountInactive),
            Self::Blocked => Err(AuthError::AccountBlocked),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Blocked => "BLOCKED",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user account.
#[derive(FromRow, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub status: AccountStatus,
    pub is_super_admin: bool,
    pub is_deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UserAccount {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            status: self.status,
            is_super_admin: self.is_super_admin,
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserAccount")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("status", &self.status)
            .field("is_super_admin", &self.is_super_admin)
            .field("is_deleted", &self.is_deleted)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Insert payload for a new account. The password is already hashed.
#[derive(Clone)]
pub struct NewUserAccount {
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub is_super_admin: bool,
}

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountProfile {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub status: AccountStatus,
    pub is_super_admin: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Self-service account creation.
///
/// Username and email are validated by their types during deserialization;
/// the password is checked against the strength policy by the service.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    pub username: Username,
    pub email: Email,
    #[validate(length(min = 1))]
    #[schema(example = "Str0ng@Pass")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusDto {
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignRoleDto {
    pub role_id: RoleId,
}
