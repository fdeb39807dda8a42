//! Authentication models and DTOs.
//!
//! Sign-in requests and responses plus the [`AuthenticatedIdentity`] produced
//! by a successful credential check.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::UserId;
use crate::roles::RoleSummary;
use crate::value_types::{Email, Username};

/// Sign-in request with username and password.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SigninRequest {
    #[validate(length(min = 1))]
    #[schema(example = "alice")]
    pub username: String,
    #[validate(length(min = 1))]
    #[schema(example = "Strong@Pass2")]
    pub password: String,
}

/// The resolved identity of an account that passed the authentication gate.
///
/// `roles` lists only active roles; `permissions` is the de-duplicated union of
/// their permission codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedIdentity {
    pub user_id: UserId,
    pub username: Username,
    pub email: Email,
    pub is_super_admin: bool,
    pub roles: Vec<RoleSummary>,
    #[schema(value_type = Vec<String>)]
    pub permissions: BTreeSet<String>,
}

impl AuthenticatedIdentity {
    pub fn has_permission(&self, code: &str) -> bool {
        self.is_super_admin || self.permissions.contains(code)
    }
}

/// Successful sign-in response with access token and identity.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SigninResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
    pub identity: AuthenticatedIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
