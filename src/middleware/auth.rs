//! Bearer-token authentication and permission extractors.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use campus_auth::{Claims, verify_token};
use campus_core::{AppError, permissions};
use campus_models::UserId;

use crate::state::AppState;

/// Pulls the token out of `Authorization: Bearer <token>`. The scheme is
/// matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AppError::unauthorized("Invalid authorization header format")),
    }
}

/// The verified caller. Rejects with 401 when the token is missing, malformed
/// or expired.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Super admins hold every permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.0.has_permission(permission)
    }

    pub fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    /// 403 unless the caller holds `permission`.
    pub fn ensure_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Access denied. Missing required permission: {}",
                permission
            )))
        }
    }

    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.0
            .user_id()
            .map(UserId::from_uuid)
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = verify_token(token, &state.jwt_config)?;
        Ok(AuthUser(claims))
    }
}

/// Declares extractors that authenticate the caller and then require one
/// permission code.
macro_rules! require_permission {
    ($($name:ident => $permission:expr),+ $(,)?) => {$(
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                user.ensure_permission($permission)?;
                Ok($name(user))
            }
        }
    )+};
}

require_permission! {
    RequireUsersRead => permissions::USERS_READ,
    RequireUsersUpdateStatus => permissions::USERS_UPDATE_STATUS,
    RequireUsersDelete => permissions::USERS_DELETE,
    RequireRolesCreate => permissions::ROLES_CREATE,
    RequireRolesRead => permissions::ROLES_READ,
    RequireRolesUpdate => permissions::ROLES_UPDATE,
    RequireRolesAssign => permissions::ROLES_ASSIGN,
    RequirePermissionsCreate => permissions::PERMISSIONS_CREATE,
}
