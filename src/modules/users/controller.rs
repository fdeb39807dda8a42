use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use campus_core::AppError;
use campus_models::{AccountProfile, AssignRoleDto, UpdateStatusDto, UserId};
use tracing::instrument;

use crate::middleware::auth::{
    AuthUser, RequireRolesAssign, RequireUsersDelete, RequireUsersRead, RequireUsersUpdateStatus,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

/// Get the caller's own account
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current account", body = AccountProfile),
        (status = 401, description = "Unauthorized - missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<AccountProfile>, AppError> {
    let profile = state.accounts.get_account(auth_user.user_id()?).await?;
    Ok(Json(profile))
}

/// Get an account by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = AccountProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing users:read", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: RequireUsersRead,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> Result<Json<AccountProfile>, AppError> {
    let profile = state.accounts.get_account(id).await?;
    Ok(Json(profile))
}

/// Change an account's status
#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    params(("id" = UserId, Path, description = "Account ID")),
    request_body = UpdateStatusDto,
    responses(
        (status = 204, description = "Status updated"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing users:update_status", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _caller, dto))]
pub async fn update_status(
    State(state): State<AppState>,
    _caller: RequireUsersUpdateStatus,
    ValidatedPath(id): ValidatedPath<UserId>,
    ValidatedJson(dto): ValidatedJson<UpdateStatusDto>,
) -> Result<StatusCode, AppError> {
    state.accounts.set_status(id, dto.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Soft-delete an account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = UserId, Path, description = "Account ID")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing users:delete", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    _caller: RequireUsersDelete,
    ValidatedPath(id): ValidatedPath<UserId>,
) -> Result<StatusCode, AppError> {
    state.accounts.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Assign a role to an account
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    params(("id" = UserId, Path, description = "Account ID")),
    request_body = AssignRoleDto,
    responses(
        (status = 204, description = "Role assigned"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing roles:assign", body = ErrorResponse),
        (status = 422, description = "Unknown account or role", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, _caller, dto))]
pub async fn assign_role(
    State(state): State<AppState>,
    _caller: RequireRolesAssign,
    ValidatedPath(id): ValidatedPath<UserId>,
    ValidatedJson(dto): ValidatedJson<AssignRoleDto>,
) -> Result<StatusCode, AppError> {
    state.roles.assign_role(id, dto.role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
