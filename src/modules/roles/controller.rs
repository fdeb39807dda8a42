use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use campus_core::AppError;
use campus_models::{
    CreatePermissionDto, CreateRoleDto, GrantPermissionsDto, Permission, Role, RoleId,
    RoleWithPermissions,
};
use tracing::instrument;

use crate::middleware::auth::{
    RequirePermissionsCreate, RequireRolesCreate, RequireRolesRead, RequireRolesUpdate,
};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::{ValidatedJson, ValidatedPath};

// ============ Role Endpoints ============

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing roles:create", body = ErrorResponse),
        (status = 409, description = "Role name already exists", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller, dto))]
pub async fn create_role(
    State(state): State<AppState>,
    _caller: RequireRolesCreate,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    let role = state.roles.create_role(dto).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    responses(
        (status = 200, description = "Roles with their permissions", body = Vec<RoleWithPermissions>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing roles:read", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller))]
pub async fn list_roles(
    State(state): State<AppState>,
    _caller: RequireRolesRead,
) -> Result<Json<Vec<RoleWithPermissions>>, AppError> {
    let roles = state.roles.list_roles().await?;
    Ok(Json(roles))
}

#[utoipa::path(
    post,
    path = "/api/roles/{id}/permissions",
    params(("id" = RoleId, Path, description = "Role ID")),
    request_body = GrantPermissionsDto,
    responses(
        (status = 204, description = "Permissions granted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing roles:update", body = ErrorResponse),
        (status = 422, description = "Unknown role or permission", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller, dto))]
pub async fn grant_permissions(
    State(state): State<AppState>,
    _caller: RequireRolesUpdate,
    ValidatedPath(id): ValidatedPath<RoleId>,
    ValidatedJson(dto): ValidatedJson<GrantPermissionsDto>,
) -> Result<StatusCode, AppError> {
    state.roles.grant_permissions(id, &dto.permission_ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ Permission Endpoints ============

#[utoipa::path(
    post,
    path = "/api/permissions",
    request_body = CreatePermissionDto,
    responses(
        (status = 201, description = "Permission created", body = Permission),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Missing permissions:create", body = ErrorResponse),
        (status = 409, description = "Permission code already exists", body = ErrorResponse)
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _caller, dto))]
pub async fn create_permission(
    State(state): State<AppState>,
    _caller: RequirePermissionsCreate,
    ValidatedJson(dto): ValidatedJson<CreatePermissionDto>,
) -> Result<(StatusCode, Json<Permission>), AppError> {
    let permission = state.roles.create_permission(dto).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}
