use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use campus_models::{
    AccountProfile, AccountStatus, AssignRoleDto, AuthenticatedIdentity, CreatePermissionDto,
    CreateRoleDto, ForgotPasswordRequest, GrantPermissionsDto, MessageResponse, Permission,
    ResetPasswordRequest, ResetTokenValidity, Role, RoleStatus, RoleSummary, RoleWithPermissions,
    SigninRequest, SigninResponse, SignupRequest, UpdateStatusDto, ValidateResetTokenRequest,
};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::health::controller::HealthResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::signup,
        crate::modules::auth::controller::signin,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::validate_reset_token,
        crate::modules::users::controller::get_me,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_status,
        crate::modules::users::controller::delete_user,
        crate::modules::users::controller::assign_role,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::list_roles,
        crate::modules::roles::controller::grant_permissions,
        crate::modules::roles::controller::create_permission,
        crate::modules::health::controller::health,
    ),
    components(
        schemas(
            SignupRequest,
            SigninRequest,
            SigninResponse,
            AuthenticatedIdentity,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            ValidateResetTokenRequest,
            ResetTokenValidity,
            MessageResponse,
            AccountProfile,
            AccountStatus,
            UpdateStatusDto,
            AssignRoleDto,
            Role,
            RoleStatus,
            RoleSummary,
            RoleWithPermissions,
            Permission,
            CreateRoleDto,
            CreatePermissionDto,
            GrantPermissionsDto,
            HealthResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sign-up, sign-in and password reset"),
        (name = "Users", description = "Account administration"),
        (name = "Roles", description = "Roles and permissions"),
        (name = "Health", description = "Liveness")
    ),
    info(
        title = "Campus Identity API",
        version = "0.1.0",
        description = "Accounts, credentials, password reset and role-based permissions for the campus platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
