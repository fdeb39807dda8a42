//! # Campus Models
//!
//! Domain models and DTOs for the Campus identity service.
//!
//! # Modules
//!
//! - [`ids`]: typed `Uuid` wrappers for every entity
//! - [`value_types`]: validated [`Email`] and [`Username`]
//! - [`users`]: accounts, account status and admin DTOs
//! - [`tokens`]: password reset tokens and the reset flow DTOs
//! - [`roles`]: roles, permissions and their DTOs
//! - [`auth`]: sign-in DTOs and [`AuthenticatedIdentity`]
//!
//! # Example
//!
//! ```ignore
//! use campus_models::{AccountStatus, PasswordResetToken};
//!
//! token.ensure_redeemable(clock.now())?;
//! account.status.ensure_can_authenticate()?;
//! ```

pub mod auth;
pub mod ids;
pub mod roles;
pub mod tokens;
pub mod users;
pub mod value_types;

pub use auth::{AuthenticatedIdentity, MessageResponse, SigninRequest, SigninResponse};
pub use ids::{PermissionId, ResetTokenId, RoleId, UserId};
pub use roles::{
    CreatePermissionDto, CreateRoleDto, GrantPermissionsDto, NewPermission, NewRole, Permission,
    Role, RoleStatus, RoleSummary, RoleWithPermissions,
};
pub use tokens::{
    ForgotPasswordRequest, IssuedResetToken, NewResetToken, PasswordResetToken,
    ResetPasswordRequest, ResetTokenValidity, ValidateResetTokenRequest,
};
pub use users::{
    AccountProfile, AccountStatus, AssignRoleDto, NewUserAccount, SignupRequest, UpdateStatusDto,
    UserAccount,
};
pub use value_types::{Email, Username, ValueTypeError};
