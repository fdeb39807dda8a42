use std::sync::Arc;

use campus_core::{AuthError, permissions};
use campus_db::{IdentityStore, RoleStore, StoreError};
use campus_models::{
    CreatePermissionDto, CreateRoleDto, NewPermission, NewRole, Permission, PermissionId, Role,
    RoleId, RoleStatus, RoleWithPermissions, UserId,
};
use tracing::{info, instrument};

/// Role and permission administration.
#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleStore>,
    identities: Arc<dyn IdentityStore>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleStore>, identities: Arc<dyn IdentityStore>) -> Self {
        Self { roles, identities }
    }

    /// Registers a permission code. The module tag defaults to the code's
    /// prefix (`users:read` -> `users`).
    #[instrument(skip(self, dto), fields(code = %dto.code))]
    pub async fn create_permission(
        &self,
        dto: CreatePermissionDto,
    ) -> Result<Permission, AuthError> {
        let module = dto
            .module
            .unwrap_or_else(|| permissions::module_of(&dto.code).to_string());

        let permission = self
            .roles
            .insert_permission(NewPermission {
                code: dto.code,
                module,
                description: dto.description,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => {
                    AuthError::Conflict("Permission code already exists".into())
                }
                other => other.into(),
            })?;

        info!(permission_id = %permission.id, "Permission created");
        Ok(permission)
    }

    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create_role(&self, dto: CreateRoleDto) -> Result<Role, AuthError> {
        let role = self
            .roles
            .insert_role(NewRole {
                name: dto.name,
                description: dto.description,
                status: RoleStatus::Active,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict(_) => AuthError::Conflict("Role name already exists".into()),
                other => other.into(),
            })?;

        info!(role_id = %role.id, "Role created");
        Ok(role)
    }

    pub async fn list_roles(&self) -> Result<Vec<RoleWithPermissions>, AuthError> {
        Ok(self.roles.list_roles().await?)
    }

    /// Granting a permission the role already holds is a no-op.
    #[instrument(skip(self, permission_ids))]
    pub async fn grant_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> Result<(), AuthError> {
        self.roles
            .grant_permissions(role_id, permission_ids)
            .await?;
        info!(count = permission_ids.len(), "Permissions granted");
        Ok(())
    }

    /// Assigning a role the account already holds is a no-op.
    #[instrument(skip(self))]
    pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> Result<(), AuthError> {
        if self.identities.find_user_by_id(user_id).await?.is_none() {
            return Err(AuthError::MissingReference(format!("account {}", user_id)));
        }
        self.roles.assign_role(user_id, role_id).await?;
        info!("Role assigned");
        Ok(())
    }
}
