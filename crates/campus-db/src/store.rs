//! Store traits consumed by the identity core.
//!
//! Lookups on [`IdentityStore`] never return soft-deleted accounts. Writes
//! that must commit together go through an [`IdentityTransaction`]; dropping
//! one without calling [`IdentityTransaction::commit`] rolls it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use campus_models::{
    AccountStatus, NewPermission, NewResetToken, NewRole, NewUserAccount, PasswordResetToken,
    Permission, PermissionId, ResetTokenId, Role, RoleId, RoleWithPermissions, UserAccount,
    UserId,
};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>>;

    /// Exact, case-sensitive match.
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>>;

    /// Fails with [`StoreError::Conflict`] when a non-deleted account already
    /// uses the username or email.
    async fn insert_user(&self, user: NewUserAccount) -> StoreResult<UserAccount>;

    /// Returns `false` when the account is unknown or deleted.
    async fn update_user_status(&self, id: UserId, status: AccountStatus) -> StoreResult<bool>;

    /// Returns `false` when the account is unknown or already deleted.
    async fn soft_delete_user(&self, id: UserId) -> StoreResult<bool>;

    async fn find_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>>;

    /// Fails with [`StoreError::Conflict`] when the token string is taken.
    async fn insert_token(&self, token: NewResetToken) -> StoreResult<PasswordResetToken>;

    /// Sets `expires_at = now` on every unused, unexpired token of the user.
    async fn expire_outstanding_tokens(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64>;

    async fn begin(&self) -> StoreResult<Box<dyn IdentityTransaction>>;
}

/// A unit of work over the identity store.
#[async_trait]
pub trait IdentityTransaction: Send {
    /// Reads the token row and holds it locked until the transaction ends.
    async fn find_token_for_update(
        &mut self,
        token: &str,
    ) -> StoreResult<Option<PasswordResetToken>>;

    /// Flips `is_used` only if it is still `false`. Returns whether this call
    /// performed the flip.
    async fn mark_token_used_if_unused(
        &mut self,
        id: ResetTokenId,
        used_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Returns `false` when the account is unknown or deleted.
    async fn update_password_hash(&mut self, user_id: UserId, hash: &str) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Every role assigned to the user, active or not, with its permissions.
    async fn roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<RoleWithPermissions>>;

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>>;

    async fn insert_role(&self, role: NewRole) -> StoreResult<Role>;

    async fn insert_permission(&self, permission: NewPermission) -> StoreResult<Permission>;

    /// Idempotent. Unknown role or permission ids fail with
    /// [`StoreError::MissingReference`].
    async fn grant_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> StoreResult<()>;

    /// Idempotent.
    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()>;
}
