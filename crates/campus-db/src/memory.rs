//! In-process implementation of the identity and role stores.
//!
//! Used by the test suites and by `STORE_BACKEND=memory`. A transaction takes
//! the store lock for its whole lifetime and works on a copy of the state,
//! which replaces the shared state only on commit.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use campus_models::{
    AccountStatus, NewPermission, NewResetToken, NewRole, NewUserAccount, PasswordResetToken,
    Permission, PermissionId, ResetTokenId, Role, RoleId, RoleWithPermissions, UserAccount,
    UserId,
};

use crate::error::StoreError;
use crate::store::{IdentityStore, IdentityTransaction, RoleStore, StoreResult};

#[derive(Clone, Default)]
struct MemoryState {
    users: HashMap<UserId, UserAccount>,
    tokens: HashMap<ResetTokenId, PasswordResetToken>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: BTreeSet<(UserId, RoleId)>,
}

impl MemoryState {
    fn active_user(&self, id: UserId) -> Option<&UserAccount> {
        self.users.get(&id).filter(|u| !u.is_deleted)
    }

    fn token_by_value(&self, token: &str) -> Option<&PasswordResetToken> {
        self.tokens.values().find(|t| t.token == token)
    }

    fn with_permissions(&self, role: &Role) -> RoleWithPermissions {
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .iter()
            .filter(|(role_id, _)| *role_id == role.id)
            .filter_map(|(_, permission_id)| self.permissions.get(permission_id).cloned())
            .collect();
        permissions.sort_by(|a, b| a.code.cmp(&b.code));

        RoleWithPermissions {
            role: role.clone(),
            permissions,
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_password_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later in-transaction password write fail with
    /// [`StoreError::Unavailable`].
    #[cfg(any(test, feature = "test-utils"))]
    pub fn fail_password_writes(&self, fail: bool) {
        self.fail_password_writes.store(fail, Ordering::SeqCst);
    }

    /// All token rows of a user, oldest first.
    #[cfg(any(test, feature = "test-utils"))]
    pub async fn tokens_for_user(&self, user_id: UserId) -> Vec<PasswordResetToken> {
        let state = self.state.lock().await;
        let mut tokens: Vec<PasswordResetToken> = state
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        tokens
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        Ok(self.state.lock().await.active_user(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| !u.is_deleted && u.username.as_str() == username)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| !u.is_deleted && u.email.as_str() == email)
            .cloned())
    }

    async fn insert_user(&self, user: NewUserAccount) -> StoreResult<UserAccount> {
        let mut state = self.state.lock().await;

        for existing in state.users.values().filter(|u| !u.is_deleted) {
            if existing.username == user.username {
                return Err(StoreError::Conflict("users_username_active_key".into()));
            }
            if existing.email == user.email {
                return Err(StoreError::Conflict("users_email_active_key".into()));
            }
        }

        let account = UserAccount {
            id: UserId::new(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            status: AccountStatus::Active,
            is_super_admin: user.is_super_admin,
            is_deleted: false,
            created_at: Utc::now(),
        };
        state.users.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_user_status(&self, id: UserId, status: AccountStatus) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&id).filter(|u| !u.is_deleted) {
            Some(user) => {
                user.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete_user(&self, id: UserId) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        match state.users.get_mut(&id).filter(|u| !u.is_deleted) {
            Some(user) => {
                user.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>> {
        Ok(self.state.lock().await.token_by_value(token).cloned())
    }

    async fn insert_token(&self, token: NewResetToken) -> StoreResult<PasswordResetToken> {
        let mut state = self.state.lock().await;

        if !state.users.contains_key(&token.user_id) {
            return Err(StoreError::MissingReference(format!(
                "user {}",
                token.user_id
            )));
        }
        if state.token_by_value(&token.token).is_some() {
            return Err(StoreError::Conflict(
                "password_reset_tokens_token_key".into(),
            ));
        }

        let row = PasswordResetToken {
            id: ResetTokenId::new(),
            user_id: token.user_id,
            token: token.token,
            expires_at: token.expires_at,
            is_used: false,
            used_at: None,
            created_at: token.created_at,
        };
        state.tokens.insert(row.id, row.clone());
        Ok(row)
    }

    async fn expire_outstanding_tokens(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let mut state = self.state.lock().await;
        let mut expired = 0;
        for token in state
            .tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.is_used && t.expires_at > now)
        {
            token.expires_at = now;
            expired += 1;
        }
        Ok(expired)
    }

    async fn begin(&self) -> StoreResult<Box<dyn IdentityTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryTransaction {
            guard,
            working,
            fail_password_writes: Arc::clone(&self.fail_password_writes),
        }))
    }
}

pub struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    fail_password_writes: Arc<AtomicBool>,
}

#[async_trait]
impl IdentityTransaction for MemoryTransaction {
    async fn find_token_for_update(
        &mut self,
        token: &str,
    ) -> StoreResult<Option<PasswordResetToken>> {
        Ok(self.working.token_by_value(token).cloned())
    }

    async fn mark_token_used_if_unused(
        &mut self,
        id: ResetTokenId,
        used_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        match self.working.tokens.get_mut(&id).filter(|t| !t.is_used) {
            Some(token) => {
                token.is_used = true;
                token.used_at = Some(used_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password_hash(&mut self, user_id: UserId, hash: &str) -> StoreResult<bool> {
        if self.fail_password_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("password write failed".into()));
        }
        match self.working.users.get_mut(&user_id).filter(|u| !u.is_deleted) {
            Some(user) => {
                user.password_hash = hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<RoleWithPermissions>> {
        let state = self.state.lock().await;
        let mut roles: Vec<RoleWithPermissions> = state
            .user_roles
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, role_id)| state.roles.get(role_id))
            .map(|role| state.with_permissions(role))
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>> {
        let state = self.state.lock().await;
        let mut roles: Vec<RoleWithPermissions> = state
            .roles
            .values()
            .map(|role| state.with_permissions(role))
            .collect();
        roles.sort_by(|a, b| a.role.name.cmp(&b.role.name));
        Ok(roles)
    }

    async fn insert_role(&self, role: NewRole) -> StoreResult<Role> {
        let mut state = self.state.lock().await;
        if state.roles.values().any(|r| r.name == role.name) {
            return Err(StoreError::Conflict("roles_name_key".into()));
        }

        let row = Role {
            id: RoleId::new(),
            name: role.name,
            status: role.status,
            description: role.description,
            created_at: Utc::now(),
        };
        state.roles.insert(row.id, row.clone());
        Ok(row)
    }

    async fn insert_permission(&self, permission: NewPermission) -> StoreResult<Permission> {
        let mut state = self.state.lock().await;
        if state.permissions.values().any(|p| p.code == permission.code) {
            return Err(StoreError::Conflict("permissions_code_key".into()));
        }

        let row = Permission {
            id: PermissionId::new(),
            code: permission.code,
            module: permission.module,
            description: permission.description,
            created_at: Utc::now(),
        };
        state.permissions.insert(row.id, row.clone());
        Ok(row)
    }

    async fn grant_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if !state.roles.contains_key(&role_id) {
            return Err(StoreError::MissingReference(format!("role {}", role_id)));
        }
        if let Some(missing) = permission_ids
            .iter()
            .find(|id| !state.permissions.contains_key(*id))
        {
            return Err(StoreError::MissingReference(format!(
                "permission {}",
                missing
            )));
        }

        for permission_id in permission_ids {
            state.role_permissions.insert((role_id, *permission_id));
        }
        Ok(())
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.active_user(user_id).is_none() {
            return Err(StoreError::MissingReference(format!("user {}", user_id)));
        }
        if !state.roles.contains_key(&role_id) {
            return Err(StoreError::MissingReference(format!("role {}", role_id)));
        }

        state.user_roles.insert((user_id, role_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_models::{Email, RoleStatus, Username};
    use chrono::Duration;

    fn new_user(name: &str) -> NewUserAccount {
        NewUserAccount {
            username: Username::new(name).unwrap(),
            email: Email::new(format!("{name}@example.com")).unwrap(),
            password_hash: "hash".to_string(),
            is_super_admin: false,
        }
    }

    fn new_token(user_id: UserId, value: &str) -> NewResetToken {
        let now = Utc::now();
        NewResetToken {
            user_id,
            token: value.to_string(),
            expires_at: now + Duration::hours(24),
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_username_unique_among_active_accounts() {
        let store = MemoryStore::new();
        let alice = store.insert_user(new_user("alice")).await.unwrap();

        let err = store.insert_user(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        assert!(store.soft_delete_user(alice.id).await.unwrap());
        assert!(store.insert_user(new_user("alice")).await.is_ok());
    }

    #[tokio::test]
    async fn test_deleted_accounts_are_invisible() {
        let store = MemoryStore::new();
        let bob = store.insert_user(new_user("bob")).await.unwrap();
        store.soft_delete_user(bob.id).await.unwrap();

        assert!(store.find_user_by_id(bob.id).await.unwrap().is_none());
        assert!(store.find_user_by_username("bob").await.unwrap().is_none());
        assert!(!store.soft_delete_user(bob.id).await.unwrap());
        assert!(
            !store
                .update_user_status(bob.id, AccountStatus::Active)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_duplicate_token_value_conflicts() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("carol")).await.unwrap();

        store.insert_token(new_token(user.id, "abc")).await.unwrap();
        let err = store.insert_token(new_token(user.id, "abc")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("dave")).await.unwrap();
        let token = store.insert_token(new_token(user.id, "t1")).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            assert!(tx.mark_token_used_if_unused(token.id, Utc::now()).await.unwrap());
            assert!(tx.update_password_hash(user.id, "new-hash").await.unwrap());
        }

        assert!(!store.find_token("t1").await.unwrap().unwrap().is_used);
        let reloaded = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_committed_transaction_applies_writes() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("erin")).await.unwrap();
        let token = store.insert_token(new_token(user.id, "t2")).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.mark_token_used_if_unused(token.id, Utc::now()).await.unwrap());
        assert!(!tx.mark_token_used_if_unused(token.id, Utc::now()).await.unwrap());
        tx.commit().await.unwrap();

        let row = store.find_token("t2").await.unwrap().unwrap();
        assert!(row.is_used);
        assert!(row.used_at.is_some());
    }

    #[tokio::test]
    async fn test_expire_outstanding_tokens() {
        let store = MemoryStore::new();
        let user = store.insert_user(new_user("frank")).await.unwrap();
        store.insert_token(new_token(user.id, "a")).await.unwrap();
        store.insert_token(new_token(user.id, "b")).await.unwrap();

        let now = Utc::now();
        assert_eq!(store.expire_outstanding_tokens(user.id, now).await.unwrap(), 2);
        assert_eq!(store.expire_outstanding_tokens(user.id, now).await.unwrap(), 0);
        for token in store.tokens_for_user(user.id).await {
            assert_eq!(token.expires_at, now);
        }
    }

    #[tokio::test]
    async fn test_grant_permissions_is_idempotent() {
        let store = MemoryStore::new();
        let role = store
            .insert_role(NewRole {
                name: "teacher".into(),
                description: None,
                status: RoleStatus::Active,
            })
            .await
            .unwrap();
        let permission = store
            .insert_permission(NewPermission {
                code: "users:read".into(),
                module: "users".into(),
                description: None,
            })
            .await
            .unwrap();

        store.grant_permissions(role.id, &[permission.id]).await.unwrap();
        store.grant_permissions(role.id, &[permission.id]).await.unwrap();

        let roles = store.list_roles().await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_references_rejected() {
        let store = MemoryStore::new();
        let err = store
            .grant_permissions(RoleId::new(), &[PermissionId::new()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));

        let err = store
            .assign_role(UserId::new(), RoleId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }
}
