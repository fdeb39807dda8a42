//! PostgreSQL implementation of the identity and role stores.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction, types::Uuid};
use tracing::instrument;

use campus_models::{
    AccountStatus, NewPermission, NewResetToken, NewRole, NewUserAccount, PasswordResetToken,
    Permission, PermissionId, ResetTokenId, Role, RoleId, RoleWithPermissions, UserAccount,
    UserId,
};

use crate::error::StoreError;
use crate::store::{IdentityStore, IdentityTransaction, RoleStore, StoreResult};

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find_user_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> StoreResult<Option<UserAccount>> {
        let sql = format!(
            "SELECT id, username, email, password_hash, status, is_super_admin, is_deleted, created_at
             FROM users
             WHERE {} = $1 AND NOT is_deleted",
            column
        );
        let user = sqlx::query_as::<_, UserAccount>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn attach_permissions(&self, roles: Vec<Role>) -> StoreResult<Vec<RoleWithPermissions>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let role_ids: Vec<RoleId> = roles.iter().map(|r| r.id).collect();
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"SELECT rp.role_id, p.id, p.code, p.module, p.description, p.created_at
               FROM role_permissions rp
               JOIN permissions p ON p.id = rp.permission_id
               WHERE rp.role_id = ANY($1)
               ORDER BY p.code"#,
        )
        .bind(&role_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_role: HashMap<RoleId, Vec<Permission>> = HashMap::new();
        for row in rows {
            by_role.entry(row.role_id).or_default().push(row.permission);
        }

        Ok(roles
            .into_iter()
            .map(|role| RoleWithPermissions {
                permissions: by_role.remove(&role.id).unwrap_or_default(),
                role,
            })
            .collect())
    }

    async fn exists(&self, sql: &'static str, id: Uuid) -> StoreResult<bool> {
        let found = sqlx::query_scalar::<_, bool>(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }
}

#[derive(FromRow)]
struct RolePermissionRow {
    role_id: RoleId,
    #[sqlx(flatten)]
    permission: Permission,
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_user_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(
            r#"SELECT id, username, email, password_hash, status, is_super_admin, is_deleted, created_at
               FROM users
               WHERE id = $1 AND NOT is_deleted"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        self.find_user_where("username", username).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        self.find_user_where("email", email).await
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert_user(&self, user: NewUserAccount) -> StoreResult<UserAccount> {
        let account = sqlx::query_as::<_, UserAccount>(
            r#"INSERT INTO users (id, username, email, password_hash, is_super_admin)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, username, email, password_hash, status, is_super_admin, is_deleted, created_at"#,
        )
        .bind(UserId::new())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_super_admin)
        .fetch_one(&self.pool)
        .await?;
        Ok(account)
    }

    async fn update_user_status(&self, id: UserId, status: AccountStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET status = $2 WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn soft_delete_user(&self, id: UserId) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_token(&self, token: &str) -> StoreResult<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"SELECT id, user_id, token, expires_at, is_used, used_at, created_at
               FROM password_reset_tokens
               WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_token(&self, token: NewResetToken) -> StoreResult<PasswordResetToken> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"INSERT INTO password_reset_tokens (id, user_id, token, expires_at, created_at)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, user_id, token, expires_at, is_used, used_at, created_at"#,
        )
        .bind(ResetTokenId::new())
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.expires_at)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn expire_outstanding_tokens(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"UPDATE password_reset_tokens
               SET expires_at = $2
               WHERE user_id = $1 AND is_used = FALSE AND expires_at > $2"#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn begin(&self) -> StoreResult<Box<dyn IdentityTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgIdentityTransaction { tx }))
    }
}

pub struct PgIdentityTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl IdentityTransaction for PgIdentityTransaction {
    async fn find_token_for_update(
        &mut self,
        token: &str,
    ) -> StoreResult<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            r#"SELECT id, user_id, token, expires_at, is_used, used_at, created_at
               FROM password_reset_tokens
               WHERE token = $1
               FOR UPDATE"#,
        )
        .bind(token)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }

    async fn mark_token_used_if_unused(
        &mut self,
        id: ResetTokenId,
        used_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"UPDATE password_reset_tokens
               SET is_used = TRUE, used_at = $2
               WHERE id = $1 AND is_used = FALSE"#,
        )
        .bind(id)
        .bind(used_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self, hash))]
    async fn update_password_hash(&mut self, user_id: UserId, hash: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1 AND NOT is_deleted")
                .bind(user_id)
                .bind(hash)
                .execute(&mut *self.tx)
                .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::from)
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await.map_err(StoreError::from)
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn roles_for_user(&self, user_id: UserId) -> StoreResult<Vec<RoleWithPermissions>> {
        let roles = sqlx::query_as::<_, Role>(
            r#"SELECT r.id, r.name, r.status, r.description, r.created_at
               FROM roles r
               JOIN user_roles ur ON ur.role_id = r.id
               WHERE ur.user_id = $1
               ORDER BY r.name"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_permissions(roles).await
    }

    async fn list_roles(&self) -> StoreResult<Vec<RoleWithPermissions>> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, status, description, created_at FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_permissions(roles).await
    }

    async fn insert_role(&self, role: NewRole) -> StoreResult<Role> {
        let row = sqlx::query_as::<_, Role>(
            r#"INSERT INTO roles (id, name, status, description)
               VALUES ($1, $2, $3, $4)
               RETURNING id, name, status, description, created_at"#,
        )
        .bind(RoleId::new())
        .bind(&role.name)
        .bind(role.status)
        .bind(&role.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_permission(&self, permission: NewPermission) -> StoreResult<Permission> {
        let row = sqlx::query_as::<_, Permission>(
            r#"INSERT INTO permissions (id, code, module, description)
               VALUES ($1, $2, $3, $4)
               RETURNING id, code, module, description, created_at"#,
        )
        .bind(PermissionId::new())
        .bind(&permission.code)
        .bind(&permission.module)
        .bind(&permission.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn grant_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> StoreResult<()> {
        let role_exists = self
            .exists(
                "SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)",
                role_id.into_inner(),
            )
            .await?;
        if !role_exists {
            return Err(StoreError::MissingReference(format!("role {}", role_id)));
        }

        sqlx::query(
            r#"INSERT INTO role_permissions (role_id, permission_id)
               SELECT $1, unnest($2::uuid[])
               ON CONFLICT DO NOTHING"#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> StoreResult<()> {
        let user_exists = self
            .exists(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND NOT is_deleted)",
                user_id.into_inner(),
            )
            .await?;
        if !user_exists {
            return Err(StoreError::MissingReference(format!("user {}", user_id)));
        }

        sqlx::query(
            r#"INSERT INTO user_roles (user_id, role_id)
               VALUES ($1, $2)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
