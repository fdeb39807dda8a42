//! Credential verification and account status gating.

use std::collections::BTreeSet;
use std::sync::Arc;

use campus_core::{AuthError, PasswordHasher, PasswordPolicy};
use campus_db::{IdentityStore, IdentityTransaction, RoleStore};
use campus_models::{AuthenticatedIdentity, RoleSummary, UserAccount, UserId};
use tracing::{debug, instrument};

/// Plaintext behind the hash verified for unknown usernames.
const DECOY_PASSWORD: &str = "decoy-credential-for-unknown-users";

/// Decides whether a username/password pair may sign in, and owns the
/// credential policy (strength check, hashing, hash replacement).
pub struct AuthenticationGate {
    store: Arc<dyn IdentityStore>,
    roles: Arc<dyn RoleStore>,
    hasher: PasswordHasher,
    policy: Arc<dyn PasswordPolicy>,
    decoy_hash: String,
}

impl AuthenticationGate {
    /// Hashes the decoy credential up front, so construction costs one bcrypt
    /// round.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        roles: Arc<dyn RoleStore>,
        hasher: PasswordHasher,
        policy: Arc<dyn PasswordPolicy>,
    ) -> Result<Self, AuthError> {
        let decoy_hash = hasher.hash(DECOY_PASSWORD)?;
        Ok(Self {
            store,
            roles,
            hasher,
            policy,
            decoy_hash,
        })
    }

    /// Checks order: credentials first, then status. An inactive account with
    /// a wrong password reports `InvalidCredentials`, never its status.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let Some(account) = self.store.find_user_by_username(username).await? else {
            // Same bcrypt cost as a real account
            let _ = self
                .hasher
                .verify_blocking(password, &self.decoy_hash)
                .await;
            debug!("Sign-in for unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_blocking(password, &account.password_hash)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        account.status.ensure_can_authenticate()?;

        self.resolve_identity(&account).await
    }

    /// Builds the identity of an account: active roles only, permissions
    /// merged as a set.
    pub async fn resolve_identity(
        &self,
        account: &UserAccount,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let assigned = self.roles.roles_for_user(account.id).await?;

        let mut roles = Vec::new();
        let mut permissions = BTreeSet::new();
        for entry in assigned.iter().filter(|r| r.role.status.is_active()) {
            roles.push(RoleSummary::from(&entry.role));
            permissions.extend(entry.permissions.iter().map(|p| p.code.clone()));
        }

        Ok(AuthenticatedIdentity {
            user_id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            is_super_admin: account.is_super_admin,
            roles,
            permissions,
        })
    }

    pub fn check_password_policy(&self, candidate: &str) -> Result<(), AuthError> {
        self.policy.check(candidate).map_err(AuthError::from)
    }

    pub async fn hash_credential(&self, password: &str) -> Result<String, AuthError> {
        self.hasher.hash_blocking(password).await
    }

    /// Writes a new hash inside the caller's transaction. A vanished or
    /// deleted owner surfaces as `TokenNotFound`, since the only caller is
    /// token redemption.
    pub async fn replace_credential(
        &self,
        tx: &mut dyn IdentityTransaction,
        user_id: UserId,
        hash: &str,
    ) -> Result<(), AuthError> {
        if !tx.update_password_hash(user_id, hash).await? {
            return Err(AuthError::TokenNotFound);
        }
        Ok(())
    }
}
