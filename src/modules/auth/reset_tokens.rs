//! Password reset token lifecycle: issue, validate, consume.
//!
//! A token is single-use and time-bound. Validity (`!is_used && now <
//! expires_at`) is always re-read from the store; nothing is cached here.
//!
//! Redemption runs in one store transaction that locks the token row, flips
//! `is_used` with a conditional update and replaces the password hash. Of any
//! number of concurrent redemptions of one token, at most one commits.

use std::sync::Arc;

use campus_config::{PasswordResetConfig, PriorTokenPolicy};
use campus_core::{AuthError, Clock};
use campus_db::{IdentityStore, IdentityTransaction, StoreError};
use campus_models::{IssuedResetToken, NewResetToken, UserAccount, UserId};
use tracing::{debug, info, instrument, warn};

use super::gate::AuthenticationGate;
use super::tokens::TokenGenerator;

pub struct PasswordResetTokenManager {
    store: Arc<dyn IdentityStore>,
    gate: Arc<AuthenticationGate>,
    generator: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    config: PasswordResetConfig,
}

impl PasswordResetTokenManager {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        gate: Arc<AuthenticationGate>,
        generator: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
        config: PasswordResetConfig,
    ) -> Self {
        Self {
            store,
            gate,
            generator,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &PasswordResetConfig {
        &self.config
    }

    /// Persists a fresh token for `user` and returns it for delivery.
    ///
    /// Token string collisions are retried with a new value up to
    /// `issue_attempts` times, then reported as `Transient`.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn issue(&self, user: &UserAccount) -> Result<IssuedResetToken, AuthError> {
        if user.is_deleted {
            return Err(AuthError::AccountNotFound);
        }

        let now = self.clock.now();
        let expires_at = now.checked_add_signed(self.config.token_ttl).ok_or_else(|| {
            AuthError::Internal(format!(
                "reset token lifetime of {} seconds is out of range",
                self.config.token_ttl.num_seconds()
            ))
        })?;

        if self.config.prior_tokens == PriorTokenPolicy::Revoke {
            let revoked = self.store.expire_outstanding_tokens(user.id, now).await?;
            debug!(revoked, "Expired outstanding reset tokens");
        }

        let attempts = self.config.issue_attempts.max(1);

        for attempt in 1..=attempts {
            let candidate = NewResetToken {
                user_id: user.id,
                token: self.generator.generate(),
                expires_at,
                created_at: now,
            };

            match self.store.insert_token(candidate).await {
                Ok(row) => {
                    info!(token_id = %row.id, expires_at = %row.expires_at, "Reset token issued");
                    return Ok(row.into());
                }
                Err(StoreError::Conflict(constraint)) => {
                    warn!(attempt, %constraint, "Reset token collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AuthError::Transient(format!(
            "could not generate a unique reset token in {} attempts",
            attempts
        )))
    }

    /// Resolves the owner of a redeemable token without changing anything.
    ///
    /// Fails with `TokenNotFound`, `TokenAlreadyUsed` or `TokenExpired`, in
    /// that order. A token whose owner is gone counts as not found.
    pub async fn validate(&self, token: &str) -> Result<UserAccount, AuthError> {
        let row = self
            .store
            .find_token(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        row.ensure_redeemable(self.clock.now())?;

        self.store
            .find_user_by_id(row.user_id)
            .await?
            .ok_or(AuthError::TokenNotFound)
    }

    /// Redeems `token` and sets the owner's password to `new_password`.
    ///
    /// Token failures take precedence over `WeakPassword`. On any failure
    /// neither the token nor the password changes.
    #[instrument(skip_all)]
    pub async fn consume(&self, token: &str, new_password: &str) -> Result<UserId, AuthError> {
        let owner = self.validate(token).await?;
        self.gate.check_password_policy(new_password)?;
        let hash = self.gate.hash_credential(new_password).await?;

        let mut tx = self.store.begin().await?;
        match self.redeem(tx.as_mut(), token, &hash).await {
            Ok(user_id) => {
                tx.commit().await?;
                info!(user_id = %user_id, "Password reset completed");
                Ok(user_id)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed redemption failed");
                }
                debug!(user_id = %owner.id, reason = err.kind(), "Password reset rejected");
                Err(err)
            }
        }
    }

    async fn redeem(
        &self,
        tx: &mut dyn IdentityTransaction,
        token: &str,
        hash: &str,
    ) -> Result<UserId, AuthError> {
        let row = tx
            .find_token_for_update(token)
            .await?
            .ok_or(AuthError::TokenNotFound)?;

        let now = self.clock.now();
        row.ensure_redeemable(now)?;

        if !tx.mark_token_used_if_unused(row.id, now).await? {
            return Err(AuthError::TokenAlreadyUsed);
        }

        self.gate.replace_credential(tx, row.user_id, hash).await?;

        Ok(row.user_id)
    }
}
