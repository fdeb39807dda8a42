use std::sync::Arc;

use campus_core::AuthError;
use campus_db::IdentityStore;
use campus_models::{AccountProfile, AccountStatus, UserId};
use tracing::{info, instrument};

/// Administrative operations on existing accounts.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn IdentityStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    pub async fn get_account(&self, id: UserId) -> Result<AccountProfile, AuthError> {
        self.store
            .find_user_by_id(id)
            .await?
            .map(|account| account.profile())
            .ok_or(AuthError::AccountNotFound)
    }

    /// Takes effect on the next sign-in attempt. Access tokens already issued
    /// stay valid until they expire.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: UserId,
        status: AccountStatus,
    ) -> Result<AccountProfile, AuthError> {
        if !self.store.update_user_status(id, status).await? {
            return Err(AuthError::AccountNotFound);
        }
        info!(user_id = %id, %status, "Account status changed");
        self.get_account(id).await
    }

    /// The row is kept; the account disappears from every lookup and its
    /// username and email become available again.
    #[instrument(skip(self))]
    pub async fn soft_delete(&self, id: UserId) -> Result<(), AuthError> {
        if !self.store.soft_delete_user(id).await? {
            return Err(AuthError::AccountNotFound);
        }
        info!(user_id = %id, "Account deleted");
        Ok(())
    }
}
