use std::sync::Arc;

use campus_auth::create_access_token;
use campus_config::JwtConfig;
use campus_core::AuthError;
use campus_db::{IdentityStore, StoreError};
use campus_models::{
    AccountProfile, Email, NewUserAccount, ResetTokenValidity, SigninResponse, SignupRequest,
    UserId, Username,
};
use tracing::{info, instrument, warn};

use super::gate::AuthenticationGate;
use super::notifier::ResetTokenNotifier;
use super::reset_tokens::PasswordResetTokenManager;
use crate::metrics::{track_account_created, track_reset_issued, track_reset_redeemed, track_signin};

/// Public authentication flows: sign-up, sign-in and password reset.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn IdentityStore>,
    gate: Arc<AuthenticationGate>,
    resets: Arc<PasswordResetTokenManager>,
    notifier: Arc<dyn ResetTokenNotifier>,
    jwt_config: JwtConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn IdentityStore>,
        gate: Arc<AuthenticationGate>,
        resets: Arc<PasswordResetTokenManager>,
        notifier: Arc<dyn ResetTokenNotifier>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            store,
            gate,
            resets,
            notifier,
            jwt_config,
        }
    }

    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }

    pub fn resets(&self) -> &PasswordResetTokenManager {
        &self.resets
    }

    #[instrument(skip(self, dto), fields(username = %dto.username))]
    pub async fn signup(&self, dto: SignupRequest) -> Result<AccountProfile, AuthError> {
        self.gate.check_password_policy(&dto.password)?;
        let password_hash = self.gate.hash_credential(&dto.password).await?;

        let account = self
            .store
            .insert_user(NewUserAccount {
                username: dto.username,
                email: dto.email,
                password_hash,
                is_super_admin: false,
            })
            .await
            .map_err(|err| match err {
                StoreError::Conflict(constraint) if constraint.contains("username") => {
                    AuthError::Conflict("Username is already taken".into())
                }
                StoreError::Conflict(constraint) if constraint.contains("email") => {
                    AuthError::Conflict("Email is already registered".into())
                }
                other => other.into(),
            })?;

        track_account_created();
        info!(user_id = %account.id, "Account created");
        Ok(account.profile())
    }

    /// Creates the initial super-admin unless the username is already taken.
    /// Returns whether an account was created.
    #[instrument(skip(self, email, password))]
    pub async fn bootstrap_super_admin(
        &self,
        username: Username,
        email: Email,
        password: &str,
    ) -> Result<bool, AuthError> {
        if self
            .store
            .find_user_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Ok(false);
        }

        self.gate.check_password_policy(password)?;
        let password_hash = self.gate.hash_credential(password).await?;
        let account = self
            .store
            .insert_user(NewUserAccount {
                username,
                email,
                password_hash,
                is_super_admin: true,
            })
            .await?;

        info!(user_id = %account.id, "Super-admin account created");
        Ok(true)
    }

    #[instrument(skip(self, password))]
    pub async fn signin(&self, username: &str, password: &str) -> Result<SigninResponse, AuthError> {
        let identity = match self.gate.authenticate(username, password).await {
            Ok(identity) => identity,
            Err(err) => {
                track_signin(err.kind());
                return Err(err);
            }
        };

        let access_token = create_access_token(&identity, &self.jwt_config)
            .map_err(|err| AuthError::Internal(err.error.to_string()))?;

        track_signin("success");
        info!(user_id = %identity.user_id, "Sign-in succeeded");

        Ok(SigninResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_config.access_token_expiry,
            identity,
        })
    }

    /// Issues and dispatches a reset token when `email` belongs to an
    /// account. Unknown addresses succeed silently.
    #[instrument(skip_all)]
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Some(account) = self.store.find_user_by_email(email.trim()).await? else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let issued = self.resets.issue(&account).await?;
        track_reset_issued();

        if let Err(err) = self.notifier.send_reset_token(&account, &issued).await {
            warn!(user_id = %account.id, error = %err, "Failed to deliver reset token");
        }

        Ok(())
    }

    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<UserId, AuthError> {
        let result = self.resets.consume(token, new_password).await;
        match &result {
            Ok(_) => track_reset_redeemed("success"),
            Err(err) => track_reset_redeemed(err.kind()),
        }
        result
    }

    pub async fn validate_reset_token(&self, token: &str) -> Result<ResetTokenValidity, AuthError> {
        let result = self.resets.validate(token).await;
        match result {
            Err(err @ (AuthError::Transient(_) | AuthError::Internal(_))) => Err(err),
            other => Ok(ResetTokenValidity::from_result(&other)),
        }
    }
}
