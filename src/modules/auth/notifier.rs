use async_trait::async_trait;
use campus_core::AuthError;
use campus_models::{IssuedResetToken, UserAccount};
use tracing::info;

/// Hands an issued reset token to whatever delivers it (email, SMS, ...).
#[async_trait]
pub trait ResetTokenNotifier: Send + Sync {
    async fn send_reset_token(
        &self,
        account: &UserAccount,
        token: &IssuedResetToken,
    ) -> Result<(), AuthError>;
}

/// Records that a token is ready for delivery. The token value is not logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl ResetTokenNotifier for LogNotifier {
    async fn send_reset_token(
        &self,
        account: &UserAccount,
        token: &IssuedResetToken,
    ) -> Result<(), AuthError> {
        info!(
            user_id = %account.id,
            email_domain = %account.email.domain(),
            token_id = %token.id,
            expires_at = %token.expires_at,
            "Password reset token ready for delivery"
        );
        Ok(())
    }
}
