//! Error types shared by every layer of the identity service.
//!
//! Two layers of errors exist:
//!
//! - [`AuthError`]: the domain taxonomy produced by the reset-token manager,
//!   the authentication gate and the admin services. Each kind knows the HTTP
//!   status it maps to.
//! - [`AppError`]: what HTTP handlers return. It wraps any error in an
//!   [`anyhow::Error`] together with a status code and renders as
//!   `{"error": "..."}`.
//!
//! Converting an [`AuthError`] (directly or through `?`) into an [`AppError`]
//! keeps the domain status instead of falling back to 500.

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Failure kinds of the credential and reset-token core.
///
/// Messages are user-facing. `InvalidCredentials` deliberately covers both
/// "no such user" and "wrong password".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Password reset token not found")]
    TokenNotFound,

    #[error("Password reset token has already been used")]
    TokenAlreadyUsed,

    #[error("Password reset token has expired")]
    TokenExpired,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("Account is blocked")]
    AccountBlocked,

    #[error("Password does not meet the strength policy: {0}")]
    WeakPassword(String),

    /// The backing store could not be reached or timed out. Safe to retry.
    #[error("Service temporarily unavailable: {0}")]
    Transient(String),

    #[error("Account not found")]
    AccountNotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status used when this error reaches a handler.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TokenNotFound | Self::TokenAlreadyUsed | Self::TokenExpired => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountInactive | Self::AccountBlocked => StatusCode::FORBIDDEN,
            Self::WeakPassword(_) | Self::MissingReference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenNotFound => "token_not_found",
            Self::TokenAlreadyUsed => "token_already_used",
            Self::TokenExpired => "token_expired",
            Self::InvalidCredentials => "invalid_credentials",
            Self::AccountInactive => "account_inactive",
            Self::AccountBlocked => "account_blocked",
            Self::WeakPassword(_) => "weak_password",
            Self::Transient(_) => "transient",
            Self::AccountNotFound => "account_not_found",
            Self::Conflict(_) => "conflict",
            Self::MissingReference(_) => "missing_reference",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }
}

impl AppError {
    /// Message sent to the client. Server errors get a fixed text so store
    /// and driver details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.status {
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            status if status.is_server_error() => "Internal server error".to_string(),
            _ => self.error.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = %self.error, "Request failed");
        }

        let body = Json(json!({
            "error": self.public_message()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        let error = err.into();
        let status = error
            .downcast_ref::<AuthError>()
            .map(AuthError::status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        AppError { status, error }
    }
}
