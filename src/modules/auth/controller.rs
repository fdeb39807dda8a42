use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use campus_core::AppError;
use campus_models::{
    AccountProfile, ForgotPasswordRequest, MessageResponse, ResetPasswordRequest,
    ResetTokenValidity, SigninRequest, SigninResponse, SignupRequest, ValidateResetTokenRequest,
};
use tracing::instrument;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Identical for known and unknown addresses.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists with that email, a password reset link has been sent.";

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create an account
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = AccountProfile),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 409, description = "Username or email already in use", body = ErrorResponse),
        (status = 422, description = "Password does not meet the strength policy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<AccountProfile>), AppError> {
    let profile = state.auth.signup(dto).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Sign in and receive an access token
#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Sign-in successful", body = SigninResponse),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 403, description = "Account inactive or blocked", body = ErrorResponse),
        (status = 503, description = "Store temporarily unavailable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto), fields(username = %dto.username))]
pub async fn signin(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SigninRequest>,
) -> Result<Json<SigninResponse>, AppError> {
    let response = state.auth.signin(&dto.username, &dto.password).await?;
    Ok(Json(response))
}

/// Request a password reset token
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset token sent if the account exists", body = MessageResponse),
        (status = 422, description = "Invalid email address", body = ErrorResponse),
        (status = 503, description = "Store temporarily unavailable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state.auth.forgot_password(&dto.email).await?;
    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// Reset a password with a token
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Token not found, already used or expired", body = ErrorResponse),
        (status = 422, description = "Password does not meet the strength policy", body = ErrorResponse),
        (status = 503, description = "Store temporarily unavailable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .auth
        .reset_password(&dto.token, &dto.new_password)
        .await?;
    Ok(Json(MessageResponse::new(
        "Password has been reset successfully",
    )))
}

/// Check whether a reset token can still be redeemed
#[utoipa::path(
    post,
    path = "/api/auth/reset-password/validate",
    request_body = ValidateResetTokenRequest,
    responses(
        (status = 200, description = "Token validity", body = ResetTokenValidity),
        (status = 503, description = "Store temporarily unavailable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn validate_reset_token(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ValidateResetTokenRequest>,
) -> Result<Json<ResetTokenValidity>, AppError> {
    let validity = state.auth.validate_reset_token(&dto.token).await?;
    Ok(Json(validity))
}
