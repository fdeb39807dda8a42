use crate::state::AppState;
use axum::{Router, routing::post};

use super::controller::{forgot_password, reset_password, signin, signup, validate_reset_token};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/reset-password/validate", post(validate_reset_token))
}
