use crate::state::AppState;
use axum::{
    Router,
    routing::{get, patch, post},
};

use super::controller::{assign_role, delete_user, get_me, get_user, update_status};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/roles", post(assign_role))
}
