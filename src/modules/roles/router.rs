use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::{create_permission, create_role, grant_permissions, list_roles};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_role).get(list_roles))
        .route("/{id}/permissions", post(grant_permissions))
}

pub fn init_permissions_router() -> Router<AppState> {
    Router::new().route("/", post(create_permission))
}
