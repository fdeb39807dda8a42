use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::{Json, Router, middleware};
use campus_config::CorsConfig;
use serde_json::{Value, json};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::{REQUEST_ID_HEADER, logging_middleware};
use crate::metrics::{metrics_middleware, metrics_router};
use crate::modules::auth::router::init_auth_router;
use crate::modules::health::router::init_health_router;
use crate::modules::roles::router::{init_permissions_router, init_roles_router};
use crate::modules::users::router::init_users_router;
use crate::state::AppState;

/// Builds the full application: API under `/api`, docs, health and, when a
/// recorder is installed, `/metrics`.
pub fn init_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_config);

    let mut router = Router::new()
        .merge(docs_router())
        .merge(init_health_router())
        .nest("/api", api_router())
        .fallback(not_found);

    if let Some(handle) = state.metrics.clone() {
        router = router.merge(metrics_router(handle));
    }

    router
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", init_auth_router())
        .nest("/users", init_users_router())
        .nest("/roles", init_roles_router())
        .nest("/permissions", init_permissions_router())
}

fn docs_router() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Resource not found" })),
    )
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([REQUEST_ID_HEADER.clone()])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}
