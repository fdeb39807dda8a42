use campus_identity::config::AppConfig;
use campus_identity::logging::init_tracing;
use campus_identity::metrics::init_metrics;
use campus_identity::router::init_router;
use campus_identity::state::init_app_state;
use dotenvy::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let metrics = init_metrics(config.observability_enabled)?;
    let state = init_app_state(config, metrics).await?;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "Server running");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(listener, app).await?;
    Ok(())
}
