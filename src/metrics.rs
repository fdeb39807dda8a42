//! Prometheus metrics.
//!
//! When observability is disabled no recorder is installed and every macro
//! below is a no-op.

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{Unit, counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::{Duration, Instant};

const REQUEST_DURATION: &str = "http_request_duration_seconds";
const REQUESTS_TOTAL: &str = "http_requests_total";
const REQUESTS_ACTIVE: &str = "http_requests_active";
const ACCOUNTS_CREATED: &str = "accounts_created_total";
const SIGNINS: &str = "signins_total";
const RESETS_ISSUED: &str = "password_reset_tokens_issued_total";
const RESETS_REDEEMED: &str = "password_reset_redemptions_total";

/// Latency buckets in seconds. Sign-in and reset spend most of their time in
/// bcrypt, hence the long tail.
const DURATION_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `Ok(None)` when `enabled` is false.
pub fn init_metrics(enabled: bool) -> Result<Option<PrometheusHandle>, BuildError> {
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_DURATION.to_string()), DURATION_BUCKETS)?
        .install_recorder()?;

    describe_metrics();

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        loop {
            interval.tick().await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

fn describe_metrics() {
    describe_histogram!(REQUEST_DURATION, Unit::Seconds, "HTTP request latency");
    describe_counter!(REQUESTS_TOTAL, "HTTP requests by method, route and status");
    describe_gauge!(REQUESTS_ACTIVE, "HTTP requests in flight");
    describe_counter!(ACCOUNTS_CREATED, "Accounts created through sign-up");
    describe_counter!(SIGNINS, "Sign-in attempts by outcome");
    describe_counter!(RESETS_ISSUED, "Password reset tokens issued");
    describe_counter!(RESETS_REDEEMED, "Password reset redemptions by outcome");
}

/// Records request count, latency and in-flight requests, labelled by the
/// matched route so path parameters don't explode cardinality.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let route = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    };

    let active = gauge!(REQUESTS_ACTIVE);
    active.increment(1.0);
    let response = next.run(req).await;
    active.decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(REQUESTS_TOTAL, "method" => method.clone(), "route" => route.clone(), "status" => status)
        .increment(1);
    histogram!(REQUEST_DURATION, "method" => method, "route" => route)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Router exposing the Prometheus scrape endpoint.
pub fn metrics_router<S>(handle: PrometheusHandle) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

pub fn track_account_created() {
    counter!(ACCOUNTS_CREATED).increment(1);
}

/// `outcome` is `"success"` or an error kind such as `"invalid_credentials"`.
pub fn track_signin(outcome: &'static str) {
    counter!(SIGNINS, "outcome" => outcome).increment(1);
}

pub fn track_reset_issued() {
    counter!(RESETS_ISSUED).increment(1);
}

pub fn track_reset_redeemed(outcome: &'static str) {
    counter!(RESETS_REDEEMED, "outcome" => outcome).increment(1);
}
