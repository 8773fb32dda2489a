//! # qazid-api — Axum HTTP Service for the QazID Registry
//!
//! A small registry of person records keyed by IIN. The validator in
//! `qazid-core` gates every write; the HTTP layer here is routing, request
//! binding, persistence, and error-to-HTTP mapping.
//!
//! ## API Surface
//!
//! | Prefix              | Module              | Purpose                     |
//! |---------------------|---------------------|-----------------------------|
//! | `/v1/iin/*`         | [`routes::iin`]     | Standalone IIN validation   |
//! | `/v1/people/*`      | [`routes::people`]  | Person records and search   |
//! | `/health/*`         | (this module)       | Probes and counters         |
//! | `/openapi.json`     | [`openapi`]         | Generated OpenAPI 3 spec    |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! Health probes are mounted outside the metrics middleware so scrapes and
//! orchestrator probes do not inflate the request counters.

pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();

    let api = Router::new()
        .merge(routes::iin::router())
        .merge(routes::people::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(metrics.clone()))
        .with_state(state);

    // Probes and counters, outside the metrics middleware.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .route(
            "/health/metrics",
            axum::routing::get(middleware::metrics::metrics_snapshot),
        )
        .layer(axum::Extension(metrics));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
