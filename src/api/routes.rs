//! Router construction

use super::handlers::{self, AppState};
use crate::config::ServerConfig;
use crate::error::{Result, SummarizeError};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// - POST /summarizer
/// - GET /health
/// - GET /metrics
pub fn build_router(state: AppState, server: &ServerConfig) -> Result<Router> {
    let cors = cors_layer(&server.cors_origins)?;

    Ok(Router::new()
        .route("/summarizer", post(handlers::summarize))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(server.max_body_bytes))
                .layer(cors),
        )
        .with_state(state))
}

/// `*` allows any origin; otherwise a comma separated list of origins
fn cors_layer(origins: &str) -> Result<CorsLayer> {
    let allow_origin = if origins.trim() == "*" {
        AllowOrigin::from(Any)
    } else {
        let list = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| SummarizeError::Config(format!("Invalid CORS origin {}: {}", o, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(list)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}
