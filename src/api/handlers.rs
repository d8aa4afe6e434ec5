//! HTTP handlers

use super::models::{form_to_json, parse_urls, ApiError, HealthResponse, SummaryResponse, INVALID_URLS};
use crate::error::SummarizeError;
use crate::metrics::METRICS;
use crate::summarize::MapReduceController;
use axum::{
    extract::{FromRequest, Request, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Shared state for the API
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<MapReduceController>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn error_response(err: &SummarizeError) -> (StatusCode, Json<ApiError>) {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiError::new(err.to_string())))
}

/// Decode a JSON or form encoded body into its JSON shape
async fn read_body(request: Request, state: &AppState) -> Result<Value, (StatusCode, Json<ApiError>)> {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

    let body = if is_form {
        Form::<Vec<(String, String)>>::from_request(request, state)
            .await
            .map(|Form(pairs)| form_to_json(&pairs))
            .map_err(|rejection| rejection.to_string())
    } else {
        Json::<Value>::from_request(request, state)
            .await
            .map(|Json(body)| body)
            .map_err(|rejection| rejection.to_string())
    };

    body.map_err(|error| {
        warn!(%error, "Rejected request body");
        (StatusCode::BAD_REQUEST, Json(ApiError::new(INVALID_URLS)))
    })
}

/// Summarize a list of pages
///
/// POST /summarizer with `{"urls": [...]}` as JSON, or `urls[]=...` form fields
pub async fn summarize(State(state): State<AppState>, request: Request) -> ApiResult<SummaryResponse> {
    let body = read_body(request, &state).await?;

    let urls = parse_urls(&body).map_err(|e| {
        warn!(error = %e, "Invalid summarization request");
        error_response(&e)
    })?;

    let span = info_span!("summarize", request_id = %Uuid::new_v4(), urls = urls.len());
    let start = Instant::now();

    async move {
        info!("URLs received, starting the summarizing process");

        match state.controller.run(&urls).await {
            Ok(outcome) => {
                METRICS.record_request(true, start.elapsed().as_secs_f64());
                info!(
                    iterations = outcome.iterations,
                    reduce_calls = outcome.reduce_calls,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Summary generated"
                );
                debug!(summary = %outcome.summary, "Summary text");
                Ok(Json(SummaryResponse {
                    summary: outcome.summary,
                }))
            }
            Err(e) => {
                METRICS.record_request(false, start.elapsed().as_secs_f64());
                error!(kind = e.kind(), error = %e, "Summarization failed");
                Err(error_response(&e))
            }
        }
    }
    .instrument(span)
    .await
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let (status, body) = error_response(&SummarizeError::Validation(INVALID_URLS.to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, INVALID_URLS);

        let (status, body) = error_response(&SummarizeError::Model("quota exceeded".to_string()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Model invocation failed: quota exceeded");
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
    }
}
