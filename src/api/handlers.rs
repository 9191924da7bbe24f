//! API Handlers
//!
//! HTTP request handlers for each host endpoint.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{AdjustRequest, AdjustResponse, HealthResponse, StatsResponse};
use crate::processor::TraceIdProcessor;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The processor and, through it, the cache
    pub processor: Arc<TraceIdProcessor>,
}

impl AppState {
    pub fn new(processor: TraceIdProcessor) -> Self {
        Self {
            processor: Arc::new(processor),
        }
    }
}

/// Handler for POST /adjust
///
/// Adjusts the trace id of each span and returns them in request order.
/// Cache failures show up as `skipped` outcomes, never as an error status.
pub async fn adjust_handler(
    State(state): State<AppState>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<AdjustResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(Error::InvalidRequest(error_msg));
    }

    let mut spans = req.to_spans()?;
    let outcomes = state.processor.process_spans(&mut spans).await;
    debug!(spans = spans.len(), "adjusted batch");

    Ok(Json(AdjustResponse::new(&spans, &outcomes)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.processor.stats()))
}

/// Handler for GET /health
///
/// Runs the cache health probe; 503 when the backend is unreachable.
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let processor = &state.processor;
    let cache = processor.cache_kind().as_str();
    let ttl = processor.cache_ttl();

    match processor.check_health().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse::healthy(cache, ttl))),
        Err(err) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::unhealthy(cache, ttl, err.to_string())),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::epoch::Outcome;
    use crate::models::SpanRequest;

    async fn started_state() -> AppState {
        let processor = TraceIdProcessor::new(&Config::default()).unwrap();
        processor.start().await.unwrap();
        AppState::new(processor)
    }

    #[tokio::test]
    async fn test_adjust_handler() {
        let state = started_state().await;

        let req = AdjustRequest {
            spans: vec![SpanRequest {
                trace_id: "58406520a006649127e371903a2de979".to_string(),
                start_time_unix_nano: 1_609_459_200_000_000_000,
            }],
        };
        let response = adjust_handler(State(state.clone()), Json(req)).await.unwrap();

        assert_eq!(response.spans[0].trace_id, "5fee6600a006649127e371903a2de979");
        assert_eq!(response.spans[0].outcome, Outcome::Corrected);
    }

    #[tokio::test]
    async fn test_adjust_handler_rejects_empty_batch() {
        let state = started_state().await;

        let result = adjust_handler(State(state), Json(AdjustRequest { spans: vec![] })).await;
        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = started_state().await;

        let response = stats_handler(State(state)).await;
        assert_eq!(response.counters.spans, 0);
        assert_eq!(response.skip_rate, 0.0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let state = started_state().await;

        let (status, response) = health_handler(State(state)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.status, "healthy");
        assert_eq!(response.cache, "local");
    }
}
