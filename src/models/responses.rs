//! Response DTOs for the HTTP host
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::epoch::Outcome;
use crate::processor::Span;
use crate::stats::StatsSnapshot;

/// One span in an adjust response.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustedSpan {
    /// Trace id after adjustment, 32 hex digits
    pub trace_id: String,
    pub outcome: Outcome,
}

/// Response body for POST /adjust, in request order
#[derive(Debug, Clone, Serialize)]
pub struct AdjustResponse {
    pub spans: Vec<AdjustedSpan>,
}

impl AdjustResponse {
    pub fn new(spans: &[Span], outcomes: &[Outcome]) -> Self {
        Self {
            spans: spans
                .iter()
                .zip(outcomes)
                .map(|(span, outcome)| AdjustedSpan {
                    trace_id: span.trace_id.to_hex(),
                    outcome: *outcome,
                })
                .collect(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    /// skipped / (corrected + skipped)
    pub skip_rate: f64,
}

impl StatsResponse {
    pub fn new(counters: StatsSnapshot) -> Self {
        Self {
            skip_rate: counters.skip_rate(),
            counters,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// Backend in use
    pub cache: String,
    /// Effective cache TTL in seconds
    pub ttl: u64,
    /// Probe failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy(cache: &str, ttl: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            cache: cache.to_string(),
            ttl,
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn unhealthy(cache: &str, ttl: u64, error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            error: Some(error.into()),
            ..Self::healthy(cache, ttl)
        }
    }
}
