//! Request DTOs for the HTTP host
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::epoch::TraceId;
use crate::error::Result;
use crate::processor::Span;

/// Largest batch accepted by a single adjust request
pub const MAX_BATCH_SPANS: usize = 10_000;

/// One span in an adjust request.
#[derive(Debug, Clone, Deserialize)]
pub struct SpanRequest {
    /// 32 hex digits
    pub trace_id: String,
    /// Declared start time in Unix nanoseconds; omitted or `0` when unknown
    #[serde(default)]
    pub start_time_unix_nano: u64,
}

/// Request body for POST /adjust
#[derive(Debug, Clone, Deserialize)]
pub struct AdjustRequest {
    pub spans: Vec<SpanRequest>,
}

impl AdjustRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.spans.is_empty() {
            return Some("Spans cannot be empty".to_string());
        }
        if self.spans.len() > MAX_BATCH_SPANS {
            return Some(format!(
                "Batch exceeds maximum of {} spans",
                MAX_BATCH_SPANS
            ));
        }
        None
    }

    /// Parses every trace id, failing on the first malformed one.
    pub fn to_spans(&self) -> Result<Vec<Span>> {
        self.spans
            .iter()
            .map(|s| {
                Ok(Span {
                    trace_id: TraceId::from_hex(&s.trace_id)?,
                    start_time_unix_nano: s.start_time_unix_nano,
                })
            })
            .collect()
    }
}
