//! Request and Response models for the HTTP host
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{AdjustRequest, SpanRequest, MAX_BATCH_SPANS};
pub use responses::{AdjustResponse, AdjustedSpan, HealthResponse, StatsResponse};
