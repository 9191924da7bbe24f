//! API Module
//!
//! HTTP handlers and routing for the trace-epoch host.
//!
//! # Endpoints
//! - `POST /adjust` - Adjust trace ids of a batch of spans
//! - `GET /stats` - Adjustment counters
//! - `GET /health` - Cache health probe

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
