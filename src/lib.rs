//! Trace Epoch - trace-epoch correlation for distributed span processing
//!
//! Workers that see spans of the same trace agree, through a shared
//! set-once cache, on the epoch embedded in the trace id whenever the
//! original one falls outside the accepted time window.

pub mod api;
pub mod cache;
pub mod config;
pub mod epoch;
pub mod error;
pub mod models;
pub mod processor;
pub mod stats;
pub mod tasks;

pub use api::AppState;
pub use cache::{new_provider, Cache, CacheKind};
pub use config::Config;
pub use epoch::{EpochAdjuster, Outcome, TraceId};
pub use error::{Error, Result};
pub use processor::{Span, TraceIdProcessor};
