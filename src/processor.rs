//! Trace Id Processor
//!
//! Owns one cache and one epoch adjuster, and runs the adjuster over
//! batches of spans. The cache lives exactly as long as the processor's
//! start/shutdown cycle.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::info;

use crate::cache::{new_provider, Cache, CacheKind};
use crate::config::Config;
use crate::epoch::{EpochAdjuster, Outcome, TraceId};
use crate::error::{Error, Result};
use crate::stats::{ProcessorStats, StatsSnapshot};

/// The parts of a span the processor reads and rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub trace_id: TraceId,
    /// Declared start time in Unix nanoseconds, `0` when absent
    pub start_time_unix_nano: u64,
}

pub struct TraceIdProcessor {
    cache: Arc<dyn Cache>,
    adjuster: EpochAdjuster,
    stats: ProcessorStats,
    timeout: Duration,
}

impl TraceIdProcessor {
    /// Builds the processor and its cache from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        info!(endpoint = %config.cache_endpoint, "building trace id processor");

        if config.cache_endpoint.is_empty() {
            return Err(Error::Configuration(
                "invalid cache endpoint: the cache endpoint property is empty".to_string(),
            ));
        }

        let provider = new_provider();
        let cache = provider(&config.cache_endpoint, config.cache_ttl)?;

        Ok(Self::with_cache(
            cache,
            Duration::from_millis(config.cache_timeout_ms),
        ))
    }

    /// Builds the processor around an existing cache.
    pub fn with_cache(cache: Arc<dyn Cache>, timeout: Duration) -> Self {
        Self {
            adjuster: EpochAdjuster::new(cache.clone()).with_timeout(timeout),
            cache,
            stats: ProcessorStats::new(),
            timeout,
        }
    }

    pub async fn start(&self) -> Result<()> {
        tokio::time::timeout(self.timeout, self.cache.start())
            .await
            .map_err(|_| {
                Error::Connectivity(format!("cache start timed out after {:?}", self.timeout))
            })?
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.cache.stop().await
    }

    /// Runs the cache health probe, bounded by the cache timeout.
    pub async fn check_health(&self) -> Result<()> {
        let probe = self.cache.health();
        tokio::time::timeout(self.timeout, probe())
            .await
            .map_err(|_| {
                Error::Connectivity(format!("cache health timed out after {:?}", self.timeout))
            })?
    }

    /// Adjusts the trace id of every span in place.
    ///
    /// Spans are adjusted concurrently. Cache failures leave the affected
    /// span unchanged and never fail the batch.
    pub async fn process_spans(&self, spans: &mut [Span]) -> Vec<Outcome> {
        let adjustments = join_all(
            spans
                .iter()
                .map(|span| self.adjuster.adjust(span.trace_id, span.start_time_unix_nano)),
        )
        .await;

        spans
            .iter_mut()
            .zip(adjustments)
            .map(|(span, adjustment)| {
                self.stats.record(adjustment.outcome);
                span.trace_id = adjustment.trace_id;
                adjustment.outcome
            })
            .collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Effective cache TTL in seconds.
    pub fn cache_ttl(&self) -> u64 {
        self.cache.ttl()
    }

    pub fn cache_kind(&self) -> CacheKind {
        self.cache.kind()
    }
}
