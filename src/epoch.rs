//! Epoch Adjustment
//!
//! Trace identifiers carry their creation time, in Unix seconds, in the
//! first 4 bytes. Downstream consumers reject identifiers whose time is more
//! than 30 days old or in the future, so identifiers outside a conservative
//! window get a replacement epoch that every worker agrees on through the
//! [`Cache`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::{Error, Result};

/// Oldest accepted embedded epoch relative to now: 28 days, inside the
/// 30-day limit of trace consumers
pub const MAX_AGE_SECS: i64 = 60 * 60 * 24 * 28;

/// Accepted clock skew for epochs in the future: 5 minutes
pub const MAX_SKEW_SECS: i64 = 60 * 5;

/// Default bound on a single cache call made while adjusting
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(1);

const NANOS_PER_SEC: u64 = 1_000_000_000;

// == Trace Id ==
/// 128-bit trace identifier whose first 4 bytes are a big-endian epoch.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId([u8; 16]);

impl TraceId {
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Parses 32 hex digits.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidRequest(format!("invalid trace id {:?}: {}", s, e)))?;
        Ok(Self(bytes))
    }

    /// Lowercase hex, used as the cache key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The embedded epoch in Unix seconds.
    pub fn epoch(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Copy with the first 4 bytes replaced by `epoch`; the other 12 bytes
    /// are kept.
    pub fn with_epoch(&self, epoch: u32) -> Self {
        let mut bytes = self.0;
        bytes[..4].copy_from_slice(&epoch.to_be_bytes());
        Self(bytes)
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraceId({})", self.to_hex())
    }
}

// == Window ==
/// Whether an embedded epoch is acceptable at `now` (both Unix seconds).
pub fn is_within_window(epoch: i64, now: i64) -> bool {
    let delta = now - epoch;
    (-MAX_SKEW_SECS..=MAX_AGE_SECS).contains(&delta)
}

/// Replacement epoch proposed by this worker: the span start time when
/// present, otherwise `now`.
///
/// A start time past what 4 bytes can hold (after 2106-02-07) is treated as
/// missing.
pub fn candidate_epoch(start_time_unix_nano: u64, now: i64) -> u32 {
    let now = now.clamp(0, u32::MAX as i64) as u32;
    if start_time_unix_nano == 0 {
        return now;
    }

    u32::try_from(start_time_unix_nano / NANOS_PER_SEC).unwrap_or(now)
}

/// Fixed-width lowercase hex of an epoch, as stored in the cache.
pub fn encode_epoch(epoch: u32) -> String {
    format!("{:08x}", epoch)
}

/// Parses a cached epoch. Any hex width that fits in 32 bits is accepted.
pub fn decode_epoch(value: &str) -> Result<u32> {
    u32::from_str_radix(value, 16).map_err(|_| Error::Decode(value.to_string()))
}

// == Adjustment ==
/// What the adjuster did with one identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Embedded epoch was inside the window; identifier unchanged
    Accepted,
    /// Epoch replaced with the agreed value
    Corrected,
    /// Adjustment abandoned after a cache or decode failure; identifier unchanged
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adjustment {
    pub trace_id: TraceId,
    pub outcome: Outcome,
}

// == Epoch Adjuster ==
/// Rewrites out-of-window trace identifiers with an epoch agreed through a
/// shared [`Cache`].
///
/// Never fails: on any cache or decode error the original identifier is
/// returned with [`Outcome::Skipped`].
pub struct EpochAdjuster {
    cache: Option<Arc<dyn Cache>>,
    timeout: Duration,
}

impl EpochAdjuster {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self {
            cache: Some(cache),
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// Adjuster that uses its own candidate directly. Different workers may
    /// pick different epochs for one trace.
    pub fn without_cache() -> Self {
        warn!("epoch adjuster running without a cache; trace epochs are not coordinated across workers");
        Self {
            cache: None,
            timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// Bounds each cache call; a call that exceeds it counts as a failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn adjust(&self, trace_id: TraceId, start_time_unix_nano: u64) -> Adjustment {
        self.adjust_at(trace_id, start_time_unix_nano, chrono::Utc::now().timestamp())
            .await
    }

    /// [`EpochAdjuster::adjust`] against an explicit current time (Unix seconds).
    pub async fn adjust_at(
        &self,
        trace_id: TraceId,
        start_time_unix_nano: u64,
        now: i64,
    ) -> Adjustment {
        if is_within_window(trace_id.epoch() as i64, now) {
            return Adjustment {
                trace_id,
                outcome: Outcome::Accepted,
            };
        }

        let candidate = encode_epoch(candidate_epoch(start_time_unix_nano, now));

        match self.resolve(&trace_id, candidate).await {
            Ok(epoch) => {
                debug!(%trace_id, epoch, "trace epoch corrected");
                Adjustment {
                    trace_id: trace_id.with_epoch(epoch),
                    outcome: Outcome::Corrected,
                }
            }
            Err(err) => {
                warn!(%trace_id, error = %err, "skipping trace epoch adjustment");
                Adjustment {
                    trace_id,
                    outcome: Outcome::Skipped,
                }
            }
        }
    }

    async fn resolve(&self, trace_id: &TraceId, candidate: String) -> Result<u32> {
        let agreed = match &self.cache {
            Some(cache) => {
                let key = trace_id.to_hex();
                tokio::time::timeout(self.timeout, cache.get_or_set(&key, &candidate))
                    .await
                    .map_err(|_| {
                        Error::Transient(format!("get_or_set timed out after {:?}", self.timeout))
                    })??
            }
            None => candidate,
        };

        decode_epoch(&agreed)
    }
}
