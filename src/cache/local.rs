//! Local Cache Backend
//!
//! Single-process [`Cache`] built on [`LocalStore`]. Provides no agreement
//! across processes; meant for single-instance deployments and tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use url::Url;

use crate::cache::{normalize_ttl, Cache, CacheKind, HealthProbe, LocalStore};
use crate::error::{Error, Result};
use crate::tasks::spawn_sweep_task;

/// Default interval between background sweeps of expired entries
pub const DEFAULT_SWEEP_INTERVAL: u64 = 10 * 60;

// == Local Cache ==
/// In-memory set-once cache with per-entry TTL.
///
/// Every call takes the store lock for the whole lookup-or-insert, which is
/// what makes [`Cache::get_or_set`] set-once within the process.
#[derive(Debug)]
pub struct LocalCache {
    ttl: u64,
    /// Seconds between sweeps, `0` for lazy eviction only
    sweep_interval: u64,
    store: Arc<Mutex<LocalStore>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl LocalCache {
    // == Constructor ==
    /// Creates a local cache for a `local://` endpoint.
    ///
    /// The optional `sweep_interval` query parameter sets the background
    /// sweep period in seconds (`local://?sweep_interval=60`).
    pub fn new(endpoint: &str, ttl: i64) -> Result<Self> {
        let ttl = normalize_ttl(ttl);
        let sweep_interval = parse_sweep_interval(endpoint)?;

        Ok(Self {
            ttl,
            sweep_interval,
            store: Arc::new(Mutex::new(LocalStore::new(ttl))),
            sweeper: Mutex::new(None),
        })
    }

    /// Seconds between background sweeps.
    pub fn sweep_interval(&self) -> u64 {
        self.sweep_interval
    }

    /// Removes expired entries now. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.lock().await.purge_expired()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }
}

#[async_trait]
impl Cache for LocalCache {
    async fn start(&self) -> Result<()> {
        self.store.lock().await.clear();

        let mut sweeper = self.sweeper.lock().await;
        if self.sweep_interval > 0 && sweeper.is_none() {
            *sweeper = Some(spawn_sweep_task(self.store.clone(), self.sweep_interval));
        }

        info!(ttl = self.ttl, sweep_interval = self.sweep_interval, "local cache started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        if let Some(handle) = self.sweeper.lock().await.take() {
            handle.abort();
        }
        self.store.lock().await.clear();

        info!("local cache stopped");
        Ok(())
    }

    async fn get_or_set(&self, key: &str, value: &str) -> Result<String> {
        let stored = self.store.lock().await.get_or_set(key, value.to_string());
        debug!(key, stored = %stored, "local get_or_set");
        Ok(stored)
    }

    async fn delete(&self, key: &str) {
        self.store.lock().await.delete(key);
    }

    fn health(&self) -> HealthProbe {
        Box::new(|| async { Ok::<(), Error>(()) }.boxed())
    }

    fn ttl(&self) -> u64 {
        self.ttl
    }

    fn kind(&self) -> CacheKind {
        CacheKind::Local
    }
}

fn parse_sweep_interval(endpoint: &str) -> Result<u64> {
    let url = Url::parse(endpoint)?;

    match url.query_pairs().find(|(k, _)| k == "sweep_interval") {
        Some((_, v)) => v.parse().map_err(|_| {
            Error::Configuration(format!("invalid sweep_interval {:?} in {:?}", v, endpoint))
        }),
        None => Ok(DEFAULT_SWEEP_INTERVAL),
    }
}
