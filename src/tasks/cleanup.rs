//! TTL Sweep Task
//!
//! Background task that periodically removes expired local cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::LocalStore;

/// Spawns a background task that periodically purges expired entries.
///
/// The task loops forever, sleeping `sweep_interval_secs` between runs and
/// taking the store lock only for the purge itself. Abort the returned
/// handle to stop it.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(LocalStore::new(604800)));
/// let sweeper = spawn_sweep_task(store.clone(), 600);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_sweep_task(store: Arc<Mutex<LocalStore>>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting TTL sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = store.lock().await.purge_expired();

            if removed > 0 {
                info!("TTL sweep: removed {} expired entries", removed);
            } else {
                debug!("TTL sweep: no expired entries found");
            }
        }
    })
}
