//! Cache Module
//!
//! Set-once key/value agreement used to correlate trace epochs across
//! workers. Two backends implement [`Cache`]: an in-process [`LocalCache`]
//! and a Redis-backed [`RemoteCache`]. Backends are chosen by endpoint
//! scheme through [`new_provider`].

mod entry;
mod local;
mod provider;
mod remote;
mod store;

#[cfg(test)]
mod property_tests;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub use local::LocalCache;
pub use provider::{build_cache, new_provider, Provider};
pub use remote::RemoteCache;
pub use store::LocalStore;

// == Public Constants ==
/// TTL in seconds used when a non-positive TTL is configured (7 days)
pub const DEFAULT_TTL: u64 = 7 * 24 * 60 * 60;

/// Replaces a non-positive TTL with [`DEFAULT_TTL`].
pub fn normalize_ttl(ttl: i64) -> u64 {
    if ttl <= 0 {
        DEFAULT_TTL
    } else {
        ttl as u64
    }
}

/// Zero-argument reachability check returned by [`Cache::health`].
pub type HealthProbe = Box<dyn Fn() -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Which backend a [`Cache`] instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Local,
    Remote,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Local => "local",
            CacheKind::Remote => "redis",
        }
    }
}

// == Cache Trait ==
/// Set-once-get store shared by every worker that processes spans of the
/// same trace.
///
/// Keys and values are opaque strings. Once a value is installed for a key it
/// is returned unchanged to every caller until the entry expires or is
/// deleted.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Acquires connections or other resources. Call once before use.
    async fn start(&self) -> Result<()>;

    /// Releases resources. The instance must not be reused afterwards.
    async fn stop(&self) -> Result<()>;

    /// Returns the value stored under `key`, installing `value` first if
    /// there is none. Concurrent callers for one key all observe the value of
    /// whichever call installed it.
    async fn get_or_set(&self, key: &str, value: &str) -> Result<String>;

    /// Removes any entry for `key`. A missing key is not an error.
    async fn delete(&self, key: &str);

    /// Returns a probe reporting whether the backend is reachable.
    fn health(&self) -> HealthProbe;

    /// Effective TTL in seconds.
    fn ttl(&self) -> u64;

    fn kind(&self) -> CacheKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl_is_seven_days() {
        assert_eq!(DEFAULT_TTL, 604_800);
    }

    #[test]
    fn test_normalize_ttl() {
        assert_eq!(normalize_ttl(0), DEFAULT_TTL);
        assert_eq!(normalize_ttl(-5), DEFAULT_TTL);
        assert_eq!(normalize_ttl(1), 1);
        assert_eq!(normalize_ttl(86_400), 86_400);
    }
}
