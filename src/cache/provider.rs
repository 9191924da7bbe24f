//! Cache Provider
//!
//! Picks a backend from the scheme of the configured endpoint.

use std::sync::Arc;

use url::Url;

use crate::cache::{Cache, LocalCache, RemoteCache};
use crate::error::{Error, Result};

/// Builds a [`Cache`] from an endpoint URI and a TTL in seconds.
pub type Provider = fn(&str, i64) -> Result<Arc<dyn Cache>>;

/// Returns the provider that dispatches on endpoint scheme.
pub fn new_provider() -> Provider {
    build_cache
}

/// Constructs the backend selected by `endpoint`'s scheme.
///
/// - `local://` builds a [`LocalCache`]
/// - `redis://host:port[/db]` builds a [`RemoteCache`]
///
/// Any other scheme is a configuration error naming the scheme.
pub fn build_cache(endpoint: &str, ttl: i64) -> Result<Arc<dyn Cache>> {
    let url = Url::parse(endpoint)?;

    match url.scheme() {
        "redis" => Ok(Arc::new(RemoteCache::new(endpoint, ttl)?)),
        "local" => Ok(Arc::new(LocalCache::new(endpoint, ttl)?)),
        scheme => Err(Error::Configuration(format!(
            "Unknown cache provider scheme: {:?}",
            scheme
        ))),
    }
}
