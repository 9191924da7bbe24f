//! Remote Cache Backend
//!
//! [`Cache`] shared by every instance through Redis. The set-once step runs
//! as a Lua script so the read and the conditional write are atomic on the
//! server.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use redis::aio::MultiplexedConnection;
use redis::{ErrorKind, RedisError, RedisResult};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{normalize_ttl, Cache, CacheKind, HealthProbe};
use crate::error::{Error, Result};

/// Returns the get-or-set script body for a given TTL.
///
/// KEYS[1] is the trace key, ARGV[1] the candidate value.
pub fn script_body(ttl: u64) -> String {
    format!(
        r#"
local val = redis.call("get", KEYS[1])
if (val == false) then
  redis.call('setex', KEYS[1], {ttl}, ARGV[1])
  return ARGV[1]
end
return val
"#
    )
}

/// Whether `err` means the server does not know the script SHA.
pub fn is_script_miss(err: &RedisError) -> bool {
    err.kind() == ErrorKind::NoScriptError
}

/// Runs `by_sha`, retrying once through `by_body` if the server reports the
/// script as unknown. Any other outcome is returned unchanged.
pub async fn eval_with_fallback<T, F, FFut, B, BFut>(by_sha: F, by_body: B) -> RedisResult<T>
where
    F: FnOnce() -> FFut,
    FFut: Future<Output = RedisResult<T>>,
    B: FnOnce() -> BFut,
    BFut: Future<Output = RedisResult<T>>,
{
    match by_sha().await {
        Err(err) if is_script_miss(&err) => {
            debug!("script not loaded on server, falling back to EVAL");
            by_body().await
        }
        other => other,
    }
}

// == Remote Cache ==
/// Redis-backed set-once cache.
pub struct RemoteCache {
    endpoint: String,
    ttl: u64,
    /// Script body with the TTL baked in
    script: String,
    /// SHA1 of `script`, used with EVALSHA
    script_sha: String,
    conn: Arc<RwLock<Option<MultiplexedConnection>>>,
}

impl RemoteCache {
    // == Constructor ==
    /// Prepares a cache for a `redis://` endpoint. No connection is opened
    /// until [`Cache::start`].
    pub fn new(endpoint: &str, ttl: i64) -> Result<Self> {
        let ttl = normalize_ttl(ttl);
        let script = script_body(ttl);
        let script_sha = redis::Script::new(&script).get_hash().to_string();

        Ok(Self {
            endpoint: endpoint.to_string(),
            ttl,
            script,
            script_sha,
            conn: Arc::new(RwLock::new(None)),
        })
    }

    /// The script body sent on a script miss.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// SHA1 identifier of [`RemoteCache::script`].
    pub fn script_sha(&self) -> &str {
        &self.script_sha
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.conn
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::Connectivity("redis cache is not started".to_string()))
    }
}

async fn eval_sha(
    mut conn: MultiplexedConnection,
    sha: &str,
    key: &str,
    value: &str,
) -> RedisResult<String> {
    redis::cmd("EVALSHA")
        .arg(sha)
        .arg(1)
        .arg(key)
        .arg(value)
        .query_async(&mut conn)
        .await
}

async fn eval_body(
    mut conn: MultiplexedConnection,
    body: &str,
    key: &str,
    value: &str,
) -> RedisResult<String> {
    redis::cmd("EVAL")
        .arg(body)
        .arg(1)
        .arg(key)
        .arg(value)
        .query_async(&mut conn)
        .await
}

#[async_trait]
impl Cache for RemoteCache {
    async fn start(&self) -> Result<()> {
        let client = redis::Client::open(self.endpoint.as_str())
            .map_err(|e| Error::Configuration(format!("[redis.ParseURL]: {}", e)))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::Connectivity(format!("[redis.Connect]: {}", e)))?;

        *self.conn.write().await = Some(conn);

        info!(ttl = self.ttl, script_sha = %self.script_sha, "redis cache started");
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        // Dropping the last handle closes the multiplexed connection
        self.conn.write().await.take();

        info!("redis cache stopped");
        Ok(())
    }

    async fn get_or_set(&self, key: &str, value: &str) -> Result<String> {
        let conn = self.connection().await?;

        let stored = eval_with_fallback(
            || eval_sha(conn.clone(), &self.script_sha, key, value),
            || eval_body(conn.clone(), &self.script, key, value),
        )
        .await?;

        Ok(stored)
    }

    async fn delete(&self, key: &str) {
        let mut conn = match self.connection().await {
            Ok(conn) => conn,
            Err(err) => {
                warn!(key, error = %err, "redis delete skipped");
                return;
            }
        };

        let deleted: RedisResult<()> = redis::cmd("DEL").arg(key).query_async(&mut conn).await;
        if let Err(err) = deleted {
            warn!(key, error = %err, "redis delete failed");
        }
    }

    fn health(&self) -> HealthProbe {
        let conn = self.conn.clone();

        Box::new(move || {
            let conn = conn.clone();
            async move {
                let mut conn = conn
                    .read()
                    .await
                    .clone()
                    .ok_or_else(|| Error::Connectivity("[redis.Ping]: not started".to_string()))?;

                let _: String = redis::cmd("PING")
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| Error::Connectivity(format!("[redis.Ping]: {}", e)))?;

                Ok::<(), Error>(())
            }
            .boxed()
        })
    }

    fn ttl(&self) -> u64 {
        self.ttl
    }

    fn kind(&self) -> CacheKind {
        CacheKind::Remote
    }
}
