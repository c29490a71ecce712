//! Cache-flush collaborator, invoked once after a successful restore.
//!
//! A restored database invalidates whatever a cache layer derived from the
//! old one. Flushing is best-effort; the caller decides whether a failure
//! is fatal (it never is for migration logic).

use crate::error::{DbError, DbResult};

/// Flush every key in the Redis database at `url`, returning how many
/// keys were dropped.
///
/// Accepts bare `host:port` values and prefixes the `redis://` scheme.
pub fn flush_redis(url: &str) -> DbResult<usize> {
    let url = if url.contains("://") {
        url.to_string()
    } else {
        format!("redis://{}", url)
    };

    let client =
        redis::Client::open(url.as_str()).map_err(|e| DbError::CacheError(e.to_string()))?;
    let mut conn = client
        .get_connection()
        .map_err(|e| DbError::CacheError(e.to_string()))?;

    let keys: usize = redis::cmd("DBSIZE")
        .query(&mut conn)
        .map_err(|e| DbError::CacheError(e.to_string()))?;
    redis::cmd("FLUSHDB")
        .query::<()>(&mut conn)
        .map_err(|e| DbError::CacheError(e.to_string()))?;

    log::info!("flushed {} keys from redis", keys);
    Ok(keys)
}
