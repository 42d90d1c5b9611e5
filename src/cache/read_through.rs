//! Read-Through Coordination
//!
//! Glue between request handlers and the shared store: reads are served
//! from the cache or loaded and stored on a miss, writes drop whole
//! namespaces once they have committed.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{Namespace, SharedCache};
use crate::error::{AppError, Result};

// == Read Through ==
/// Returns the cached payload for `key`, or runs `load` and caches its
/// result under `namespace` with the default TTL.
///
/// A failing `load` leaves the cache untouched and its error is returned
/// as is. The lock is not held while `load` runs, so two concurrent misses
/// may both query; the later `set` wins.
pub async fn read_through<T, F, Fut>(
    cache: &SharedCache,
    namespace: Namespace,
    key: &str,
    load: F,
) -> Result<Value>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(hit) = cache.write().await.get(key) {
        debug!(key, "cache hit");
        return Ok(hit);
    }

    debug!(key, "cache miss");
    let loaded = load().await?;
    let value = serde_json::to_value(&loaded)
        .map_err(|e| AppError::Internal(format!("failed to serialize cached payload: {e}")))?;

    cache
        .write()
        .await
        .set_in(namespace, key, value.clone(), None);

    Ok(value)
}

// == Invalidate ==
/// Drops every entry in `namespace`. Call only after the write succeeded.
///
/// Never fails: the write has already committed, and stale entries are
/// bounded by their TTL anyway.
pub async fn invalidate(cache: &SharedCache, namespace: Namespace) -> usize {
    let removed = cache.write().await.invalidate(namespace);
    if removed > 0 {
        info!(%namespace, removed, "cache namespace invalidated");
    } else {
        debug!(%namespace, "cache namespace already empty");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn shared() -> SharedCache {
        Arc::new(RwLock::new(CacheStore::new(300)))
    }

    #[tokio::test]
    async fn test_miss_loads_and_stores() {
        let cache = shared();

        let value = read_through(&cache, Namespace::Vehicles, "vehicles:all", || async {
            Ok(vec![1, 2])
        })
        .await
        .unwrap();

        assert_eq!(value, json!([1, 2]));
        assert_eq!(cache.write().await.get("vehicles:all"), Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_hit_skips_loader() {
        let cache = shared();
        let calls = AtomicUsize::new(0);
        let calls_ref = &calls;

        for _ in 0..3 {
            let value = read_through(&cache, Namespace::Vehicles, "vehicles:all", || async move {
                calls_ref.fetch_add(1, Ordering::SeqCst);
                Ok("payload")
            })
            .await
            .unwrap();
            assert_eq!(value, json!("payload"));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache = shared();

        let result = read_through::<Vec<u32>, _, _>(
            &cache,
            Namespace::Vehicles,
            "vehicles:all",
            || async { Err(AppError::Internal("query failed".into())) },
        )
        .await;

        assert!(matches!(result, Err(AppError::Internal(msg)) if msg == "query failed"));
        assert!(cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalidate_clears_namespace() {
        let cache = shared();
        read_through(&cache, Namespace::Vehicles, "vehicles:all", || async { Ok(1) })
            .await
            .unwrap();
        read_through(&cache, Namespace::Lookups, "lookups:colors", || async { Ok(2) })
            .await
            .unwrap();

        assert_eq!(invalidate(&cache, Namespace::Vehicles).await, 1);
        assert_eq!(invalidate(&cache, Namespace::Vehicles).await, 0);
        assert_eq!(cache.read().await.len(), 1);
    }
}
