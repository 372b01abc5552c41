//! Read-through cache for the "available products" listing.
//!
//! One snapshot is kept per listing filter (unfiltered, and per category)
//! using `moka` with a fixed time-to-live. Mutations invalidate eagerly;
//! the TTL is a backstop so a missed invalidation can never serve stale
//! data beyond the staleness window.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use catalog_core::CategoryId;

use crate::db::RepositoryError;
use crate::models::Product;

/// Cache key: one entry per listing filter.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ListingKey {
    /// The unfiltered customer listing.
    All,
    /// Listing restricted to one category.
    Category(CategoryId),
}

impl From<Option<CategoryId>> for ListingKey {
    fn from(category: Option<CategoryId>) -> Self {
        category.map_or(Self::All, Self::Category)
    }
}

/// Cached snapshots of active catalog entries, keyed by listing filter.
///
/// Safe for concurrent use: simultaneous misses for the same key coalesce
/// into one load, and racing repopulations are idempotent (last write wins
/// over identical data). No lock is exposed to callers.
#[derive(Clone)]
pub struct CatalogCache {
    listings: Cache<ListingKey, Arc<Vec<Product>>>,
}

impl CatalogCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let listings = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self { listings }
    }

    /// Get the listing for `key`, loading from persistence on miss or expiry.
    ///
    /// If the coalesced load fails, the read falls back to one direct
    /// persistence query for this request only, leaving the cache empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the fallback query also fails.
    pub async fn get_or_load<F, Fut>(
        &self,
        key: ListingKey,
        loader: F,
    ) -> Result<Arc<Vec<Product>>, RepositoryError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Vec<Product>, RepositoryError>>,
    {
        let result = self
            .listings
            .try_get_with(key, async { loader().await.map(Arc::new) })
            .await;

        match result {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(error = %e, ?key, "listing cache load failed, querying directly");
                loader().await.map(Arc::new)
            }
        }
    }

    /// Drop one cached listing. No-op when nothing is cached for `key`.
    pub async fn invalidate(&self, key: ListingKey) {
        self.listings.invalidate(&key).await;
    }

    /// Drop every cached listing.
    ///
    /// Called after any successful mutation: a new or changed entry can
    /// affect the unfiltered view and any category view, so invalidation is
    /// unconditional rather than targeted.
    pub async fn invalidate_all(&self) {
        self.listings.invalidate_all();
        // Make the drop visible to reads issued after this call returns.
        self.listings.run_pending_tasks().await;
        debug!("listing cache invalidated");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use rust_decimal::Decimal;

    use catalog_core::{ProductId, Sku, UserId};

    use super::*;

    fn product(id: i32, name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            sku: Sku::parse("TEST0001").unwrap(),
            quantity: 10,
            price: Decimal::new(2999, 2),
            owner_id: UserId::new(1),
            category_id: CategoryId::new(2),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_hit_skips_loader() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let loads = AtomicUsize::new(0);

        let loader = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![product(1, "Mouse")])
        };

        let first = cache.get_or_load(ListingKey::All, loader).await.unwrap();
        let second = cache.get_or_load(ListingKey::All, loader).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let loads = AtomicUsize::new(0);

        let loader = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        };

        cache.get_or_load(ListingKey::All, loader).await.unwrap();
        cache
            .get_or_load(ListingKey::Category(CategoryId::new(2)), loader)
            .await
            .unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_single_key() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let loads = AtomicUsize::new(0);

        let loader = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        };

        let all = ListingKey::All;
        let cat = ListingKey::Category(CategoryId::new(2));

        cache.get_or_load(all, loader).await.unwrap();
        cache.get_or_load(cat, loader).await.unwrap();
        cache.invalidate(cat).await;

        cache.get_or_load(all, loader).await.unwrap(); // still cached
        cache.get_or_load(cat, loader).await.unwrap(); // reloaded

        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalidate_all_forces_reload() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let version = AtomicUsize::new(0);

        let loader = || async {
            let v = version.fetch_add(1, Ordering::SeqCst);
            Ok(vec![product(i32::try_from(v).unwrap(), "Mouse")])
        };

        let before = cache.get_or_load(ListingKey::All, loader).await.unwrap();
        cache.invalidate_all().await;
        let after = cache.get_or_load(ListingKey::All, loader).await.unwrap();

        assert_ne!(
            before.first().unwrap().id,
            after.first().unwrap().id,
            "read after invalidation must observe a fresh load"
        );
    }

    #[tokio::test]
    async fn test_invalidate_empty_cache_is_noop() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        cache.invalidate(ListingKey::All).await;
        cache.invalidate_all().await;
    }

    #[tokio::test]
    async fn test_ttl_expiry_forces_reload() {
        let cache = CatalogCache::new(Duration::from_millis(50));
        let loads = AtomicUsize::new(0);

        let loader = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        };

        cache.get_or_load(ListingKey::All, loader).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        cache.get_or_load(ListingKey::All, loader).await.unwrap();

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_falls_back_to_direct_query() {
        let cache = CatalogCache::new(Duration::from_secs(300));
        let calls = AtomicUsize::new(0);

        // First call (inside the cache) fails; the direct fallback succeeds.
        let loader = || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(RepositoryError::DataCorruption("boom".to_owned()))
            } else {
                Ok(vec![product(1, "Mouse")])
            }
        };

        let entries = cache.get_or_load(ListingKey::All, loader).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
