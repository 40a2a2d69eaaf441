// Session-scoped catalog snapshot over any supplier
//
// The catalog is immutable input to the engine, so one fetched snapshot is shared
// by every filter and pricing call until it expires or is invalidated.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::model::AccommodationUnit;
use crate::supplier::{CatalogSupplier, SupplierError};

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub refresh_count: AtomicUsize,
    pub failed_refresh_count: AtomicUsize,
    pub invalidation_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub hit_count: usize,
    pub miss_count: usize,
    pub refresh_count: usize,
    pub failed_refresh_count: usize,
    pub invalidation_count: usize,
    pub units_cached: usize,
}

struct Snapshot {
    units: Arc<[AccommodationUnit]>,
    loaded_at: Instant,
}

impl Snapshot {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        ttl.is_some_and(|ttl| self.loaded_at.elapsed() > ttl)
    }
}

pub struct CachedCatalog<S> {
    supplier: S,
    // None keeps the snapshot for the whole session
    ttl: Option<Duration>,
    snapshot: RwLock<Option<Snapshot>>,
    stats: CacheStats,
}

impl<S: CatalogSupplier> CachedCatalog<S> {
    pub fn new(supplier: S) -> Self {
        Self::with_ttl(supplier, None)
    }

    pub fn with_ttl(supplier: S, ttl: Option<Duration>) -> Self {
        Self {
            supplier,
            ttl,
            snapshot: RwLock::new(None),
            stats: CacheStats::default(),
        }
    }

    /// Current catalog, fetched from the supplier on first use or after expiry.
    pub async fn catalog(&self) -> Result<Arc<[AccommodationUnit]>, SupplierError> {
        if let Some(units) = self.fresh_snapshot() {
            self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
            return Ok(units);
        }
        self.stats.miss_count.fetch_add(1, Ordering::SeqCst);

        // The lock is released before awaiting the supplier
        let units: Arc<[AccommodationUnit]> = match self.supplier.fetch_catalog().await {
            Ok(units) => units.into(),
            Err(err) => {
                self.stats.failed_refresh_count.fetch_add(1, Ordering::SeqCst);
                return Err(err);
            }
        };

        tracing::debug!(
            source = self.supplier.source_name(),
            units = units.len(),
            "catalog snapshot refreshed"
        );
        self.stats.refresh_count.fetch_add(1, Ordering::SeqCst);
        *self.snapshot.write() = Some(Snapshot {
            units: Arc::clone(&units),
            loaded_at: Instant::now(),
        });
        Ok(units)
    }

    pub fn invalidate(&self) -> bool {
        let dropped = self.snapshot.write().take().is_some();
        if dropped {
            self.stats.invalidation_count.fetch_add(1, Ordering::SeqCst);
        }
        dropped
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            refresh_count: self.stats.refresh_count.load(Ordering::SeqCst),
            failed_refresh_count: self.stats.failed_refresh_count.load(Ordering::SeqCst),
            invalidation_count: self.stats.invalidation_count.load(Ordering::SeqCst),
            units_cached: self
                .snapshot
                .read()
                .as_ref()
                .map_or(0, |snapshot| snapshot.units.len()),
        }
    }

    fn fresh_snapshot(&self) -> Option<Arc<[AccommodationUnit]>> {
        let guard = self.snapshot.read();
        let snapshot = guard.as_ref()?;
        if snapshot.is_expired(self.ttl) {
            return None;
        }
        Some(Arc::clone(&snapshot.units))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    // Counts fetches and fails the ones listed in `failing_calls`
    struct CountingSupplier {
        calls: AtomicUsize,
        failing_calls: Vec<usize>,
    }

    impl CountingSupplier {
        fn new(failing_calls: Vec<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failing_calls,
            }
        }
    }

    #[async_trait]
    impl CatalogSupplier for CountingSupplier {
        async fn fetch_catalog(&self) -> Result<Vec<AccommodationUnit>, SupplierError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_calls.contains(&call) {
                return Err(SupplierError::Network("connection reset".to_string()));
            }
            Ok(vec![
                AccommodationUnit::new(format!("unit-{call}-a"), "A", 2),
                AccommodationUnit::new(format!("unit-{call}-b"), "B", 4),
            ])
        }

        fn source_name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_loads_once_per_session() {
        let cache = CachedCatalog::new(CountingSupplier::new(vec![]));

        let first = cache.catalog().await.unwrap();
        let second = cache.catalog().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.supplier.calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.refresh_count, 1);
        assert_eq!(stats.units_cached, 2);
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_refetched() {
        let cache = CachedCatalog::with_ttl(
            CountingSupplier::new(vec![]),
            Some(Duration::from_millis(20)),
        );

        let first = cache.catalog().await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let second = cache.catalog().await.unwrap();

        assert_eq!(first[0].id.as_str(), "unit-0-a");
        assert_eq!(second[0].id.as_str(), "unit-1-a");
        assert_eq!(cache.stats().refresh_count, 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = CachedCatalog::new(CountingSupplier::new(vec![]));
        cache.catalog().await.unwrap();

        assert!(cache.invalidate());
        assert!(!cache.invalidate());
        assert_eq!(cache.stats().units_cached, 0);

        let units = cache.catalog().await.unwrap();
        assert_eq!(units[0].id.as_str(), "unit-1-a");
        assert_eq!(cache.stats().invalidation_count, 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = CachedCatalog::new(CountingSupplier::new(vec![0]));

        let err = cache.catalog().await.unwrap_err();
        assert!(matches!(err, SupplierError::Network(_)));
        assert_eq!(cache.stats().units_cached, 0);

        let units = cache.catalog().await.unwrap();
        assert_eq!(units.len(), 2);

        let stats = cache.stats();
        assert_eq!(stats.failed_refresh_count, 1);
        assert_eq!(stats.miss_count, 2);
        assert_eq!(stats.refresh_count, 1);
    }
}
