//! Process-wide cache of fetched upstream pages.
//!
//! - **DashMap** storage for concurrent access from simultaneous scans
//! - **LRU eviction** when the cache exceeds its capacity
//! - **Fixed TTL** per entry, counted from insertion; a hit never extends it
//! - **Single-flight** fetch coalescing per (table, cursor) key
//!
//! The cache is purely a cost reduction: a miss, eviction, or expiry only
//! changes latency and upstream call volume, never the result of a scan.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use gridsql_commons::{RecordPage, TableId};
use tokio::sync::Mutex;

use crate::error::GridSqlError;

/// Cache key: one entry per (table, cursor) pair, so entries never collide
/// across tables and every page of a scan caches independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    table: TableId,
    cursor: String,
}

impl PageKey {
    pub fn new(table: &TableId, cursor: &str) -> Self {
        Self {
            table: table.clone(),
            cursor: cursor.to_string(),
        }
    }
}

/// Cache tuning knobs. The TTL is operator-configurable; capacity defaults
/// are fine for every deployment seen so far.
#[derive(Debug, Clone, Copy)]
pub struct PageCacheConfig {
    /// Maximum number of cached pages before LRU eviction.
    pub capacity: usize,
    /// Fixed time-to-live per entry, from insertion.
    pub ttl: Duration,
}

impl Default for PageCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            ttl: Duration::from_secs(10),
        }
    }
}

struct CacheSlot {
    page: Arc<RecordPage>,
    stored_at: Instant,
}

/// Bounded, TTL-based page cache shared by all tables and all scans.
pub struct PageCache {
    entries: DashMap<PageKey, CacheSlot>,
    /// Monotonic access sequence per key, for LRU eviction ordering.
    access_order: DashMap<PageKey, u64>,
    access_counter: AtomicU64,
    /// Per-key gates so concurrent misses on the same page share one fetch.
    in_flight: DashMap<PageKey, Arc<Mutex<()>>>,
    capacity: usize,
    ttl: Duration,

    hits: AtomicUsize,
    misses: AtomicUsize,
    evictions: AtomicUsize,
}

impl PageCache {
    pub fn new(config: PageCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            access_order: DashMap::new(),
            access_counter: AtomicU64::new(0),
            in_flight: DashMap::new(),
            capacity: config.capacity.max(1),
            ttl: config.ttl,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            evictions: AtomicUsize::new(0),
        }
    }

    /// Look up a page. Expired entries count as misses and are dropped.
    pub fn get(&self, key: &PageKey) -> Option<Arc<RecordPage>> {
        let expired = match self.entries.get(key) {
            Some(slot) => {
                if slot.stored_at.elapsed() < self.ttl {
                    let seq = self.access_counter.fetch_add(1, Ordering::Relaxed);
                    self.access_order.insert(key.clone(), seq);
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    return Some(slot.page.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
            self.access_order.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert a freshly fetched page, evicting least-recently-used entries
    /// once over capacity.
    pub fn insert(&self, key: PageKey, page: Arc<RecordPage>) {
        let seq = self.access_counter.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key.clone(),
            CacheSlot {
                page,
                stored_at: Instant::now(),
            },
        );
        self.access_order.insert(key, seq);
        self.evict_over_capacity();
    }

    /// Cached page for `key`, or the result of `fetch`, stored before
    /// return. Concurrent callers missing on the same key await one fetch
    /// instead of each issuing their own.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: PageKey,
        fetch: F,
    ) -> Result<Arc<RecordPage>, GridSqlError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<RecordPage, GridSqlError>>,
    {
        if let Some(page) = self.get(&key) {
            return Ok(page);
        }

        // Clone the gate out of the map so no shard lock is held across await.
        let gate = {
            let entry = self
                .in_flight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            entry.value().clone()
        };
        let guard = gate.lock().await;

        // A scan that held the gate before us may have already populated it.
        let outcome = match self.get(&key) {
            Some(page) => Ok(page),
            None => match fetch().await {
                Ok(page) => {
                    let page = Arc::new(page);
                    self.insert(key.clone(), page.clone());
                    Ok(page)
                }
                Err(err) => Err(err),
            },
        };

        drop(guard);
        self.in_flight.remove(&key);
        outcome
    }

    fn evict_over_capacity(&self) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .access_order
                .iter()
                .min_by_key(|entry| *entry.value())
                .map(|entry| entry.key().clone());
            let Some(key) = oldest else { break };
            self.entries.remove(&key);
            self.access_order.remove(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn eviction_count(&self) -> usize {
        self.evictions.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsql_commons::Record;

    fn page(marker: &str) -> Arc<RecordPage> {
        Arc::new(RecordPage::new(
            vec![Record::new(marker, serde_json::Map::new())],
            "",
        ))
    }

    fn key(cursor: &str) -> PageKey {
        PageKey::new(&TableId::new("tbl01"), cursor)
    }

    #[test]
    fn hit_returns_the_cached_page_unchanged() {
        let cache = PageCache::new(PageCacheConfig::default());
        cache.insert(key(""), page("rec1"));

        let got = cache.get(&key("")).expect("cached");
        assert_eq!(got.records[0].id, "rec1");
        assert_eq!(cache.hit_count(), 1);
        assert_eq!(cache.miss_count(), 0);
    }

    #[test]
    fn keys_do_not_collide_across_tables() {
        let cache = PageCache::new(PageCacheConfig::default());
        cache.insert(PageKey::new(&TableId::new("tblA"), ""), page("a"));
        cache.insert(PageKey::new(&TableId::new("tblB"), ""), page("b"));

        let a = cache.get(&PageKey::new(&TableId::new("tblA"), "")).unwrap();
        assert_eq!(a.records[0].id, "a");
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache = PageCache::new(PageCacheConfig {
            capacity: 10,
            ttl: Duration::from_millis(20),
        });
        cache.insert(key(""), page("rec1"));

        assert!(cache.get(&key("")).is_some());
        std::thread::sleep(Duration::from_millis(30));
        assert!(cache.get(&key("")).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn hits_do_not_extend_the_ttl() {
        let cache = PageCache::new(PageCacheConfig {
            capacity: 10,
            ttl: Duration::from_millis(40),
        });
        cache.insert(key(""), page("rec1"));

        std::thread::sleep(Duration::from_millis(25));
        assert!(cache.get(&key("")).is_some());
        std::thread::sleep(Duration::from_millis(25));
        // 50ms after insertion the entry is gone, hit at 25ms notwithstanding.
        assert!(cache.get(&key("")).is_none());
    }

    #[test]
    fn evicts_least_recently_used_over_capacity() {
        let cache = PageCache::new(PageCacheConfig {
            capacity: 2,
            ttl: Duration::from_secs(60),
        });
        cache.insert(key("a"), page("a"));
        cache.insert(key("b"), page("b"));
        // Touch "a" so "b" becomes least recently used.
        cache.get(&key("a"));
        cache.insert(key("c"), page("c"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.eviction_count(), 1);
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("b")).is_none());
        assert!(cache.get(&key("c")).is_some());
    }

    #[tokio::test]
    async fn get_or_fetch_populates_then_hits() {
        let cache = PageCache::new(PageCacheConfig::default());

        let first = cache
            .get_or_fetch(key(""), || async {
                Ok(RecordPage::new(
                    vec![Record::new("rec1", serde_json::Map::new())],
                    "",
                ))
            })
            .await
            .unwrap();
        assert_eq!(first.records[0].id, "rec1");

        // Second call must be served from cache; the fetch closure panics
        // if it runs.
        let second = cache
            .get_or_fetch(key(""), || async { panic!("fetched twice") })
            .await
            .unwrap();
        assert_eq!(second.records[0].id, "rec1");
    }

    #[tokio::test]
    async fn fetch_errors_are_not_cached() {
        let cache = PageCache::new(PageCacheConfig::default());

        let err = cache
            .get_or_fetch(key(""), || async {
                Err(GridSqlError::SchemaDiscovery("boom".to_string()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GridSqlError::SchemaDiscovery(_)));
        assert!(cache.is_empty());

        // A later call fetches again and succeeds.
        let page = cache
            .get_or_fetch(key(""), || async { Ok(RecordPage::default()) })
            .await
            .unwrap();
        assert!(page.records.is_empty());
    }
}
