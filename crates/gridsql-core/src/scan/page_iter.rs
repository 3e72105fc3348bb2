//! Lazy, forward-only walk of one table's page chain.

use std::sync::Arc;

use gridsql_client::RecordStore;
use gridsql_commons::{BaseId, RecordPage, TableId};

use super::page_cache::{PageCache, PageKey};
use crate::error::GridSqlError;

/// Iterator over the pages of one full table scan.
///
/// The scan is a state machine: not started, in progress (holding the last
/// continuation cursor), done. The empty cursor is overloaded upstream: it
/// means both "no cursor supplied yet" and "no more pages". Termination is
/// therefore decided by the explicit `started` flag together with the
/// cursor, never by the cursor value alone. Each page's existence is only
/// known after fetching the one before it, so pages of a single scan are
/// fetched serially.
///
/// Fetches go through the shared [`PageCache`]; misses hit the upstream
/// store and errors propagate to the caller unretried.
pub struct PageIter {
    store: Arc<dyn RecordStore>,
    cache: Arc<PageCache>,
    base_id: BaseId,
    table_id: TableId,
    cursor: String,
    started: bool,
}

impl PageIter {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<PageCache>,
        base_id: BaseId,
        table_id: TableId,
    ) -> Self {
        Self {
            store,
            cache,
            base_id,
            table_id,
            cursor: String::new(),
            started: false,
        }
    }

    /// Fetch the next page, or `None` once the chain is exhausted.
    ///
    /// Forward-only and non-restartable: after `None` every further call
    /// returns `None`.
    pub async fn next_page(&mut self) -> Result<Option<Arc<RecordPage>>, GridSqlError> {
        if self.started && self.cursor.is_empty() {
            return Ok(None);
        }

        let key = PageKey::new(&self.table_id, &self.cursor);
        let store = self.store.clone();
        let base_id = self.base_id.clone();
        let table_id = self.table_id.clone();
        let cursor = self.cursor.clone();

        let page = self
            .cache
            .get_or_fetch(key, move || async move {
                let cursor = if cursor.is_empty() {
                    None
                } else {
                    Some(cursor.as_str())
                };
                store
                    .list_records(&base_id, &table_id, cursor)
                    .await
                    .map_err(GridSqlError::from)
            })
            .await?;

        self.started = true;
        self.cursor = page.offset.clone();
        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsql_client::test_utils::{record, InMemoryStore};
    use gridsql_commons::Record;
    use serde_json::json;

    fn records(prefix: &str, count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| record(&format!("{}{:02}", prefix, i), json!({})))
            .collect()
    }

    fn three_page_store() -> Arc<InMemoryStore> {
        Arc::new(
            InMemoryStore::new()
                .with_page("tbl01", "", RecordPage::new(records("a", 40), "c1"))
                .with_page("tbl01", "c1", RecordPage::new(records("b", 40), "c2"))
                .with_page("tbl01", "c2", RecordPage::new(records("c", 17), "")),
        )
    }

    fn iter(store: Arc<InMemoryStore>, cache: Arc<PageCache>) -> PageIter {
        PageIter::new(store, cache, BaseId::new("app01"), TableId::new("tbl01"))
    }

    #[tokio::test]
    async fn walks_the_chain_and_terminates_on_empty_cursor() {
        let store = three_page_store();
        let cache = Arc::new(PageCache::new(Default::default()));
        let mut pages = iter(store.clone(), cache);

        let mut sizes = Vec::new();
        let mut total = 0;
        while let Some(page) = pages.next_page().await.unwrap() {
            sizes.push(page.records.len());
            total += page.records.len();
        }

        assert_eq!(sizes, vec![40, 40, 17]);
        assert_eq!(total, 97);
        // Each page fetched exactly once; page 1 never re-fetched.
        assert_eq!(store.record_fetches(), 3);
        // Exhausted for good.
        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(store.record_fetches(), 3);
    }

    #[tokio::test]
    async fn empty_first_page_still_counts_as_started() {
        let store = Arc::new(
            InMemoryStore::new().with_page("tbl01", "", RecordPage::default()),
        );
        let cache = Arc::new(PageCache::new(Default::default()));
        let mut pages = iter(store.clone(), cache);

        let first = pages.next_page().await.unwrap().expect("one page");
        assert!(first.records.is_empty());
        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(store.record_fetches(), 1);
    }

    #[tokio::test]
    async fn second_scan_within_ttl_is_served_from_cache() {
        let store = three_page_store();
        let cache = Arc::new(PageCache::new(Default::default()));

        let mut first = iter(store.clone(), cache.clone());
        while first.next_page().await.unwrap().is_some() {}
        assert_eq!(store.record_fetches(), 3);

        let mut second = iter(store.clone(), cache);
        let mut total = 0;
        while let Some(page) = second.next_page().await.unwrap() {
            total += page.records.len();
        }
        assert_eq!(total, 97);
        assert_eq!(store.record_fetches(), 3);
    }

    #[tokio::test]
    async fn upstream_failure_aborts_the_scan() {
        let store = three_page_store();
        let cache = Arc::new(PageCache::new(Default::default()));
        let mut pages = iter(store.clone(), cache);

        pages.next_page().await.unwrap();
        store.set_fail_records(true);
        let err = pages.next_page().await.unwrap_err();
        assert!(matches!(err, GridSqlError::Upstream(_)));
    }
}
