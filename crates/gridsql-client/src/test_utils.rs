//! In-memory [`RecordStore`] for tests in this crate and dependent crates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use gridsql_commons::{BaseId, BaseInfo, Record, RecordPage, TableId, TableSchema};

use crate::error::ClientError;
use crate::RecordStore;

/// Scripted in-memory record store.
///
/// Bases, schemas, and pages are seeded up front; `record_fetches` counts
/// every `list_records` call so tests can assert upstream call volume.
#[derive(Default)]
pub struct InMemoryStore {
    bases: Vec<BaseInfo>,
    schemas: HashMap<BaseId, Vec<TableSchema>>,
    pages: HashMap<(TableId, String), RecordPage>,
    record_fetches: AtomicUsize,
    fail_records: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, id: &str, name: &str) -> Self {
        self.bases.push(BaseInfo {
            id: BaseId::new(id),
            name: name.to_string(),
        });
        self
    }

    pub fn with_table(mut self, base_id: &str, schema: TableSchema) -> Self {
        self.schemas
            .entry(BaseId::new(base_id))
            .or_default()
            .push(schema);
        self
    }

    /// Seed one page; use `""` as the cursor for the first page.
    pub fn with_page(mut self, table_id: &str, cursor: &str, page: RecordPage) -> Self {
        self.pages
            .insert((TableId::new(table_id), cursor.to_string()), page);
        self
    }

    /// Number of `list_records` calls that reached this store.
    pub fn record_fetches(&self) -> usize {
        self.record_fetches.load(Ordering::Relaxed)
    }

    /// Make every subsequent `list_records` call fail, simulating an
    /// upstream outage mid-scan.
    pub fn set_fail_records(&self, fail: bool) {
        self.fail_records.store(fail, Ordering::Relaxed);
    }
}

/// Build a record from a JSON object literal of its fields.
pub fn record(id: &str, fields: Value) -> Record {
    let fields = match fields {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    Record::new(id, fields)
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_bases(&self) -> Result<Vec<BaseInfo>, ClientError> {
        Ok(self.bases.clone())
    }

    async fn base_schema(&self, base: &BaseId) -> Result<Vec<TableSchema>, ClientError> {
        self.schemas
            .get(base)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: format!("unknown base {}", base),
            })
    }

    async fn list_records(
        &self,
        _base: &BaseId,
        table: &TableId,
        cursor: Option<&str>,
    ) -> Result<RecordPage, ClientError> {
        self.record_fetches.fetch_add(1, Ordering::Relaxed);
        if self.fail_records.load(Ordering::Relaxed) {
            return Err(ClientError::Api {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        let key = (table.clone(), cursor.unwrap_or("").to_string());
        self.pages.get(&key).cloned().ok_or_else(|| ClientError::Api {
            status: 404,
            message: format!("no page for table {} at cursor {:?}", table, cursor),
        })
    }
}
