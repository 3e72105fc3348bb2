//! One discovered base as a DataFusion schema.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use datafusion::catalog::{SchemaProvider, TableProvider};
use datafusion::error::Result as DataFusionResult;
use log::warn;

use gridsql_client::RecordStore;
use gridsql_commons::{BaseId, BaseInfo, SqlName, TableSchema};

use crate::scan::PageCache;

use super::table::GridTable;

/// SchemaProvider over one base's fixed table set.
///
/// Built once from the base's schema discovery; the table set never changes
/// afterwards. Lookups use normalized table names.
pub struct BaseCatalog {
    base: BaseInfo,
    name: SqlName,
    tables: BTreeMap<String, Arc<GridTable>>,
}

impl BaseCatalog {
    pub(crate) fn build(
        base: BaseInfo,
        table_schemas: Vec<TableSchema>,
        store: Arc<dyn RecordStore>,
        cache: Arc<PageCache>,
    ) -> Self {
        let name = SqlName::normalize(&base.name);
        let mut tables: BTreeMap<String, Arc<GridTable>> = BTreeMap::new();
        for table_schema in &table_schemas {
            let table = Arc::new(GridTable::new(
                base.id.clone(),
                table_schema,
                store.clone(),
                cache.clone(),
            ));
            let key = table.name().as_str().to_string();
            if tables.contains_key(&key) {
                // Same invariant as columns: names are unique per scope.
                // Keep the first table; a silent shadow would be worse.
                warn!(
                    "base {}: table {:?} also normalizes to {:?}; keeping the first",
                    name, table_schema.name, key
                );
                continue;
            }
            tables.insert(key, table);
        }
        Self { base, name, tables }
    }

    /// Normalized base name, the engine-facing database name.
    pub fn name(&self) -> &SqlName {
        &self.name
    }

    pub fn base_id(&self) -> &BaseId {
        &self.base.id
    }

    /// Upstream display name, before normalization.
    pub fn display_name(&self) -> &str {
        &self.base.name
    }

    /// Concrete table lookup, for callers that need more than the
    /// `TableProvider` face.
    pub fn grid_table(&self, name: &str) -> Option<&Arc<GridTable>> {
        self.tables.get(name)
    }
}

impl fmt::Debug for BaseCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseCatalog")
            .field("name", &self.name.as_str())
            .field("base_id", &self.base.id)
            .field("tables", &self.tables.len())
            .finish()
    }
}

#[async_trait]
impl SchemaProvider for BaseCatalog {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    async fn table(&self, name: &str) -> DataFusionResult<Option<Arc<dyn TableProvider>>> {
        Ok(self
            .tables
            .get(name)
            .map(|table| table.clone() as Arc<dyn TableProvider>))
    }

    fn table_exist(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
