//! One relational table backed by one upstream collection.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use datafusion::arrow::datatypes::SchemaRef;
use datafusion::arrow::record_batch::RecordBatch;
use datafusion::catalog::{Session, TableProvider};
use datafusion::datasource::MemTable;
use datafusion::error::{DataFusionError, Result as DataFusionResult};
use datafusion::logical_expr::{Expr, TableType};
use datafusion::physical_plan::ExecutionPlan;
use log::debug;

use gridsql_client::RecordStore;
use gridsql_commons::{BaseId, SqlName, TableId};

use crate::scan::row_codec::records_to_batch;
use crate::scan::{PageCache, PageIter};
use crate::schema::{map_table_schema, TableMapping};
use crate::GridSqlError;

/// DataFusion table provider over one upstream table.
///
/// Owns the immutable schema/conversion plan and a handle to fetch its
/// upstream collection; data is never retained on the table itself.
pub struct GridTable {
    base_id: BaseId,
    table_id: TableId,
    mapping: Arc<TableMapping>,
    store: Arc<dyn RecordStore>,
    cache: Arc<PageCache>,
}

impl GridTable {
    pub fn new(
        base_id: BaseId,
        table_schema: &gridsql_commons::TableSchema,
        store: Arc<dyn RecordStore>,
        cache: Arc<PageCache>,
    ) -> Self {
        Self {
            base_id,
            table_id: table_schema.id.clone(),
            mapping: Arc::new(map_table_schema(table_schema)),
            store,
            cache,
        }
    }

    /// Normalized table name.
    pub fn name(&self) -> &SqlName {
        self.mapping.table_name()
    }

    pub fn table_id(&self) -> &TableId {
        &self.table_id
    }

    pub fn mapping(&self) -> &TableMapping {
        &self.mapping
    }

    /// Start a fresh page walk over this table. Each scan drives its own
    /// cursor chain; concurrent scans share only the page cache.
    pub fn scan_pages(&self) -> PageIter {
        PageIter::new(
            self.store.clone(),
            self.cache.clone(),
            self.base_id.clone(),
            self.table_id.clone(),
        )
    }

    /// Fetch every page and convert each into one batch, in page order.
    pub async fn collect_partitions(&self) -> Result<Vec<RecordBatch>, GridSqlError> {
        let mut pages = self.scan_pages();
        let mut batches = Vec::new();
        while let Some(page) = pages.next_page().await? {
            batches.push(records_to_batch(&self.mapping, &page.records)?);
        }
        debug!(
            "scanned table {} ({} partitions)",
            self.name(),
            batches.len()
        );
        Ok(batches)
    }
}

impl fmt::Debug for GridTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridTable")
            .field("name", &self.name().as_str())
            .field("table_id", &self.table_id)
            .field("base_id", &self.base_id)
            .finish()
    }
}

#[async_trait]
impl TableProvider for GridTable {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn schema(&self) -> SchemaRef {
        self.mapping.schema()
    }

    fn table_type(&self) -> TableType {
        TableType::Base
    }

    async fn scan(
        &self,
        state: &dyn Session,
        projection: Option<&Vec<usize>>,
        _filters: &[Expr],
        limit: Option<usize>,
    ) -> DataFusionResult<Arc<dyn ExecutionPlan>> {
        // One upstream page per engine partition. The cursor chain forces
        // serial fetching here; the engine still gets per-page parallelism
        // downstream.
        let batches = self.collect_partitions().await.map_err(DataFusionError::from)?;
        let partitions: Vec<Vec<RecordBatch>> = batches.into_iter().map(|b| vec![b]).collect();
        let table = MemTable::try_new(self.schema(), partitions)?;
        table.scan(state, projection, &[], limit).await
    }
}
