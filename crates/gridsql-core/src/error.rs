// Error types module
use datafusion::error::DataFusionError;
use gridsql_client::ClientError;
use thiserror::Error;

/// Main error type for the adapter.
///
/// Everything bubbles to the engine unmodified; this layer performs no
/// retries and no silent recovery.
#[derive(Error, Debug)]
pub enum GridSqlError {
    /// Network/API failure during a page fetch. Aborts the in-progress scan
    /// at that partition.
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] ClientError),

    /// Metadata fetch failure while building a base or table. Surfaced at
    /// construction time, not deferred.
    #[error("schema discovery failed: {0}")]
    SchemaDiscovery(String),

    /// A Date column's source text did not parse as a calendar date.
    #[error("invalid date {value:?} in column {column}: expected YYYY-MM-DD")]
    DateParse { column: String, value: String },

    /// Unknown database or table name. A normal negative result.
    #[error("not found: {0}")]
    NotFound(String),

    /// Arrow-level schema or batch construction failure.
    #[error("schema error: {0}")]
    Schema(String),
}

impl From<GridSqlError> for DataFusionError {
    fn from(err: GridSqlError) -> Self {
        DataFusionError::External(Box::new(err))
    }
}
