//! # gridsql-client
//!
//! Access to the upstream record store. This crate isolates all direct
//! HTTP interaction with the upstream service, allowing gridsql-core to
//! stay free of transport concerns.
//!
//! The [`RecordStore`] trait is the seam: the catalog and scanner in
//! gridsql-core only ever see `Arc<dyn RecordStore>`, so tests run against
//! [`test_utils::InMemoryStore`] while production uses [`RestClient`].

pub mod error;
pub mod rest;
pub mod test_utils;

pub use error::ClientError;
pub use rest::RestClient;

use async_trait::async_trait;
use gridsql_commons::{BaseId, BaseInfo, RecordPage, TableId, TableSchema};

/// The upstream record-store surface the adapter consumes.
///
/// Three calls: base discovery, per-base schema introspection, and a single
/// page of records. Pagination is cursor-driven: `list_records` with no
/// cursor fetches the first page, and each returned page carries the cursor
/// for the next one (empty when exhausted).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List every base the credential can see.
    async fn list_bases(&self) -> Result<Vec<BaseInfo>, ClientError>;

    /// Fetch the table schemas of one base.
    async fn base_schema(&self, base: &BaseId) -> Result<Vec<TableSchema>, ClientError>;

    /// Fetch one page of records. `cursor` is `None` for the first page,
    /// otherwise the continuation cursor from the previous page.
    async fn list_records(
        &self,
        base: &BaseId,
        table: &TableId,
        cursor: Option<&str>,
    ) -> Result<RecordPage, ClientError>;
}
