//! # gridsql-core
//!
//! The virtual-database adapter: exposes the upstream record store as
//! relational databases satisfying DataFusion's catalog contract.
//!
//! ```text
//! DataFusion engine
//!     ↓ CatalogProvider / SchemaProvider / TableProvider
//! providers (Provider, BaseCatalog, GridTable)
//!     ↓ pages
//! scan (PageIter → PageCache → row codec)
//!     ↓ records
//! gridsql-client (RecordStore)
//! ```
//!
//! The engine performs all query planning, filtering, and joining; this
//! crate only discovers catalogs, maps schemas, walks the upstream cursor
//! chain, and materializes typed rows.

pub mod error;
pub mod providers;
pub mod scan;
pub mod schema;

pub use error::GridSqlError;
pub use providers::{BaseCatalog, GridTable, Provider};
pub use scan::{PageCache, PageCacheConfig, PageIter, PageKey};
pub use schema::{map_table_schema, ColumnSpec, TableMapping, RECORD_ID_FIELD};
