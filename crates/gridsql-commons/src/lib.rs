//! # gridsql-commons
//!
//! Shared vocabulary for the GridSQL workspace: typed identifier wrappers,
//! SQL name normalization, the closed column-type variant, and the serde
//! models of the upstream record-store wire format.
//!
//! This crate sits below everything else:
//!
//! ```text
//! gridsql (server binary)
//!     ↓
//! gridsql-core (catalog, scan, codec)
//!     ↓
//! gridsql-client (upstream REST access)
//!     ↓
//! gridsql-commons (ids, names, types, wire models)
//! ```

pub mod datatypes;
pub mod ids;
pub mod models;
pub mod sql_name;

pub use datatypes::GridDataType;
pub use ids::{BaseId, TableId};
pub use models::{BaseInfo, FieldSchema, Record, RecordPage, TableSchema};
pub use sql_name::SqlName;
