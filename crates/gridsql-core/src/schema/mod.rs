//! Schema mapping: upstream table metadata → relational schema.

mod mapper;
mod mapping;

pub use mapper::{map_table_schema, RECORD_ID_FIELD};
pub use mapping::{ColumnSpec, TableMapping};
