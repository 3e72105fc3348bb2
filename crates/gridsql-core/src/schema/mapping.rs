//! The resolved conversion plan for one table.

use datafusion::arrow::datatypes::SchemaRef;
use gridsql_commons::{GridDataType, SqlName};

/// One column of a mapped table.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// Normalized column name, unique within the table.
    pub name: SqlName,
    /// The fixed relational type assigned at discovery time.
    pub data_type: GridDataType,
    /// Original upstream field name; `None` for the identity column. This is
    /// the reverse lookup the row codec resolves record fields with.
    pub upstream_name: Option<String>,
    /// True only for the synthetic `record_id` column.
    pub identity: bool,
    /// True for the upstream-designated primary display field.
    pub primary: bool,
}

/// Immutable schema + conversion plan for one table.
///
/// Built once at discovery time and shared for the life of the table; the
/// column order here is the column order of every batch the codec emits.
#[derive(Debug, Clone)]
pub struct TableMapping {
    table_name: SqlName,
    columns: Vec<ColumnSpec>,
    schema: SchemaRef,
}

impl TableMapping {
    pub(crate) fn new(table_name: SqlName, columns: Vec<ColumnSpec>, schema: SchemaRef) -> Self {
        Self {
            table_name,
            columns,
            schema,
        }
    }

    pub fn table_name(&self) -> &SqlName {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Arrow schema, identity column first.
    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }
}
