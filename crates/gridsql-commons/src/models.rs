//! Serde models of the upstream record-store wire format.
//!
//! The upstream service is an Airtable-compatible REST API: bases, per-base
//! table schemas, and paginated record listings. Field values arrive as
//! loosely-typed JSON and fields may be absent from any record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{BaseId, TableId};

/// One upstream base as returned by the base-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseInfo {
    pub id: BaseId,
    pub name: String,
}

/// Schema of one upstream table: an ordered field list plus the id of the
/// field the upstream designates as the table's primary display field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    pub id: TableId,
    pub name: String,
    #[serde(default)]
    pub primary_field_id: String,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

/// One field of an upstream table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub id: String,
    pub name: String,
    /// Upstream type tag, e.g. `singleLineText` or `multipleRecordLinks`.
    #[serde(rename = "type")]
    pub field_type: String,
}

/// One upstream row: a stable id plus a partially-populated field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            created_time: None,
            fields,
        }
    }
}

/// One paginated fetch result.
///
/// `offset` is the opaque continuation cursor for the next page. The wire
/// format omits it on the final page, which deserializes to the empty
/// string; an empty cursor therefore means "no more pages" only once at
/// least one page has been fetched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub offset: String,
}

impl RecordPage {
    pub fn new(records: Vec<Record>, offset: impl Into<String>) -> Self {
        Self {
            records,
            offset: offset.into(),
        }
    }

    /// True when this page carries a continuation cursor.
    pub fn has_next(&self) -> bool {
        !self.offset.is_empty()
    }
}
