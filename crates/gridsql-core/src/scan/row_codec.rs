//! Converts upstream records into Arrow record batches.
//!
//! One call converts one page of records under a resolved [`TableMapping`]:
//! column-wise, one typed conversion per column, no per-value type
//! inspection beyond what JSON forces.

use std::sync::Arc;

use chrono::NaiveDate;
use datafusion::arrow::array::{Array, Date32Array, Float64Array, StringArray};
use datafusion::arrow::datatypes::Date32Type;
use datafusion::arrow::record_batch::RecordBatch;
use serde_json::Value;

use gridsql_commons::{GridDataType, Record};

use crate::error::GridSqlError;
use crate::schema::{ColumnSpec, TableMapping};

type ArrayRef = Arc<dyn Array>;

/// Calendar-date wire format for Date columns.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert one page of records into a record batch.
///
/// Conversion rules per column:
/// - identity ← the record's own stable id (always present)
/// - absent field ← null
/// - Date ← parsed `YYYY-MM-DD`; a malformed value is a hard error, never
///   silently nulled
/// - Number ← the native JSON number, no text round-trip
/// - JsonArray ← a JSON array of string tokens, encoded with serde
/// - Text ← the value's plain text rendering
pub fn records_to_batch(
    mapping: &TableMapping,
    records: &[Record],
) -> Result<RecordBatch, GridSqlError> {
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(mapping.columns().len());

    for column in mapping.columns() {
        let array: ArrayRef = if column.identity {
            Arc::new(StringArray::from_iter_values(
                records.iter().map(|r| r.id.as_str()),
            ))
        } else {
            // Columns are named by normalized identifiers; records key
            // fields by the original upstream name kept in the mapping.
            let field = column.upstream_name.as_deref().unwrap_or_default();
            match column.data_type {
                GridDataType::Text => {
                    let values: Vec<Option<String>> = records
                        .iter()
                        .map(|r| r.fields.get(field).and_then(value_to_text))
                        .collect();
                    Arc::new(StringArray::from(values))
                }
                GridDataType::Number => {
                    let values: Vec<Option<f64>> = records
                        .iter()
                        .map(|r| r.fields.get(field).and_then(Value::as_f64))
                        .collect();
                    Arc::new(Float64Array::from(values))
                }
                GridDataType::Date => {
                    let mut values: Vec<Option<i32>> = Vec::with_capacity(records.len());
                    for r in records {
                        values.push(match r.fields.get(field) {
                            None | Some(Value::Null) => None,
                            Some(value) => Some(parse_date(column, value)?),
                        });
                    }
                    Arc::new(Date32Array::from(values))
                }
                GridDataType::JsonArray => {
                    let values: Vec<Option<String>> = records
                        .iter()
                        .map(|r| r.fields.get(field).and_then(encode_token_list))
                        .collect();
                    Arc::new(StringArray::from(values))
                }
            }
        };
        arrays.push(array);
    }

    RecordBatch::try_new(mapping.schema(), arrays).map_err(|e| GridSqlError::Schema(e.to_string()))
}

/// Plain text rendering: strings verbatim, other values as compact JSON.
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn parse_date(column: &ColumnSpec, value: &Value) -> Result<i32, GridSqlError> {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let date =
        NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| GridSqlError::DateParse {
            column: column.name.to_string(),
            value: text,
        })?;
    Ok(Date32Type::from_naive_date(date))
}

/// Encode a multi-valued field as a JSON array of string tokens.
///
/// Upstream link/lookup values arrive as JSON arrays and are re-encoded
/// element by element. A legacy textual rendering (`"[a b c]"`) is
/// tokenized on whitespace first. Either way the output is serialized JSON,
/// so tokens can never corrupt the framing.
fn encode_token_list(value: &Value) -> Option<String> {
    let tokens: Vec<Value> = match value {
        Value::Null => return None,
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Value::String(s.clone()),
                other => Value::String(other.to_string()),
            })
            .collect(),
        Value::String(text) => {
            let trimmed = text.trim();
            let inner = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(trimmed);
            inner
                .split_whitespace()
                .map(|token| Value::String(token.to_string()))
                .collect()
        }
        other => vec![Value::String(other.to_string())],
    };
    Some(Value::Array(tokens).to_string())
}
