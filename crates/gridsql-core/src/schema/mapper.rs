//! Builds a [`TableMapping`] from an upstream table schema.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use datafusion::arrow::datatypes::{DataType, Field, Schema};
use log::warn;

use gridsql_commons::{GridDataType, SqlName, TableSchema};

use super::mapping::{ColumnSpec, TableMapping};

/// Name of the synthetic identity column holding each record's stable id.
pub const RECORD_ID_FIELD: &str = "record_id";

/// Field metadata keys carrying provenance; debugging aid only, nothing
/// reads these at query time.
const META_UPSTREAM_NAME: &str = "upstream_name";
const META_UPSTREAM_TYPE: &str = "upstream_type";

/// Convert one upstream table schema into the relational schema and
/// conversion plan.
///
/// The result is always `[record_id] + one column per upstream field`, in
/// upstream field order. Only the identity column is non-nullable.
pub fn map_table_schema(table_schema: &TableSchema) -> TableMapping {
    let table_name = SqlName::normalize(&table_schema.name);

    let mut columns = Vec::with_capacity(table_schema.fields.len() + 1);
    let mut fields = Vec::with_capacity(table_schema.fields.len() + 1);
    let mut taken: HashSet<String> = HashSet::new();

    columns.push(ColumnSpec {
        name: SqlName::new(RECORD_ID_FIELD),
        data_type: GridDataType::Text,
        upstream_name: None,
        identity: true,
        primary: false,
    });
    fields.push(Field::new(RECORD_ID_FIELD, DataType::Utf8, false));
    taken.insert(RECORD_ID_FIELD.to_string());

    for field in &table_schema.fields {
        let name = unique_column_name(&table_name, &field.name, &mut taken);
        let data_type = GridDataType::from_upstream(&field.field_type);

        let metadata = HashMap::from([
            (META_UPSTREAM_NAME.to_string(), field.name.clone()),
            (META_UPSTREAM_TYPE.to_string(), field.field_type.clone()),
        ]);
        fields.push(
            Field::new(name.as_str(), data_type.to_arrow_type(), true).with_metadata(metadata),
        );

        columns.push(ColumnSpec {
            name,
            data_type,
            upstream_name: Some(field.name.clone()),
            identity: false,
            primary: field.id == table_schema.primary_field_id,
        });
    }

    let schema = Arc::new(Schema::new(fields));
    TableMapping::new(table_name, columns, schema)
}

/// Normalize an upstream field name and resolve collisions with a numeric
/// suffix. A field whose name normalizes to nothing becomes `field`.
fn unique_column_name(table: &SqlName, raw: &str, taken: &mut HashSet<String>) -> SqlName {
    let base = {
        let normalized = SqlName::normalize(raw);
        if normalized.is_empty() {
            "field".to_string()
        } else {
            normalized.into_string()
        }
    };

    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    if candidate != base || base != SqlName::normalize(raw).as_str() {
        warn!(
            "table {}: field {:?} mapped to column {:?}",
            table, raw, candidate
        );
    }
    taken.insert(candidate.clone());
    SqlName::new(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsql_commons::{FieldSchema, TableId};

    fn field(id: &str, name: &str, field_type: &str) -> FieldSchema {
        FieldSchema {
            id: id.to_string(),
            name: name.to_string(),
            field_type: field_type.to_string(),
        }
    }

    fn games_schema() -> TableSchema {
        TableSchema {
            id: TableId::new("tbl01"),
            name: "Games Played".to_string(),
            primary_field_id: "fld01".to_string(),
            fields: vec![
                field("fld01", "Name", "singleLineText"),
                field("fld02", "Play Date", "date"),
                field("fld03", "Rating", "autoNumber"),
                field("fld04", "Platforms", "multipleRecordLinks"),
            ],
        }
    }

    #[test]
    fn identity_column_is_first_and_non_nullable() {
        let mapping = map_table_schema(&games_schema());
        let schema = mapping.schema();

        assert_eq!(schema.fields().len(), 5); // record_id + 4 fields
        assert_eq!(schema.field(0).name(), RECORD_ID_FIELD);
        assert!(!schema.field(0).is_nullable());
        assert!(schema.fields().iter().skip(1).all(|f| f.is_nullable()));
        assert!(mapping.columns()[0].identity);
    }

    #[test]
    fn columns_follow_the_type_policy() {
        let mapping = map_table_schema(&games_schema());
        let types: Vec<_> = mapping.columns().iter().map(|c| c.data_type).collect();
        assert_eq!(
            types,
            vec![
                GridDataType::Text,
                GridDataType::Text,
                GridDataType::Date,
                GridDataType::Number,
                GridDataType::JsonArray,
            ]
        );
    }

    #[test]
    fn primary_flag_tracks_the_upstream_primary_field() {
        let mapping = map_table_schema(&games_schema());
        let primaries: Vec<_> = mapping
            .columns()
            .iter()
            .filter(|c| c.primary)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(primaries, vec!["name"]);
    }

    #[test]
    fn provenance_lands_in_field_metadata() {
        let mapping = map_table_schema(&games_schema());
        let schema = mapping.schema();
        let play_date = schema.field(2);
        assert_eq!(play_date.name(), "play_date");
        assert_eq!(play_date.metadata()["upstream_name"], "Play Date");
        assert_eq!(play_date.metadata()["upstream_type"], "date");
    }

    #[test]
    fn colliding_names_get_numeric_suffixes() {
        let schema = TableSchema {
            id: TableId::new("tbl02"),
            name: "Dupes".to_string(),
            primary_field_id: String::new(),
            fields: vec![
                field("f1", "Name", "singleLineText"),
                field("f2", "name", "singleLineText"),
                field("f3", "NAME", "singleLineText"),
            ],
        };
        let mapping = map_table_schema(&schema);
        let names: Vec<_> = mapping
            .columns()
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["record_id", "name", "name_2", "name_3"]);
    }

    #[test]
    fn unnameable_fields_fall_back_to_field() {
        let schema = TableSchema {
            id: TableId::new("tbl03"),
            name: "Odd".to_string(),
            primary_field_id: String::new(),
            fields: vec![field("f1", "???", "singleLineText")],
        };
        let mapping = map_table_schema(&schema);
        assert_eq!(mapping.columns()[1].name.as_str(), "field");
    }

    #[test]
    fn reverse_lookup_keeps_original_field_names() {
        let mapping = map_table_schema(&games_schema());
        assert_eq!(
            mapping.columns()[2].upstream_name.as_deref(),
            Some("Play Date")
        );
        assert!(mapping.columns()[0].upstream_name.is_none());
    }
}
