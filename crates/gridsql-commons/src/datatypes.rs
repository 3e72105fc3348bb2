//! Column type system.
//!
//! Upstream field values are loosely typed at the source. GridSQL fixes a
//! closed variant per column at schema-discovery time so row conversion is
//! one typed operation per column instead of runtime inspection per value.

use std::fmt;

use arrow_schema::DataType as ArrowDataType;
use serde::{Deserialize, Serialize};

/// The relational type assigned to a column.
///
/// | Upstream field kind | GridDataType | Arrow type |
/// |---|---|---|
/// | `date` | `Date` | `Date32` |
/// | `autoNumber` | `Number` | `Float64` |
/// | `singleSelect`, `singleLineText`, `multilineText` | `Text` | `Utf8` |
/// | `multipleRecordLinks`, `multipleLookupValues` | `JsonArray` | `Utf8` (JSON text) |
/// | anything else | `Text` | `Utf8` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridDataType {
    Text,
    Number,
    Date,
    JsonArray,
}

impl GridDataType {
    /// Map an upstream field type tag to a relational type.
    ///
    /// Unrecognized tags default to `Text`; the upstream service grows new
    /// field kinds faster than this table does.
    pub fn from_upstream(type_tag: &str) -> Self {
        match type_tag {
            "date" => GridDataType::Date,
            "autoNumber" => GridDataType::Number,
            "singleSelect" | "singleLineText" | "multilineText" => GridDataType::Text,
            "multipleRecordLinks" | "multipleLookupValues" => GridDataType::JsonArray,
            _ => GridDataType::Text,
        }
    }

    /// The Arrow physical type backing this column.
    pub fn to_arrow_type(&self) -> ArrowDataType {
        match self {
            GridDataType::Text => ArrowDataType::Utf8,
            GridDataType::Number => ArrowDataType::Float64,
            GridDataType::Date => ArrowDataType::Date32,
            // JSON rendered as UTF-8 text
            GridDataType::JsonArray => ArrowDataType::Utf8,
        }
    }
}

impl fmt::Display for GridDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GridDataType::Text => "text",
            GridDataType::Number => "number",
            GridDataType::Date => "date",
            GridDataType::JsonArray => "json_array",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_upstream_tags() {
        assert_eq!(GridDataType::from_upstream("date"), GridDataType::Date);
        assert_eq!(GridDataType::from_upstream("autoNumber"), GridDataType::Number);
        assert_eq!(GridDataType::from_upstream("singleSelect"), GridDataType::Text);
        assert_eq!(GridDataType::from_upstream("singleLineText"), GridDataType::Text);
        assert_eq!(GridDataType::from_upstream("multilineText"), GridDataType::Text);
        assert_eq!(
            GridDataType::from_upstream("multipleRecordLinks"),
            GridDataType::JsonArray
        );
        assert_eq!(
            GridDataType::from_upstream("multipleLookupValues"),
            GridDataType::JsonArray
        );
    }

    #[test]
    fn unknown_tags_default_to_text() {
        assert_eq!(GridDataType::from_upstream("barcode"), GridDataType::Text);
        assert_eq!(GridDataType::from_upstream(""), GridDataType::Text);
    }

    #[test]
    fn arrow_mapping() {
        assert_eq!(GridDataType::Text.to_arrow_type(), ArrowDataType::Utf8);
        assert_eq!(GridDataType::Number.to_arrow_type(), ArrowDataType::Float64);
        assert_eq!(GridDataType::Date.to_arrow_type(), ArrowDataType::Date32);
        assert_eq!(GridDataType::JsonArray.to_arrow_type(), ArrowDataType::Utf8);
    }
}
