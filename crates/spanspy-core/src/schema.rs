//! Relational schema model and its JSON layout.
//!
//! Optional fields are omitted from the output rather than written as
//! `null`, empty arrays or `false`; consumers rely on presence alone.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The complete schema built from a DDL stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub tables: Vec<Table>,
    /// `None` when no foreign keys exist; never `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<Vec<ForeignKey>>,
    /// `None` when no indexes exist; never `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexes: Option<Vec<Index>>,
}

impl Schema {
    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn foreign_keys(&self) -> &[ForeignKey] {
        self.foreign_keys.as_deref().unwrap_or_default()
    }

    pub fn indexes(&self) -> &[Index] {
        self.indexes.as_deref().unwrap_or_default()
    }

    /// Name every unnamed foreign key `<referencingTable>_<referencedTable>`.
    ///
    /// Schemas produced by the builder never need this; exported documents
    /// edited by hand may.
    pub fn fill_foreign_key_names(&mut self) {
        for fk in self.foreign_keys.iter_mut().flatten() {
            if fk.name.is_empty() {
                fk.name = format!("{}_{}", fk.referencing_table, fk.referenced_table);
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interleaved_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_deletion_policy: Option<RowDeletionPolicy>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|k| k == column)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Canonical type, e.g. `INT64`, `STRING(36)` or `my.proto.Type`.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_array: bool,
    #[serde(rename = "isNullable", default, skip_serializing_if = "Nullability::is_unknown")]
    pub nullability: Nullability,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// What is known about a column accepting NULL.
///
/// There is no "known nullable" state: a column is either declared
/// `NOT NULL` (directly or by being a primary key) or nothing is recorded.
/// On the wire `NotNull` is `"isNullable": false` and `Unknown` is an absent
/// field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Nullability {
    #[default]
    Unknown,
    NotNull,
}

impl Nullability {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Nullability::Unknown)
    }

    pub fn is_not_null(&self) -> bool {
        matches!(self, Nullability::NotNull)
    }
}

impl Serialize for Nullability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nullability::NotNull => serializer.serialize_bool(false),
            Nullability::Unknown => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Nullability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<bool>::deserialize(deserializer)? {
            Some(false) => Nullability::NotNull,
            _ => Nullability::Unknown,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowDeletionPolicy {
    pub column_name: String,
    /// Day count as written, e.g. `30` or `@retention_days`.
    pub num_days: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// Absent or empty in hand-edited documents until
    /// [`Schema::fill_foreign_key_names`] runs.
    #[serde(default)]
    pub name: String,
    pub referencing_table: String,
    pub referencing_columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    pub table: String,
    pub columns: Vec<IndexKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storing: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interleaved_in: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_null_filtered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_column_omits_unset_fields() {
        let column = Column::new("Name", "STRING(100)");
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            json!({"name": "Name", "type": "STRING(100)"})
        );
    }

    #[test]
    fn test_column_not_null_is_literal_false() {
        let column = Column {
            is_array: true,
            nullability: Nullability::NotNull,
            comment: Some("tags".to_string()),
            ..Column::new("Tags", "STRING(64)")
        };
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            json!({
                "name": "Tags",
                "type": "STRING(64)",
                "isArray": true,
                "isNullable": false,
                "comment": "tags"
            })
        );
    }

    #[test]
    fn test_empty_comment_is_omitted() {
        let column = Column {
            comment: Some(String::new()),
            ..Column::new("Id", "INT64")
        };
        assert_eq!(serde_json::to_value(&column).unwrap(), json!({"name": "Id", "type": "INT64"}));
    }

    #[test]
    fn test_nullable_true_reads_as_unknown() {
        let column: Column =
            serde_json::from_value(json!({"name": "A", "type": "BOOL", "isNullable": true})).unwrap();
        assert_eq!(column.nullability, Nullability::Unknown);

        let column: Column =
            serde_json::from_value(json!({"name": "A", "type": "BOOL", "isNullable": false})).unwrap();
        assert_eq!(column.nullability, Nullability::NotNull);
    }

    #[test]
    fn test_schema_omits_empty_lists() {
        let schema = Schema {
            tables: vec![Table::new("Users")],
            ..Schema::default()
        };
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"tables": [{"name": "Users", "columns": [], "primaryKey": []}]})
        );
        assert!(schema.foreign_keys().is_empty());
        assert!(schema.indexes().is_empty());
    }

    #[test]
    fn test_fill_foreign_key_names() {
        let mut schema: Schema = serde_json::from_value(json!({
            "tables": [],
            "foreignKeys": [
                {
                    "name": "",
                    "referencingTable": "Albums",
                    "referencingColumns": ["SingerId"],
                    "referencedTable": "Singers",
                    "referencedColumns": ["SingerId"]
                },
                {
                    "referencingTable": "Orders",
                    "referencingColumns": ["UserId"],
                    "referencedTable": "Users",
                    "referencedColumns": ["Id"]
                },
                {
                    "name": "Kept",
                    "referencingTable": "A",
                    "referencingColumns": [],
                    "referencedTable": "B",
                    "referencedColumns": []
                }
            ]
        }))
        .unwrap();
        schema.fill_foreign_key_names();
        let names: Vec<&str> = schema.foreign_keys().iter().map(|fk| fk.name.as_str()).collect();
        assert_eq!(names, vec!["Albums_Singers", "Orders_Users", "Kept"]);

        let mut empty = Schema::default();
        empty.fill_foreign_key_names();
        assert_eq!(empty.foreign_keys, None);
    }

    #[test]
    fn test_index_layout() {
        let index = Index {
            name: "UsersByName".to_string(),
            table: "Users".to_string(),
            columns: vec![
                IndexKey { name: "Name".to_string(), direction: None },
                IndexKey { name: "Age".to_string(), direction: Some(SortDirection::Desc) },
            ],
            is_unique: true,
            ..Index::default()
        };
        assert_eq!(
            serde_json::to_value(&index).unwrap(),
            json!({
                "name": "UsersByName",
                "table": "Users",
                "columns": [{"name": "Name"}, {"name": "Age", "direction": "DESC"}],
                "isUnique": true
            })
        );
    }
}
