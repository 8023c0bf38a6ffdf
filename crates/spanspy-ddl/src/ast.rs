//! Statement tree for the supported subset of Spanner DDL.
//!
//! Nodes are plain owned data. Anything the schema builder does not model
//! is still represented (as [`Ddl::Other`] or [`TableAlteration::Other`]) so
//! that a stream can be walked without losing statement boundaries.

use itertools::Itertools;
use spanspy_core::SortDirection;

/// A single identifier, already unquoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A dotted name such as `Users` or `analytics.Events`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    pub idents: Vec<Ident>,
}

impl Path {
    pub fn new(idents: Vec<Ident>) -> Self {
        Self { idents }
    }

    /// Build a path from `.`-separated text.
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.').map(Ident::new).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ddl {
    CreateTable(CreateTable),
    AlterTable(AlterTable),
    CreateIndex(CreateIndex),
    /// Any statement without a relational effect (`CREATE VIEW`, `DROP TABLE`, ...).
    Other(OtherStatement),
}

impl Ddl {
    /// Short statement label used in logs.
    pub fn kind(&self) -> &str {
        match self {
            Ddl::CreateTable(_) => "CREATE TABLE",
            Ddl::AlterTable(_) => "ALTER TABLE",
            Ddl::CreateIndex(_) => "CREATE INDEX",
            Ddl::Other(other) => &other.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OtherStatement {
    /// Leading keywords, upper-cased (e.g. `CREATE VIEW`).
    pub kind: String,
    /// The statement text as written, without the terminating `;`.
    pub sql: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTable {
    pub if_not_exists: bool,
    pub name: Path,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    /// Keys of the trailing `PRIMARY KEY (...)` clause.
    pub primary_keys: Vec<IndexKey>,
    pub cluster: Option<Cluster>,
    pub row_deletion_policy: Option<RowDeletionPolicy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    pub ty: SchemaType,
    pub not_null: bool,
    /// Inline `PRIMARY KEY` on the column itself.
    pub primary_key: bool,
    pub default_expr: Option<String>,
    pub generated_expr: Option<GeneratedColumn>,
    pub hidden: bool,
    pub options: Option<String>,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, ty: SchemaType) -> Self {
        Self {
            name: Ident::new(name),
            ty,
            not_null: false,
            primary_key: false,
            default_expr: None,
            generated_expr: None,
            hidden: false,
            options: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedColumn {
    pub expr: String,
    pub stored: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableConstraint {
    pub name: Option<Ident>,
    pub constraint: Constraint,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    ForeignKey(ForeignKey),
    Check { expr: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub columns: Vec<Ident>,
    pub reference_table: Path,
    pub reference_columns: Vec<Ident>,
    pub on_delete: Option<OnDelete>,
    pub enforced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    NoAction,
}

/// `INTERLEAVE IN [PARENT] table [ON DELETE ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub table_name: Path,
    pub parent: bool,
    pub on_delete: Option<OnDelete>,
}

/// `ROW DELETION POLICY (OLDER_THAN(column, INTERVAL n DAY))`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowDeletionPolicy {
    pub column_name: Ident,
    pub num_days: IntValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub name: Path,
    pub alteration: TableAlteration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableAlteration {
    AddColumn { if_not_exists: bool, column: ColumnDef },
    AddTableConstraint(TableConstraint),
    DropColumn(Ident),
    DropConstraint(Ident),
    SetInterleaveIn(Cluster),
    SetOnDelete(OnDelete),
    AddRowDeletionPolicy(RowDeletionPolicy),
    ReplaceRowDeletionPolicy(RowDeletionPolicy),
    DropRowDeletionPolicy,
    AlterColumn { name: Ident, sql: String },
    /// Recognised syntax with no schema effect (`ADD SYNONYM`, `RENAME TO`, ...).
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateIndex {
    pub unique: bool,
    pub null_filtered: bool,
    pub if_not_exists: bool,
    pub name: Path,
    pub table_name: Path,
    pub keys: Vec<IndexKey>,
    pub storing: Option<Vec<Ident>>,
    pub interleave_in: Option<Ident>,
    pub options: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexKey {
    pub name: Ident,
    pub dir: Option<SortDirection>,
}

impl IndexKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: Ident::new(name), dir: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    Scalar(ScalarTypeName),
    Sized { name: ScalarTypeName, size: TypeSize },
    Array(Box<SchemaType>),
    /// Proto or enum type referenced by its dotted path.
    Named(Vec<Ident>),
    Struct(Vec<StructField>),
}

impl SchemaType {
    /// Reproduce the type as DDL text.
    pub fn sql(&self) -> String {
        match self {
            SchemaType::Scalar(name) => name.as_str().to_string(),
            SchemaType::Sized { name, size } => format!("{}({})", name.as_str(), size.sql()),
            SchemaType::Array(item) => format!("ARRAY<{}>", item.sql()),
            SchemaType::Named(path) => path.iter().map(|i| i.name.as_str()).join("."),
            SchemaType::Struct(fields) => format!(
                "STRUCT<{}>",
                fields
                    .iter()
                    .map(|f| match &f.name {
                        Some(name) => format!("{} {}", name.name, f.ty.sql()),
                        None => f.ty.sql(),
                    })
                    .join(", ")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: Option<Ident>,
    pub ty: SchemaType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarTypeName {
    Bool,
    Int64,
    Float32,
    Float64,
    Numeric,
    String,
    Bytes,
    Date,
    Timestamp,
    Json,
    Interval,
    Tokenlist,
    Uuid,
}

impl ScalarTypeName {
    /// Case-insensitive lookup of a built-in type keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let name = match word.to_ascii_uppercase().as_str() {
            "BOOL" => ScalarTypeName::Bool,
            "INT64" => ScalarTypeName::Int64,
            "FLOAT32" => ScalarTypeName::Float32,
            "FLOAT64" => ScalarTypeName::Float64,
            "NUMERIC" => ScalarTypeName::Numeric,
            "STRING" => ScalarTypeName::String,
            "BYTES" => ScalarTypeName::Bytes,
            "DATE" => ScalarTypeName::Date,
            "TIMESTAMP" => ScalarTypeName::Timestamp,
            "JSON" => ScalarTypeName::Json,
            "INTERVAL" => ScalarTypeName::Interval,
            "TOKENLIST" => ScalarTypeName::Tokenlist,
            "UUID" => ScalarTypeName::Uuid,
            _ => return None,
        };
        Some(name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarTypeName::Bool => "BOOL",
            ScalarTypeName::Int64 => "INT64",
            ScalarTypeName::Float32 => "FLOAT32",
            ScalarTypeName::Float64 => "FLOAT64",
            ScalarTypeName::Numeric => "NUMERIC",
            ScalarTypeName::String => "STRING",
            ScalarTypeName::Bytes => "BYTES",
            ScalarTypeName::Date => "DATE",
            ScalarTypeName::Timestamp => "TIMESTAMP",
            ScalarTypeName::Json => "JSON",
            ScalarTypeName::Interval => "INTERVAL",
            ScalarTypeName::Tokenlist => "TOKENLIST",
            ScalarTypeName::Uuid => "UUID",
        }
    }

    /// Whether the type takes a `(length)` argument.
    pub fn is_sized(&self) -> bool {
        matches!(self, ScalarTypeName::String | ScalarTypeName::Bytes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSize {
    Max,
    Value(IntValue),
}

impl TypeSize {
    pub fn sql(&self) -> String {
        match self {
            TypeSize::Max => "MAX".to_string(),
            TypeSize::Value(value) => value.sql(),
        }
    }
}

/// An integer position in the grammar that also accepts parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntValue {
    /// Literal digits as written (decimal or `0x` hex).
    Literal(String),
    /// `@name`, stored without the `@`.
    Param(String),
    /// `CAST(value AS INT64)`.
    Cast(Box<IntValue>),
}

impl IntValue {
    pub fn sql(&self) -> String {
        match self {
            IntValue::Literal(text) => text.clone(),
            IntValue::Param(name) => format!("@{name}"),
            IntValue::Cast(inner) => format!("CAST({} AS INT64)", inner.sql()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_type_sql() {
        let ty = SchemaType::Array(Box::new(SchemaType::Sized {
            name: ScalarTypeName::String,
            size: TypeSize::Value(IntValue::Cast(Box::new(IntValue::Param("len".into())))),
        }));
        assert_eq!(ty.sql(), "ARRAY<STRING(CAST(@len AS INT64))>");

        let ty = SchemaType::Struct(vec![
            StructField { name: Some(Ident::new("a")), ty: SchemaType::Scalar(ScalarTypeName::Int64) },
            StructField { name: None, ty: SchemaType::Named(vec![Ident::new("pkg"), Ident::new("Msg")]) },
        ]);
        assert_eq!(ty.sql(), "STRUCT<a INT64, pkg.Msg>");
    }

    #[test]
    fn test_scalar_keyword_lookup() {
        assert_eq!(ScalarTypeName::from_keyword("int64"), Some(ScalarTypeName::Int64));
        assert_eq!(ScalarTypeName::from_keyword("Bytes"), Some(ScalarTypeName::Bytes));
        assert_eq!(ScalarTypeName::from_keyword("Singer"), None);
        assert!(ScalarTypeName::String.is_sized());
        assert!(!ScalarTypeName::Date.is_sized());
    }

    #[test]
    fn test_path_parse() {
        let path = Path::parse("analytics.Events");
        assert_eq!(path.idents, vec![Ident::new("analytics"), Ident::new("Events")]);
    }
}
