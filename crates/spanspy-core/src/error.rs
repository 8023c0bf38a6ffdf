use std::fmt;
use thiserror::Error;

/// Errors never repeat their source in `Display`; render the whole chain
/// with `{:#}` through `anyhow`.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{statement} is missing a {what}")]
    MissingName { statement: String, what: &'static str },

    #[error("table {0:?} already exists")]
    DuplicateTable(String),

    #[error("ALTER TABLE references unknown table {0:?}")]
    UnknownTable(String),

    #[error("table {table} column {column}")]
    ColumnType {
        table: String,
        column: String,
        #[source]
        source: TypeError,
    },
}

/// A malformed statement reported by the DDL parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    /// Name of the input (file path or `<stdin>`).
    pub source_name: String,
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based column of the offending token.
    pub column: usize,
    pub message: String,
}

impl SourceError {
    pub fn new(source_name: impl Into<String>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.source_name, self.line, self.column, self.message)
    }
}

impl std::error::Error for SourceError {}

/// Failure to render a declared column type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("size {size:?} of {type_name} is not an integer")]
    MalformedSize { type_name: String, size: String },

    #[error("named type has an empty path")]
    EmptyPath,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::new("schema.sql", 3, 14, "expected ')' but found 'INT64'");
        assert_eq!(err.to_string(), "schema.sql:3:14: expected ')' but found 'INT64'");
        assert_eq!(Error::from(err.clone()).to_string(), err.to_string());
    }

    #[test]
    fn test_column_type_display() {
        let err = Error::ColumnType {
            table: "Users".to_string(),
            column: "Name".to_string(),
            source: TypeError::MalformedSize {
                type_name: "STRING".to_string(),
                size: "abc".to_string(),
            },
        };
        assert_eq!(err.to_string(), "table Users column Name");
        assert_eq!(
            std::error::Error::source(&err).map(|s| s.to_string()),
            Some("size \"abc\" of STRING is not an integer".to_string())
        );
    }

    #[test]
    fn test_transparent_errors_have_no_nested_source() {
        let err = Error::from(SourceError::new("t.sql", 1, 1, "boom"));
        assert!(std::error::Error::source(&err).is_none());

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json);
        assert_eq!(err.to_string(), "serialization error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_builder_errors_display() {
        let err = Error::MissingName {
            statement: "CREATE INDEX UsersByName".into(),
            what: "table name",
        };
        assert_eq!(err.to_string(), "CREATE INDEX UsersByName is missing a table name");
        assert_eq!(Error::DuplicateTable("Users".into()).to_string(), "table \"Users\" already exists");
        assert_eq!(
            Error::UnknownTable("Nope".into()).to_string(),
            "ALTER TABLE references unknown table \"Nope\""
        );
    }
}
