use crate::builder::SchemaBuilder;
use spanspy_core::Schema;

impl SchemaBuilder {
    /// Copy out the current schema.
    ///
    /// The result shares nothing with the builder; later statements do not
    /// change it. Empty foreign key and index lists become `None`.
    pub fn snapshot(&self) -> Schema {
        Schema {
            tables: self.tables.clone(),
            foreign_keys: (!self.foreign_keys.is_empty()).then(|| self.foreign_keys.clone()),
            indexes: (!self.indexes.is_empty()).then(|| self.indexes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spanspy_ddl::parse_ddls;

    fn apply(builder: &mut SchemaBuilder, sql: &str) {
        for ddl in parse_ddls("test.sql", sql).unwrap() {
            builder.consume(&ddl).unwrap();
        }
    }

    #[test]
    fn test_empty_builder() {
        let schema = SchemaBuilder::new().snapshot();
        assert_eq!(schema, Schema::default());
        assert_eq!(serde_json::to_value(&schema).unwrap(), json!({"tables": []}));
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut builder = SchemaBuilder::new();
        apply(&mut builder, "CREATE TABLE Users (Id INT64 NOT NULL) PRIMARY KEY (Id)");
        let before = builder.snapshot();

        apply(
            &mut builder,
            "ALTER TABLE Users ADD COLUMN Name STRING(10);
             CREATE TABLE Orders (UserId INT64, FOREIGN KEY (UserId) REFERENCES Users (Id)) PRIMARY KEY (UserId);
             CREATE INDEX UsersByName ON Users (Name)",
        );
        let after = builder.snapshot();

        assert_eq!(before.tables.len(), 1);
        assert_eq!(before.tables[0].columns.len(), 1);
        assert_eq!(before.foreign_keys, None);
        assert_eq!(before.indexes, None);

        assert_eq!(after.tables.len(), 2);
        assert_eq!(after.tables[0].columns.len(), 2);
        assert_eq!(after.foreign_keys().len(), 1);
        assert_eq!(after.indexes().len(), 1);
    }

    #[test]
    fn test_lists_collapse_after_removal() {
        let mut builder = SchemaBuilder::new();
        apply(
            &mut builder,
            "CREATE TABLE Orders (UserId INT64, CONSTRAINT FK FOREIGN KEY (UserId) REFERENCES Users (Id)) PRIMARY KEY (UserId)",
        );
        assert!(builder.snapshot().foreign_keys.is_some());

        apply(&mut builder, "ALTER TABLE Orders DROP CONSTRAINT FK");
        let value = serde_json::to_value(builder.snapshot()).unwrap();
        assert!(value.get("foreignKeys").is_none());
        assert!(value.get("indexes").is_none());
    }

    #[test]
    fn test_repeated_snapshots_are_equal() {
        let mut builder = SchemaBuilder::new();
        apply(
            &mut builder,
            "CREATE TABLE T (A INT64) PRIMARY KEY (A);
             CREATE INDEX ByA ON T (A DESC)",
        );
        assert_eq!(builder.snapshot(), builder.snapshot());
    }
}
