//! Incremental schema builder.
//!
//! [`SchemaBuilder`] folds an ordered DDL stream into the schema model one
//! statement at a time. The first error aborts the fold; statements applied
//! before it are not rolled back, so callers must discard the builder.

use crate::derive::{
    collect_primary_keys, convert_column, convert_index_keys, convert_row_deletion_policy, foreign_key_draft,
    ForeignKeyDraft,
};
use crate::format::{ident_list, ident_name, non_empty, path_to_string};
use spanspy_core::{Error, ForeignKey, Index, Result, Schema, Table};
use spanspy_ddl::ast::{AlterTable, CreateIndex, CreateTable, Ddl, TableAlteration};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Builds a [`Schema`] from parsed DDL statements.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    /// Tables in creation order.
    pub(crate) tables: Vec<Table>,
    /// Table name to position in `tables`.
    table_index: HashMap<String, usize>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
    pub(crate) indexes: Vec<Index>,
    /// Number of anonymous foreign keys named so far.
    fk_counter: usize,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one statement. Statements without a relational effect are ignored.
    pub fn consume(&mut self, ddl: &Ddl) -> Result<()> {
        debug!(kind = ddl.kind(), "consuming statement");
        match ddl {
            Ddl::CreateTable(stmt) => self.create_table(stmt),
            Ddl::AlterTable(stmt) => self.alter_table(stmt),
            Ddl::CreateIndex(stmt) => self.create_index(stmt),
            Ddl::Other(other) => {
                trace!(kind = %other.kind, "ignoring statement");
                Ok(())
            }
        }
    }

    fn create_table(&mut self, stmt: &CreateTable) -> Result<()> {
        let name = path_to_string(&stmt.name);
        if name.is_empty() {
            return Err(Error::MissingName {
                statement: "CREATE TABLE".to_string(),
                what: "name",
            });
        }
        if self.table_index.contains_key(&name) {
            return Err(Error::DuplicateTable(name));
        }

        let mut table = Table::new(name.clone());
        for def in &stmt.columns {
            let column = convert_column(def).map_err(|source| Error::ColumnType {
                table: name.clone(),
                column: ident_name(&def.name).to_string(),
                source,
            })?;
            table.columns.push(column);
        }

        table.primary_key = collect_primary_keys(stmt);
        table.row_deletion_policy = stmt.row_deletion_policy.as_ref().and_then(convert_row_deletion_policy);
        table.interleaved_in = stmt
            .cluster
            .as_ref()
            .and_then(|cluster| non_empty(path_to_string(&cluster.table_name)));

        for constraint in &stmt.constraints {
            if let Some(draft) = foreign_key_draft(&name, constraint) {
                self.add_foreign_key(draft);
            }
        }

        debug!(table = %name, columns = table.columns.len(), "created table");
        self.table_index.insert(name, self.tables.len());
        self.tables.push(table);
        Ok(())
    }

    fn alter_table(&mut self, stmt: &AlterTable) -> Result<()> {
        let name = path_to_string(&stmt.name);
        let Some(&position) = self.table_index.get(&name) else {
            return Err(Error::UnknownTable(name));
        };

        match &stmt.alteration {
            TableAlteration::AddColumn { column: def, .. } => {
                let column = convert_column(def).map_err(|source| Error::ColumnType {
                    table: name.clone(),
                    column: ident_name(&def.name).to_string(),
                    source,
                })?;
                self.tables[position].columns.push(column);
            }
            TableAlteration::AddTableConstraint(constraint) => {
                if let Some(draft) = foreign_key_draft(&name, constraint) {
                    self.add_foreign_key(draft);
                }
            }
            TableAlteration::DropColumn(column) => {
                let column = ident_name(column);
                if !column.is_empty() {
                    let table = &mut self.tables[position];
                    table.columns.retain(|c| c.name != column);
                    table.primary_key.retain(|k| k != column);
                }
            }
            TableAlteration::DropConstraint(constraint) => {
                self.drop_foreign_key(ident_name(constraint));
            }
            TableAlteration::SetInterleaveIn(cluster) => {
                self.tables[position].interleaved_in = non_empty(path_to_string(&cluster.table_name));
            }
            TableAlteration::AddRowDeletionPolicy(policy) | TableAlteration::ReplaceRowDeletionPolicy(policy) => {
                self.tables[position].row_deletion_policy = convert_row_deletion_policy(policy);
            }
            TableAlteration::DropRowDeletionPolicy => {
                self.tables[position].row_deletion_policy = None;
            }
            other => {
                trace!(table = %name, alteration = ?other, "ignoring alteration");
            }
        }

        Ok(())
    }

    fn create_index(&mut self, stmt: &CreateIndex) -> Result<()> {
        let name = path_to_string(&stmt.name);
        if name.is_empty() {
            return Err(Error::MissingName {
                statement: "CREATE INDEX".to_string(),
                what: "name",
            });
        }
        let table = path_to_string(&stmt.table_name);
        if table.is_empty() {
            return Err(Error::MissingName {
                statement: format!("CREATE INDEX {name}"),
                what: "table name",
            });
        }

        let index = Index {
            name,
            table,
            columns: convert_index_keys(&stmt.keys),
            storing: stmt.storing.as_deref().map(ident_list).unwrap_or_default(),
            interleaved_in: stmt
                .interleave_in
                .as_ref()
                .and_then(|parent| non_empty(ident_name(parent).to_string())),
            is_unique: stmt.unique,
            is_null_filtered: stmt.null_filtered,
        };

        debug!(index = %index.name, table = %index.table, "created index");
        self.indexes.push(index);
        Ok(())
    }

    fn add_foreign_key(&mut self, draft: ForeignKeyDraft) {
        let name = match draft.name {
            Some(name) => name,
            None => self.synthesize_foreign_key_name(&draft.referencing_table, &draft.referencing_columns),
        };
        self.foreign_keys.push(ForeignKey {
            name,
            referencing_table: draft.referencing_table,
            referencing_columns: draft.referencing_columns,
            referenced_table: draft.referenced_table,
            referenced_columns: draft.referenced_columns,
        });
    }

    /// `<table>_<cols>_fk`, or `<table>_ref_<n>_fk` when there are no columns.
    fn synthesize_foreign_key_name(&mut self, table: &str, columns: &[String]) -> String {
        let suffix = if columns.is_empty() {
            format!("ref_{}", self.fk_counter)
        } else {
            columns.join("_")
        };
        self.fk_counter += 1;
        let name = format!("{table}_{suffix}_fk");
        debug!(foreign_key = %name, "synthesized foreign key name");
        name
    }

    /// Remove every foreign key named `name`, whichever table declared it.
    fn drop_foreign_key(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        self.foreign_keys.retain(|fk| fk.name != name);
    }
}

/// Fold a whole statement stream into a schema.
pub fn build_schema(ddls: &[Ddl]) -> Result<Schema> {
    let mut builder = SchemaBuilder::new();
    for ddl in ddls {
        builder.consume(ddl)?;
    }
    Ok(builder.snapshot())
}
