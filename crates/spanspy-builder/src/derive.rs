//! Conversions from statement nodes to schema model values.

use crate::format::{format_int_value, format_schema_type, ident_list, ident_name, non_empty, path_to_string};
use indexmap::IndexSet;
use spanspy_core::{Column, IndexKey, Nullability, RowDeletionPolicy, TypeError};
use spanspy_ddl::ast::{self, Constraint, CreateTable, TableConstraint};

/// Convert a column definition. Both `NOT NULL` and an inline `PRIMARY KEY`
/// make the column known not-null.
pub fn convert_column(def: &ast::ColumnDef) -> Result<Column, TypeError> {
    let formatted = format_schema_type(&def.ty)?;
    let nullability = if def.primary_key || def.not_null {
        Nullability::NotNull
    } else {
        Nullability::Unknown
    };
    Ok(Column {
        name: ident_name(&def.name).to_string(),
        type_name: formatted.type_name,
        is_array: formatted.is_array,
        nullability,
        comment: None,
    })
}

/// Ordered, duplicate-free primary key of a new table.
///
/// Explicit `PRIMARY KEY (...)` entries come first in clause order; columns
/// flagged inline follow in declaration order unless already listed.
pub fn collect_primary_keys(stmt: &CreateTable) -> Vec<String> {
    let clause = stmt.primary_keys.iter().map(|key| ident_name(&key.name));
    let inline = stmt
        .columns
        .iter()
        .filter(|col| col.primary_key)
        .map(|col| ident_name(&col.name));

    let keys: IndexSet<&str> = clause.chain(inline).filter(|name| !name.is_empty()).collect();
    keys.into_iter().map(str::to_string).collect()
}

/// A foreign key whose name may still need to be synthesized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDraft {
    pub name: Option<String>,
    pub referencing_table: String,
    pub referencing_columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// Extract the foreign key declared by `constraint`, if it is one.
pub fn foreign_key_draft(owner: &str, constraint: &TableConstraint) -> Option<ForeignKeyDraft> {
    let Constraint::ForeignKey(fk) = &constraint.constraint else {
        return None;
    };
    Some(ForeignKeyDraft {
        name: constraint
            .name
            .as_ref()
            .and_then(|name| non_empty(ident_name(name).to_string())),
        referencing_table: owner.to_string(),
        referencing_columns: ident_list(&fk.columns),
        referenced_table: path_to_string(&fk.reference_table),
        referenced_columns: ident_list(&fk.reference_columns),
    })
}

/// A policy without a column name is treated as absent.
pub fn convert_row_deletion_policy(node: &ast::RowDeletionPolicy) -> Option<RowDeletionPolicy> {
    let column_name = non_empty(ident_name(&node.column_name).to_string())?;
    Some(RowDeletionPolicy {
        column_name,
        num_days: format_int_value(&node.num_days),
    })
}

pub fn convert_index_keys(keys: &[ast::IndexKey]) -> Vec<IndexKey> {
    keys.iter()
        .map(|key| IndexKey {
            name: ident_name(&key.name).to_string(),
            direction: key.dir,
        })
        .collect()
}
