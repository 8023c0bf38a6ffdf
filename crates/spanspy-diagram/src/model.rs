use serde::Serialize;
use spanspy_core::{Column, Schema, Table};
use tracing::debug;

/// Edge label used for parent/child interleaving.
pub const INTERLEAVED_IN: &str = "INTERLEAVED IN";

/// Tables and the relationships between them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagramModel {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
}

/// One table. Each field is a preformatted column line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Derive the diagram of `schema`.
///
/// Foreign key edges come first in schema order, followed by one edge per
/// interleaved table.
pub fn build_diagram(schema: &Schema) -> DiagramModel {
    let nodes: Vec<DiagramNode> = schema.tables.iter().map(table_node).collect();

    let foreign = schema.foreign_keys().iter().map(|fk| DiagramEdge {
        from: fk.referencing_table.clone(),
        to: fk.referenced_table.clone(),
        label: (!fk.name.is_empty()).then(|| fk.name.clone()),
    });
    let interleaved = schema.tables.iter().filter_map(|table| {
        table.interleaved_in.as_ref().map(|parent| DiagramEdge {
            from: table.name.clone(),
            to: parent.clone(),
            label: Some(INTERLEAVED_IN.to_string()),
        })
    });
    let edges: Vec<DiagramEdge> = foreign.chain(interleaved).collect();

    debug!(nodes = nodes.len(), edges = edges.len(), "built diagram");
    DiagramModel { nodes, edges }
}

fn table_node(table: &Table) -> DiagramNode {
    DiagramNode {
        id: table.name.clone(),
        label: table.name.clone(),
        fields: table
            .columns
            .iter()
            .map(|column| format_field(column, table.is_primary_key(&column.name)))
            .collect(),
    }
}

/// `[*]name: TYPE[[]]` followed by `!` for known not-null columns and `?` otherwise.
pub fn format_field(column: &Column, is_primary_key: bool) -> String {
    let marker = if is_primary_key { "*" } else { "" };
    let array = if column.is_array { "[]" } else { "" };
    let nullable = if column.nullability.is_not_null() { "!" } else { "?" };
    format!("{marker}{}: {}{array}{nullable}", column.name, column.type_name)
}
