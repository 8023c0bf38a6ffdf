//! Mermaid `erDiagram` output.

use crate::model::DiagramModel;
use itertools::Itertools;
use std::iter;

/// Render `model` as Mermaid text, one statement per line, without a
/// trailing newline.
pub fn render_mermaid(model: &DiagramModel) -> String {
    let entities = model.nodes.iter().flat_map(|node| {
        iter::once(format!("  {} {{", mermaid_id(&node.id)))
            .chain(node.fields.iter().map(|field| format!("    {field}")))
            .chain(iter::once("  }".to_string()))
    });

    let relationships = model.edges.iter().map(|edge| {
        let label = edge.label.as_deref().map(|l| format!(" : {l}")).unwrap_or_default();
        format!("  {} }}o--|| {}{label}", mermaid_id(&edge.from), mermaid_id(&edge.to))
    });

    iter::once("erDiagram".to_string())
        .chain(entities)
        .chain(relationships)
        .join("\n")
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
fn mermaid_id(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiagramEdge, DiagramNode};

    #[test]
    fn test_render_mermaid() {
        let model = DiagramModel {
            nodes: vec![
                DiagramNode {
                    id: "Users".to_string(),
                    label: "Users".to_string(),
                    fields: vec!["*Id: STRING(36)!".to_string(), "Name: STRING(100)?".to_string()],
                },
                DiagramNode {
                    id: "shop.Orders".to_string(),
                    label: "shop.Orders".to_string(),
                    fields: vec![],
                },
            ],
            edges: vec![
                DiagramEdge {
                    from: "shop.Orders".to_string(),
                    to: "Users".to_string(),
                    label: Some("Orders_UserId_fk".to_string()),
                },
                DiagramEdge {
                    from: "Users".to_string(),
                    to: "shop.Orders".to_string(),
                    label: None,
                },
            ],
        };

        let expected = "erDiagram
  Users {
    *Id: STRING(36)!
    Name: STRING(100)?
  }
  shop_Orders {
  }
  shop_Orders }o--|| Users : Orders_UserId_fk
  Users }o--|| shop_Orders";
        assert_eq!(render_mermaid(&model), expected);
    }

    #[test]
    fn test_empty_model() {
        assert_eq!(render_mermaid(&DiagramModel::default()), "erDiagram");
    }

    #[test]
    fn test_mermaid_id() {
        assert_eq!(mermaid_id("my-table.v2"), "my_table_v2");
        assert_eq!(mermaid_id("Ünïcode"), "_n_code");
    }
}
