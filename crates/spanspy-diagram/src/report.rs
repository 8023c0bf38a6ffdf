use crate::mermaid::render_mermaid;
use crate::model::{build_diagram, DiagramModel};
use serde::Serialize;
use spanspy_core::{Result, Schema};

/// Renders a schema in each of the supported output formats.
pub struct Report {
    schema: Schema,
}

impl Report {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn diagram(&self) -> DiagramModel {
        build_diagram(&self.schema)
    }

    /// The schema document as JSON.
    pub fn schema_json(&self, pretty: bool) -> Result<String> {
        to_json(&self.schema, pretty)
    }

    /// The diagram model as JSON.
    pub fn diagram_json(&self, pretty: bool) -> Result<String> {
        to_json(&self.diagram(), pretty)
    }

    /// The diagram as Mermaid text.
    pub fn mermaid(&self) -> String {
        render_mermaid(&self.diagram())
    }
}

/// Compact, or indented by two spaces when `pretty` is set.
fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
