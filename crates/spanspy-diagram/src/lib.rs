//! Diagram rendering for spanspy schemas.
//!
//! This crate provides:
//! - An entity-relationship model derived from a schema
//! - Mermaid `erDiagram` rendering
//! - Report output in every supported format

pub mod mermaid;
pub mod model;
pub mod report;

pub use mermaid::render_mermaid;
pub use model::{build_diagram, DiagramEdge, DiagramModel, DiagramNode};
pub use report::Report;
