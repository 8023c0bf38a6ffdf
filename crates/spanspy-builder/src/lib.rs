//! Schema construction for spanspy.
//!
//! This crate provides:
//! - Incremental folding of parsed DDL into the schema model
//! - Canonical type and name rendering
//! - Point-in-time snapshots of the schema being built

pub mod builder;
pub mod derive;
pub mod format;
mod snapshot;

pub use builder::{build_schema, SchemaBuilder};
pub use format::{format_schema_type, FormattedType};
