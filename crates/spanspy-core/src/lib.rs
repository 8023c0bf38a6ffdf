//! Core types and schemas for spanspy.
//!
//! This crate defines the relational schema model produced from Spanner DDL
//! and the error type shared by every other crate in the workspace. It
//! contains no build logic, only type definitions and their wire layout.

pub mod error;
pub mod schema;

pub use error::{Error, Result, SourceError, TypeError};
pub use schema::{
    Column, ForeignKey, Index, IndexKey, Nullability, RowDeletionPolicy, Schema, SortDirection,
    Table,
};
