//! Spanner DDL statement source for spanspy.
//!
//! This crate handles:
//! - Tokenizing DDL text
//! - Parsing statements into the [`ast`] tree consumed by the schema builder
//! - Reporting malformed input with line and column positions

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::Ddl;
pub use parser::{parse_ddl, parse_ddls, Parser};
