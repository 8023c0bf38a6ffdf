//! Canonical rendering of names and column types.

use itertools::Itertools;
use spanspy_core::TypeError;
use spanspy_ddl::ast::{Ident, IntValue, Path, SchemaType, TypeSize};

/// A column type reduced to its canonical name plus the array flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedType {
    pub type_name: String,
    pub is_array: bool,
}

impl FormattedType {
    fn scalar(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            is_array: false,
        }
    }
}

/// Render a declared column type.
///
/// Arrays keep the element's rendering and set `is_array`; an array of
/// arrays collapses to the same single flag.
pub fn format_schema_type(ty: &SchemaType) -> Result<FormattedType, TypeError> {
    match ty {
        SchemaType::Scalar(name) => Ok(FormattedType::scalar(name.as_str())),
        SchemaType::Sized { name, size } => {
            let size = format_size(name.as_str(), size)?;
            Ok(FormattedType::scalar(format!("{}({})", name.as_str(), size)))
        }
        SchemaType::Array(item) => {
            let inner = format_schema_type(item)?;
            Ok(FormattedType {
                type_name: inner.type_name,
                is_array: true,
            })
        }
        SchemaType::Named(path) => {
            let joined = join_idents(path);
            if joined.is_empty() {
                return Err(TypeError::EmptyPath);
            }
            Ok(FormattedType::scalar(joined))
        }
        other => Ok(FormattedType::scalar(other.sql())),
    }
}

fn format_size(type_name: &str, size: &TypeSize) -> Result<String, TypeError> {
    match size {
        TypeSize::Max => Ok("MAX".to_string()),
        TypeSize::Value(value) => {
            let rendered = format_int_value(value);
            if let IntValue::Literal(_) = innermost(value) {
                if !is_integer_literal(&rendered) {
                    return Err(TypeError::MalformedSize {
                        type_name: type_name.to_string(),
                        size: rendered,
                    });
                }
            }
            Ok(rendered)
        }
    }
}

/// Render an integer position: digits as written, `@name` for parameters,
/// casts unwrapped to their operand.
pub fn format_int_value(value: &IntValue) -> String {
    match value {
        IntValue::Literal(text) => text.clone(),
        IntValue::Param(name) => format!("@{name}"),
        IntValue::Cast(inner) => format_int_value(inner),
    }
}

fn innermost(value: &IntValue) -> &IntValue {
    match value {
        IntValue::Cast(inner) => innermost(inner),
        other => other,
    }
}

fn is_integer_literal(text: &str) -> bool {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()),
    }
}

pub fn ident_name(ident: &Ident) -> &str {
    &ident.name
}

pub fn path_to_string(path: &Path) -> String {
    join_idents(&path.idents)
}

fn join_idents(idents: &[Ident]) -> String {
    if idents.iter().all(|i| i.name.is_empty()) {
        return String::new();
    }
    idents.iter().map(ident_name).join(".")
}

/// Identifier names in order, skipping empty ones.
pub fn ident_list(idents: &[Ident]) -> Vec<String> {
    idents
        .iter()
        .map(ident_name)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// `Some(text)` unless `text` is empty.
pub(crate) fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
