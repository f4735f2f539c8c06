//! Appwrite schema documents.
//!
//! This module handles:
//! - Projecting `appwrite.config.json` text into typed databases, tables and columns
//! - Re-indenting the raw JSON text for `--format-json`

mod parser;
mod types;

pub use parser::{format_source, from_value, parse};
pub use types::{
    Column, ColumnKind, Database, OnDelete, RelationSide, RelationType, Relationship,
    SchemaDocument, Table,
};
