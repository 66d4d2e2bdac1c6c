//! Schema input: table descriptions from JSON files or SQL Server DDL

mod metadata;
mod schema_parser;

pub use metadata::*;
pub use schema_parser::*;
