//! # ptah-core
//!
//! Schema representation, SQL rendering and schema diffing for
//! PostgreSQL, MySQL and MariaDB.
//!
//! This crate provides:
//! - A closed DDL syntax tree with a visitor interface
//! - Dialect renderers that turn the tree into SQL text
//! - A differ comparing the schema declared by code with an introspected
//!   database, and the migration SQL that reconciles them
//! - Plain-text reports for schemas and diffs
//!
//! ## Rendering
//!
//! ```rust
//! use ptah_core::ast::builder::TableBuilder;
//! use ptah_core::ast::Node;
//! use ptah_core::renderer::renderer_for;
//!
//! let table = TableBuilder::new("users")
//!     .column("id", "SERIAL").primary().end()
//!     .column("email", "VARCHAR(255)").not_null().unique().end()
//!     .build();
//!
//! let sql = renderer_for("mysql").render(&Node::CreateTable(table)).unwrap();
//! assert!(sql.contains("id INT PRIMARY KEY AUTO_INCREMENT"));
//! ```
//!
//! ## Diffing
//!
//! ```rust
//! use ptah_core::differ::compare_schemas;
//! use ptah_core::schema::{DatabaseSchema, Field, GeneratedSchema, Table};
//!
//! let generated = GeneratedSchema::new()
//!     .table(Table::new("User", "users"))
//!     .field(Field::new("User", "id", "SERIAL").primary());
//! let database = DatabaseSchema::new("postgres");
//!
//! let diff = compare_schemas(&generated, &database);
//! let sql = diff.migration_sql(&generated, "postgres");
//! assert_eq!(sql, vec!["CREATE TABLE users (\n  id SERIAL PRIMARY KEY\n);"]);
//! ```

pub mod ast;
pub mod differ;
pub mod error;
pub mod formatter;
pub mod renderer;
pub mod schema;

pub use ast::{Accept, Node, StatementList, Visitor};
pub use differ::{SchemaDiff, compare_schemas};
pub use error::{PtahError, Result};
pub use formatter::{format_database_schema, format_generated_schema, format_schema_diff};
pub use renderer::{Dialect, RenderVisitor, renderer_for};
