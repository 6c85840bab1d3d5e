//! Schema comparison and migration SQL from the command line.
//!
//! `ptah-migrate` reads schemas serialised as JSON, one describing what the
//! application declares and one describing what the database contains, and
//! uses `ptah-core` to compare them and produce SQL. It never connects to a
//! database.
//!
//! # CLI Usage
//!
//! ```bash
//! # Show what differs
//! ptah compare --generated schema.json --database db.json
//!
//! # Print the migration script
//! ptah --dialect mysql migrate-sql --generated schema.json --database db.json
//!
//! # Write it to migrations/<timestamp>_add_email.postgres.sql
//! ptah generate --generated schema.json --database db.json --name add_email
//!
//! # Full creation script for an empty database
//! ptah render --generated schema.json
//! ```

pub mod commands;
pub mod error;
pub mod input;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::commands::{
        OutputFormat, compare, describe_database, describe_generated, generate, migrate_sql,
        migration_file_name, render,
    };
    pub use crate::error::{MigrateError, Result};
    pub use crate::input::{load_database, load_generated};
}
