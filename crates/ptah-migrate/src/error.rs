//! Error types for the command-line tool.

use std::path::PathBuf;

use ptah_core::PtahError;

/// Errors that can occur while loading schemas or writing migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A schema file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A schema file is not valid JSON for the expected model.
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A migration file could not be written.
    #[error("Failed to write '{path}': {source}")]
    Write {
        /// Path of the file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The database file was introspected from a different dialect than
    /// the one SQL is requested for.
    #[error("Database schema is for '{database}' but SQL was requested for '{requested}'")]
    DialectMismatch {
        /// Dialect recorded in the database schema.
        database: String,
        /// Dialect passed on the command line.
        requested: String,
    },

    /// Migration file already exists.
    #[error("Migration file already exists: {0}")]
    MigrationExists(PathBuf),

    /// SQL rendering failed.
    #[error("Render error: {0}")]
    Render(#[from] PtahError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
