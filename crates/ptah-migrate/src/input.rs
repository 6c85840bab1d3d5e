//! Loading of JSON schema files.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use ptah_core::schema::{DatabaseSchema, GeneratedSchema};

use crate::error::{MigrateError, Result};

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| MigrateError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| MigrateError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the schema declared by application code.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a valid schema.
pub fn load_generated(path: &Path) -> Result<GeneratedSchema> {
    let schema: GeneratedSchema = load(path)?;
    debug!(
        path = %path.display(),
        tables = schema.tables.len(),
        fields = schema.fields.len(),
        "loaded generated schema"
    );
    Ok(schema)
}

/// Loads an introspected database schema. A file without a `dialect`
/// takes `fallback_dialect`.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a valid schema.
pub fn load_database(path: &Path, fallback_dialect: &str) -> Result<DatabaseSchema> {
    let mut schema: DatabaseSchema = load(path)?;
    if schema.dialect.trim().is_empty() {
        schema.dialect = fallback_dialect.to_string();
    }
    debug!(
        path = %path.display(),
        dialect = %schema.dialect,
        tables = schema.tables.len(),
        "loaded database schema"
    );
    Ok(schema)
}
