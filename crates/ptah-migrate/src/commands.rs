//! Implementation of the `ptah` subcommands.
//!
//! Each command takes already-loaded schemas and returns the text to print,
//! so the binary only deals with argument parsing and IO.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use ptah_core::ast::from_schema::schema_statements;
use ptah_core::differ::{SchemaDiff, compare_schemas};
use ptah_core::formatter::{format_database_schema, format_generated_schema, format_schema_diff};
use ptah_core::renderer::{Dialect, renderer_for};
use ptah_core::schema::{DatabaseSchema, GeneratedSchema};

use crate::error::{MigrateError, Result};

/// Output format of `compare`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// The diff as pretty-printed JSON.
    Json,
}

/// Compares the schemas and formats the diff.
///
/// # Errors
///
/// Fails only if the diff cannot be serialized.
pub fn compare(
    generated: &GeneratedSchema,
    database: &DatabaseSchema,
    format: OutputFormat,
) -> Result<String> {
    let diff = compare_schemas(generated, database);
    match format {
        OutputFormat::Text => Ok(format_schema_diff(&diff)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&diff)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Returns the migration script for `dialect`, or a comment saying there
/// is nothing to do.
///
/// # Errors
///
/// Fails if `database` was introspected from another dialect.
pub fn migrate_sql(
    generated: &GeneratedSchema,
    database: &DatabaseSchema,
    dialect: &str,
) -> Result<String> {
    check_dialect(database, dialect)?;
    let diff = compare_schemas(generated, database);
    Ok(match migration_script(&diff, generated, dialect) {
        Some(script) => script,
        None => "-- No schema changes detected\n".to_string(),
    })
}

/// Rejects SQL for a dialect other than the one the database was read from.
fn check_dialect(database: &DatabaseSchema, dialect: &str) -> Result<()> {
    let recorded = Dialect::from_name(&database.dialect);
    let requested = Dialect::from_name(dialect);
    if recorded.name().trim().eq_ignore_ascii_case(requested.name().trim()) {
        Ok(())
    } else {
        Err(MigrateError::DialectMismatch {
            database: recorded.name().to_string(),
            requested: requested.name().to_string(),
        })
    }
}

fn migration_script(diff: &SchemaDiff, generated: &GeneratedSchema, dialect: &str) -> Option<String> {
    let statements = diff.migration_sql(generated, dialect);
    if statements.is_empty() {
        return None;
    }
    let mut script = statements.join("\n\n");
    script.push('\n');
    Some(script)
}

/// Returns `<YYYYMMDDHHMMSS>_<name>.<dialect>.sql`.
///
/// The name is lowercased and anything but ASCII letters and digits
/// becomes `_`.
#[must_use]
pub fn migration_file_name(name: &str, dialect: &str, at: DateTime<Utc>) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let slug = slug.trim_matches('_');
    let slug = if slug.is_empty() { "migration" } else { slug };

    format!(
        "{}_{slug}.{}.sql",
        at.format("%Y%m%d%H%M%S"),
        Dialect::from_name(dialect).name()
    )
}

/// Writes a migration file into `output_dir` and returns its path, or
/// `None` when the schemas already match.
///
/// # Errors
///
/// Fails if `database` was introspected from another dialect, the
/// directory cannot be created, the file already exists, or the file
/// cannot be written.
pub fn generate(
    generated: &GeneratedSchema,
    database: &DatabaseSchema,
    dialect: &str,
    name: &str,
    output_dir: &Path,
    at: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    check_dialect(database, dialect)?;
    let diff = compare_schemas(generated, database);
    let Some(script) = migration_script(&diff, generated, dialect) else {
        info!("No schema changes detected, nothing to generate.");
        return Ok(None);
    };

    fs::create_dir_all(output_dir).map_err(|source| MigrateError::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(migration_file_name(name, dialect, at));
    if path.exists() {
        return Err(MigrateError::MigrationExists(path));
    }

    let content = format!(
        "-- Migration: {name}\n-- Dialect: {}\n-- Generated: {}\n\n{script}",
        Dialect::from_name(dialect).name(),
        at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    fs::write(&path, content).map_err(|source| MigrateError::Write {
        path: path.clone(),
        source,
    })?;

    if script.contains("-- WARNING") {
        warn!(path = %path.display(), "migration contains changes that need manual review");
    }
    info!(path = %path.display(), "created migration");
    Ok(Some(path))
}

/// Renders the full creation script of the declared schema.
///
/// # Errors
///
/// Fails if a statement cannot be rendered, e.g. a foreign key without
/// a reference.
pub fn render(generated: &GeneratedSchema, dialect: &str) -> Result<String> {
    let statements = schema_statements(generated, dialect);
    Ok(renderer_for(dialect).render_schema(&statements)?)
}

/// Describes an introspected database.
#[must_use]
pub fn describe_database(database: &DatabaseSchema) -> String {
    format_database_schema(database)
}

/// Describes the declared schema.
#[must_use]
pub fn describe_generated(generated: &GeneratedSchema) -> String {
    format_generated_schema(generated)
}
