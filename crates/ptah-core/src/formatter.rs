//! Human-readable reports for schemas and diffs.
//!
//! Reports are plain text meant for terminals and CI logs. Every function is
//! total: empty inputs produce a report saying so.

use crate::differ::{ColumnDiff, SchemaDiff, table_fields};
use crate::schema::{DatabaseSchema, DbColumn, Field, GeneratedSchema};

/// Header of a diff report with at least one change.
pub const DIFF_HEADER: &str = "=== SCHEMA DIFFERENCES DETECTED ===";
/// Header of a diff report without changes.
pub const NO_CHANGES_HEADER: &str = "=== NO SCHEMA CHANGES DETECTED ===";

/// Formats a schema diff.
///
/// ```rust
/// use ptah_core::differ::SchemaDiff;
/// use ptah_core::formatter::format_schema_diff;
///
/// let report = format_schema_diff(&SchemaDiff::default());
/// assert!(report.starts_with("=== NO SCHEMA CHANGES DETECTED ==="));
/// ```
#[must_use]
pub fn format_schema_diff(diff: &SchemaDiff) -> String {
    if !diff.has_changes() {
        return format!("{NO_CHANGES_HEADER}\nDatabase schema is up to date.\n");
    }

    let mut lines = vec![DIFF_HEADER.to_string(), String::new()];

    lines.push(format!(
        "Tables: +{} -{} ~{}",
        diff.tables_added.len(),
        diff.tables_removed.len(),
        diff.tables_modified.len()
    ));
    lines.extend(diff.tables_added.iter().map(|t| format!("  + {t}")));
    lines.extend(diff.tables_removed.iter().map(|t| format!("  - {t}")));
    for table in &diff.tables_modified {
        lines.push(format!("  ~ {}", table.table_name));
        lines.extend(table.columns_added.iter().map(|c| format!("      + column {c}")));
        lines.extend(table.columns_removed.iter().map(|c| format!("      - column {c}")));
        lines.extend(table.columns_modified.iter().map(column_change_line));
    }

    lines.push(format!(
        "Enums: +{} -{} ~{}",
        diff.enums_added.len(),
        diff.enums_removed.len(),
        diff.enums_modified.len()
    ));
    lines.extend(diff.enums_added.iter().map(|e| format!("  + {e}")));
    lines.extend(diff.enums_removed.iter().map(|e| format!("  - {e}")));
    for modified in &diff.enums_modified {
        let values: Vec<String> = modified
            .values_added
            .iter()
            .map(|v| format!("+{v}"))
            .chain(modified.values_removed.iter().map(|v| format!("-{v}")))
            .collect();
        lines.push(format!("  ~ {} ({})", modified.enum_name, values.join(", ")));
    }

    lines.push(format!(
        "Indexes: +{} -{}",
        diff.indexes_added.len(),
        diff.indexes_removed.len()
    ));
    lines.extend(diff.indexes_added.iter().map(|i| format!("  + {i}")));
    lines.extend(diff.indexes_removed.iter().map(|i| format!("  - {i}")));

    finish(lines)
}

fn column_change_line(column: &ColumnDiff) -> String {
    let changes: Vec<String> = column
        .changes
        .iter()
        .map(|(kind, change)| format!("{kind}: {change}"))
        .collect();
    format!("      ~ column {}: {}", column.column_name, changes.join("; "))
}

/// Formats an introspected database schema.
#[must_use]
pub fn format_database_schema(schema: &DatabaseSchema) -> String {
    let mut lines = vec![
        format!("=== DATABASE SCHEMA ({}) ===", schema.dialect),
        String::new(),
    ];

    lines.push(format!("Tables ({}):", schema.tables.len()));
    for table in &schema.tables {
        match table.comment {
            Some(ref comment) => lines.push(format!("  {} -- {comment}", table.name)),
            None => lines.push(format!("  {}", table.name)),
        }
        lines.extend(table.columns.iter().map(db_column_line));
    }

    lines.push(format!("Enums ({}):", schema.enums.len()));
    lines.extend(
        schema
            .enums
            .iter()
            .map(|e| format!("  {}: {}", e.name, e.values.join(", "))),
    );

    lines.push(format!("Indexes ({}):", schema.indexes.len()));
    for index in &schema.indexes {
        let mut line = format!(
            "  {} ON {} ({})",
            index.name,
            index.table,
            index.columns.join(", ")
        );
        if index.primary {
            line.push_str(" PRIMARY");
        } else if index.unique {
            line.push_str(" UNIQUE");
        }
        lines.push(line);
    }

    if !schema.constraints.is_empty() {
        lines.push(format!("Constraints ({}):", schema.constraints.len()));
        for constraint in &schema.constraints {
            let mut line = format!(
                "  {} {} {}.{}",
                constraint.name, constraint.constraint_type, constraint.table, constraint.column
            );
            if let (Some(table), Some(column)) =
                (&constraint.foreign_table, &constraint.foreign_column)
            {
                line.push_str(&format!(" -> {table}.{column}"));
            }
            if let Some(ref clause) = constraint.check_clause {
                line.push_str(&format!(" {clause}"));
            }
            lines.push(line);
        }
    }

    finish(lines)
}

fn db_column_line(column: &DbColumn) -> String {
    let mut parts = vec![format!("    - {} {}", column.name, column.full_type())];
    if column.primary_key {
        parts.push("PRIMARY KEY".to_string());
    }
    if !column.nullable {
        parts.push("NOT NULL".to_string());
    }
    if column.unique {
        parts.push("UNIQUE".to_string());
    }
    if column.auto_increment {
        parts.push("AUTO_INCREMENT".to_string());
    }
    if let Some(ref default) = column.default {
        parts.push(format!("DEFAULT {default}"));
    }
    parts.join(" ")
}

/// Formats the schema declared by application code, embedded fields
/// expanded.
#[must_use]
pub fn format_generated_schema(schema: &GeneratedSchema) -> String {
    let mut lines = vec!["=== GENERATED SCHEMA ===".to_string(), String::new()];

    lines.push(format!("Tables ({}):", schema.tables.len()));
    for table in &schema.tables {
        lines.push(format!("  {} ({})", table.name, table.struct_name));
        lines.extend(table_fields(schema, table).iter().map(field_line));
    }

    let enums = schema.effective_enums();
    lines.push(format!("Enums ({}):", enums.len()));
    lines.extend(
        enums
            .iter()
            .map(|e| format!("  {}: {}", e.name, e.values.join(", "))),
    );

    lines.push(format!("Indexes ({}):", schema.indexes.len()));
    for index in &schema.indexes {
        let mut line = format!(
            "  {} ON {} ({})",
            index.name,
            index.struct_name,
            index.fields.join(", ")
        );
        if index.unique {
            line.push_str(" UNIQUE");
        }
        lines.push(line);
    }

    finish(lines)
}

fn field_line(field: &Field) -> String {
    let mut parts = vec![format!("    - {} {}", field.name, field.field_type)];
    if field.primary {
        parts.push("PRIMARY KEY".to_string());
    }
    if !field.nullable && !field.primary {
        parts.push("NOT NULL".to_string());
    }
    if field.unique {
        parts.push("UNIQUE".to_string());
    }
    if field.auto_increment {
        parts.push("AUTO_INCREMENT".to_string());
    }
    if let Some(ref expr) = field.default_expr {
        parts.push(format!("DEFAULT {expr}"));
    } else if let Some(ref value) = field.default {
        parts.push(format!("DEFAULT {value}"));
    }
    if let Some((table, column)) = field.foreign_reference() {
        parts.push(format!("-> {table}.{column}"));
    }
    parts.join(" ")
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}
