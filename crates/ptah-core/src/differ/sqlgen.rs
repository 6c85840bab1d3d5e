//! Direct CREATE TABLE generation for migration scripts.

use super::types::{map_type_to_sql, needs_quoting};
use crate::renderer::{Dialect, mysql_table_options, quote_literal};
use crate::schema::{Field, Table};

/// Renders one column definition for `dialect`.
#[must_use]
pub fn generate_column_definition(field: &Field, dialect: &str) -> String {
    column_definition(field, dialect, true)
}

fn column_definition(field: &Field, dialect: &str, inline_primary: bool) -> String {
    let kind = Dialect::from_name(dialect);
    let mut sql_type = map_type_to_sql(&field.field_type, &field.enum_values, dialect);

    if field.auto_increment && kind == Dialect::Postgres {
        sql_type = match sql_type.to_uppercase().as_str() {
            "INTEGER" | "INT" => "SERIAL".to_string(),
            "BIGINT" => "BIGSERIAL".to_string(),
            _ => sql_type,
        };
    }

    let mut parts = vec![field.name.clone(), sql_type.clone()];

    if field.primary && inline_primary {
        parts.push("PRIMARY KEY".to_string());
    } else if !field.nullable || field.primary {
        parts.push("NOT NULL".to_string());
    }
    if field.unique && !field.primary {
        parts.push("UNIQUE".to_string());
    }
    if field.auto_increment
        && kind.is_mysql_family()
        && !sql_type.to_uppercase().contains("AUTO_INCREMENT")
    {
        parts.push("AUTO_INCREMENT".to_string());
    }

    if let Some(ref expr) = field.default_expr {
        parts.push(format!("DEFAULT {expr}"));
    } else if let Some(ref value) = field.default {
        let value = if needs_quoting(value, &field.field_type, &field.enum_values) {
            quote_literal(value)
        } else {
            value.clone()
        };
        parts.push(format!("DEFAULT {value}"));
    }

    if let Some(ref check) = field.check {
        parts.push(format!("CHECK ({check})"));
    }

    if kind.is_mysql_family() {
        if let Some(ref comment) = field.comment {
            parts.push(format!("COMMENT {}", quote_literal(comment)));
        }
    }

    parts.join(" ")
}

/// Renders a CREATE TABLE statement for `table` from the fields that
/// belong to it.
///
/// A composite `PRIMARY KEY (...)` clause is emitted only when more than
/// one column is primary; a table without columns yields an SQL comment.
#[must_use]
pub fn generate_basic_create_table_sql(table: &Table, fields: &[Field], dialect: &str) -> String {
    let fields: Vec<&Field> = fields
        .iter()
        .filter(|f| f.struct_name == table.struct_name)
        .collect();

    if fields.is_empty() {
        return format!("-- WARNING: no columns found for table {}", table.name);
    }

    let mut primary: Vec<&str> = fields
        .iter()
        .filter(|f| f.primary)
        .map(|f| f.name.as_str())
        .collect();
    if primary.len() < 2 && table.primary_key.len() > 1 {
        primary = table.primary_key.iter().map(String::as_str).collect();
    }
    let composite = primary.len() > 1;

    let mut lines: Vec<String> = fields
        .iter()
        .map(|f| {
            if composite && primary.contains(&f.name.as_str()) {
                let mut f = (*f).clone();
                f.primary = false;
                f.nullable = false;
                column_definition(&f, dialect, false)
            } else {
                column_definition(f, dialect, !composite)
            }
        })
        .collect();

    if composite {
        lines.push(format!("PRIMARY KEY ({})", primary.join(", ")));
    }

    for field in &fields {
        let Some((ref_table, ref_column)) = field.foreign_reference() else {
            continue;
        };
        let name = field
            .foreign_key_name
            .clone()
            .unwrap_or_else(|| format!("fk_{}_{}", table.name, field.name));
        let mut constraint = format!(
            "CONSTRAINT {name} FOREIGN KEY ({}) REFERENCES {ref_table}({ref_column})",
            field.name
        );
        if let Some(ref action) = field.on_delete {
            constraint.push_str(&format!(" ON DELETE {action}"));
        }
        if let Some(ref action) = field.on_update {
            constraint.push_str(&format!(" ON UPDATE {action}"));
        }
        lines.push(constraint);
    }

    let mut sql = format!("CREATE TABLE {} (\n  {}\n)", table.name, lines.join(",\n  "));

    if Dialect::from_name(dialect).is_mysql_family() {
        let options: Vec<(String, String)> = table
            .options_for(dialect)
            .map(|o| o.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        let rendered = mysql_table_options(&options, table.comment.as_deref());
        if !rendered.is_empty() {
            sql.push(' ');
            sql.push_str(&rendered.join(" "));
        }
    }

    sql.push(';');

    if Dialect::from_name(dialect) == Dialect::Postgres {
        if let Some(ref comment) = table.comment {
            sql.push_str(&format!(
                "\nCOMMENT ON TABLE {} IS {};",
                table.name,
                quote_literal(comment)
            ));
        }
    }
    sql
}
