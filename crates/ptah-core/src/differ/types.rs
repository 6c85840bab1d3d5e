//! Type mapping, type normalisation and default quoting.

use std::sync::LazyLock;

use regex::Regex;

use crate::renderer::{Dialect, is_quoted, quote_literal};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static TYPE_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<base>[^(]+?)\s*(?:\((?P<args>[^)]*)\)\s*(?P<rest>.*))?$")
        .expect("type pattern is valid")
});

static INLINE_ENUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^\s*enum\s*\((.*)\)\s*$").expect("enum pattern is valid"));

static ENUM_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'((?:[^']|'')*)'").expect("enum value pattern is valid"));

static DEFAULT_CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"::[a-zA-Z_][a-zA-Z0-9_ ]*(?:\[\])?$").expect("cast pattern is valid")
});

/// Returns `true` if a field is an enum: it carries values, or its type
/// starts with `enum_`.
#[must_use]
pub fn is_enum_type(field_type: &str, enum_values: &[String]) -> bool {
    !enum_values.is_empty() || field_type.to_lowercase().starts_with("enum_")
}

/// Maps a declared field type to the SQL type for `dialect`.
///
/// Enums keep their type name on PostgreSQL and become inline
/// `ENUM('a', 'b')` on MySQL/MariaDB. Other types are uppercased and
/// matched by category; unmatched types are returned unchanged.
#[must_use]
pub fn map_type_to_sql(field_type: &str, enum_values: &[String], dialect: &str) -> String {
    let dialect = Dialect::from_name(dialect);
    let mysql = dialect.is_mysql_family();

    if is_enum_type(field_type, enum_values) {
        if !mysql {
            return field_type.to_string();
        }
        let values: Vec<String> = enum_values
            .iter()
            .filter(|v| !v.is_empty())
            .map(|v| quote_literal(v))
            .collect();
        if values.is_empty() {
            return field_type.to_string();
        }
        return format!("ENUM({})", values.join(", "));
    }

    let upper = field_type.trim().to_uppercase();
    if upper.contains("BIGSERIAL") {
        if mysql { "BIGINT AUTO_INCREMENT" } else { "BIGSERIAL" }.to_string()
    } else if upper.contains("SERIAL") {
        if mysql { "INT AUTO_INCREMENT" } else { "SERIAL" }.to_string()
    } else if upper.contains("VARCHAR") || upper.contains("TEXT") || upper.contains("DECIMAL") {
        upper
    } else if upper.contains("INTEGER") {
        if mysql { "INT" } else { "INTEGER" }.to_string()
    } else if upper.contains("BOOLEAN") {
        "BOOLEAN".to_string()
    } else if upper.contains("TIMESTAMP") {
        if mysql { "TIMESTAMP".to_string() } else { upper }
    } else if mysql && upper == "JSONB" {
        "JSON".to_string()
    } else {
        field_type.to_string()
    }
}

/// Decides whether a default value must be quoted in generated SQL.
///
/// Quoted literals, function calls and SQL keywords such as `NULL` are
/// never quoted; enum and text values are; everything else is not.
#[must_use]
pub fn needs_quoting(value: &str, field_type: &str, enum_values: &[String]) -> bool {
    let value = value.trim();
    if is_quoted(value) {
        return false;
    }

    let upper = value.to_uppercase();
    if value.contains('(') || matches!(upper.as_str(), "CURRENT_TIMESTAMP" | "NOW()" | "NULL") {
        return false;
    }

    // Any `enum` prefix counts here, inline `ENUM('a', 'b')` included.
    if !enum_values.is_empty() || field_type.trim().to_lowercase().starts_with("enum") {
        return true;
    }

    let type_upper = field_type.to_uppercase();
    type_upper.contains("VARCHAR") || type_upper.contains("TEXT") || type_upper.contains("CHAR")
}

/// Normalises a type name so that equivalent spellings compare equal.
///
/// Lowercases, collapses whitespace, resolves aliases (`character varying`
/// → `varchar`, `int4` → `integer`, `serial` → `integer`, ...), drops integer
/// display widths and the `auto_increment` marker.
#[must_use]
pub fn normalize_type(raw: &str) -> String {
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ").to_lowercase();
    let collapsed = collapsed.replace("auto_increment", "");
    let collapsed = collapsed.trim();

    let Some(caps) = TYPE_PARTS.captures(collapsed) else {
        return collapsed.to_string();
    };

    let base = caps.name("base").map_or("", |m| m.as_str().trim());
    let args = caps
        .name("args")
        .map(|m| m.as_str().replace(' ', ""))
        .filter(|a| !a.is_empty());
    let rest = caps.name("rest").map_or("", |m| m.as_str().trim());

    let base = match base {
        "character varying" => "varchar",
        "character" => "char",
        "int" | "int4" | "serial" | "serial4" => "integer",
        "int8" | "bigserial" | "serial8" => "bigint",
        "int2" | "smallserial" | "serial2" => "smallint",
        "bool" => "boolean",
        "decimal" => "numeric",
        "float8" | "double precision" => "double",
        "float4" => "real",
        "timestamp without time zone" => "timestamp",
        "timestamp with time zone" => "timestamptz",
        "time without time zone" => "time",
        "time with time zone" => "timetz",
        other => other,
    };

    if base == "tinyint" && args.as_deref() == Some("1") {
        return "boolean".to_string();
    }

    let mut normalized = base.to_string();
    let integer = matches!(base, "integer" | "bigint" | "smallint" | "tinyint" | "mediumint");
    if let Some(args) = args {
        if !integer {
            normalized.push_str(&format!("({args})"));
        }
    }
    if !rest.is_empty() {
        normalized.push(' ');
        normalized.push_str(rest);
    }
    normalized
}

/// Returns `true` if the type implies auto-increment.
#[must_use]
pub fn implies_auto_increment(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    lower.contains("serial") || lower.contains("auto_increment")
}

/// Extracts the values of an inline `enum('a','b')` type.
#[must_use]
pub fn parse_inline_enum(raw: &str) -> Option<Vec<String>> {
    let caps = INLINE_ENUM.captures(raw)?;
    let body = caps.get(1)?.as_str();
    Some(
        ENUM_VALUE
            .captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().replace("''", "'"))
            .collect(),
    )
}

/// Normalises a column default so that database and schema spellings
/// compare equal.
///
/// Sequence defaults (`nextval(...)`) count as no default. Casts are
/// stripped, quotes removed, and `now()` is treated as
/// `CURRENT_TIMESTAMP`.
#[must_use]
pub fn normalize_default(raw: Option<&str>) -> Option<String> {
    let mut value = raw?.trim().to_string();
    if value.is_empty() || value.to_lowercase().starts_with("nextval(") {
        return None;
    }

    while DEFAULT_CAST.is_match(&value) {
        value = DEFAULT_CAST.replace(&value, "").trim().to_string();
    }
    if value.starts_with('(') && value.ends_with(')') && is_quoted(&value[1..value.len() - 1]) {
        value = value[1..value.len() - 1].to_string();
    }
    if is_quoted(&value) {
        value = value[1..value.len() - 1].replace("''", "'");
    }

    let lower = value.to_lowercase();
    match lower.as_str() {
        "null" => None,
        "now()" | "current_timestamp" | "current_timestamp()" => {
            Some("CURRENT_TIMESTAMP".to_string())
        }
        "true" | "false" => Some(lower),
        _ => Some(value),
    }
}
