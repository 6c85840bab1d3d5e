//! Output buffer and SQL fragments shared by every dialect.

use crate::ast::{ConstraintKind, ConstraintNode, DropTableNode, ForeignKeyRef, IndexNode};
use crate::error::{PtahError, Result};

/// Type prefixes whose default literals are written without quotes.
const UNQUOTED_TYPE_PREFIXES: &[&str] = &[
    "INT",
    "INTEGER",
    "BIGINT",
    "SMALLINT",
    "TINYINT",
    "MEDIUMINT",
    "SERIAL",
    "BIGSERIAL",
    "SMALLSERIAL",
    "DECIMAL",
    "NUMERIC",
    "REAL",
    "DOUBLE",
    "FLOAT",
    "BOOL",
    "BOOLEAN",
];

/// Date/time type prefixes; their defaults are always quoted.
const TEMPORAL_TYPE_PREFIXES: &[&str] = &["DATE", "TIME", "TIMESTAMP", "TIMESTAMPTZ", "INTERVAL"];

/// Output buffer plus the SQL fragments every dialect renders the same way.
///
/// Dialect renderers own one of these and delegate to it.
#[derive(Debug, Clone)]
pub struct BaseRenderer {
    dialect: String,
    output: String,
}

impl BaseRenderer {
    /// Creates an empty renderer for the given dialect name.
    #[must_use]
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            output: String::new(),
        }
    }

    /// Dialect name.
    #[must_use]
    pub fn dialect(&self) -> &str {
        &self.dialect
    }

    /// Clears the output buffer.
    pub fn reset(&mut self) {
        self.output.clear();
    }

    /// Accumulated output.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Appends text.
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Appends text followed by a newline.
    pub fn writeln(&mut self, text: &str) {
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// Appends one `-- ` line per line of `text`.
    pub fn write_comment(&mut self, text: &str) {
        for line in text.lines() {
            if line.is_empty() {
                self.writeln("--");
            } else {
                self.writeln(&format!("-- {line}"));
            }
        }
    }

    /// Renders a table-level constraint without trailing punctuation.
    ///
    /// # Errors
    ///
    /// Returns [`PtahError::MissingReference`] for a foreign key without a
    /// reference.
    pub fn render_constraint(&self, constraint: &ConstraintNode) -> Result<String> {
        let prefix = constraint
            .name
            .as_ref()
            .map(|n| format!("CONSTRAINT {n} "))
            .unwrap_or_default();

        match &constraint.kind {
            ConstraintKind::PrimaryKey { columns } => {
                Ok(format!("PRIMARY KEY ({})", columns.join(", ")))
            }
            ConstraintKind::Unique { columns } => {
                Ok(format!("{prefix}UNIQUE ({})", columns.join(", ")))
            }
            ConstraintKind::ForeignKey { columns, reference } => {
                let reference = reference.as_ref().ok_or_else(|| PtahError::MissingReference {
                    constraint: constraint.name.clone().unwrap_or_default(),
                })?;
                Ok(format!(
                    "{prefix}FOREIGN KEY ({}) {}",
                    columns.join(", "),
                    references_clause(reference)
                ))
            }
            ConstraintKind::Check { expression } => Ok(format!("{prefix}CHECK ({expression})")),
        }
    }

    /// Renders a column-level foreign key as a table-level constraint.
    #[must_use]
    pub fn hoisted_foreign_key(&self, column: &str, reference: &ForeignKeyRef) -> String {
        let prefix = if reference.name.is_empty() {
            String::new()
        } else {
            format!("CONSTRAINT {} ", reference.name)
        };
        format!(
            "{prefix}FOREIGN KEY ({column}) {}",
            references_clause(reference)
        )
    }

    /// Renders `CREATE [UNIQUE] INDEX name ON table [USING type] (cols)`.
    #[must_use]
    pub fn index_statement(&self, node: &IndexNode) -> String {
        let mut sql = String::from("CREATE ");
        if node.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str(&format!("INDEX {} ON {}", node.name, node.table));
        if let Some(ref index_type) = node.index_type {
            sql.push_str(&format!(" USING {}", index_type.to_uppercase()));
        }
        sql.push_str(&format!(" ({})", node.columns.join(", ")));
        sql
    }

    /// Renders `DROP TABLE [IF EXISTS] name [CASCADE]`.
    #[must_use]
    pub fn drop_table_statement(&self, node: &DropTableNode) -> String {
        let mut sql = String::from("DROP TABLE ");
        if node.if_exists {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&node.name);
        if node.cascade {
            sql.push_str(" CASCADE");
        }
        sql
    }
}

/// Renders `REFERENCES table(column) [ON DELETE x] [ON UPDATE y]`.
#[must_use]
pub fn references_clause(reference: &ForeignKeyRef) -> String {
    let mut sql = format!("REFERENCES {}({})", reference.table, reference.column);
    if let Some(ref action) = reference.on_delete {
        sql.push_str(&format!(" ON DELETE {action}"));
    }
    if let Some(ref action) = reference.on_update {
        sql.push_str(&format!(" ON UPDATE {action}"));
    }
    sql
}

/// Renders MySQL table options as `KEY=value` pairs, `ENGINE` first.
///
/// Charset and collation keys are uppercased and `COMMENT` is quoted.
/// `comment` is used when no `COMMENT` option is given.
#[must_use]
pub fn mysql_table_options(options: &[(String, String)], comment: Option<&str>) -> Vec<String> {
    let mut rendered = Vec::new();

    if let Some((_, engine)) = options
        .iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("ENGINE"))
    {
        rendered.push(format!("ENGINE={engine}"));
    }

    let mut has_comment = false;
    for (key, value) in options {
        let upper = key.trim().to_uppercase();
        match upper.as_str() {
            "ENGINE" => {}
            "CHARSET" | "CHARACTER SET" | "COLLATE" => rendered.push(format!("{upper}={value}")),
            "COMMENT" => {
                has_comment = true;
                rendered.push(format!("COMMENT={}", quote_literal(value)));
            }
            _ => rendered.push(format!("{key}={value}")),
        }
    }

    if !has_comment {
        if let Some(comment) = comment {
            rendered.push(format!("COMMENT={}", quote_literal(comment)));
        }
    }

    rendered
}

/// Returns `true` if the value is wrapped in single quotes.
#[must_use]
pub fn is_quoted(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'')
}

/// Wraps a value in single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders enum values as a quoted, comma-separated list.
#[must_use]
pub fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| quote_literal(v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decides whether a literal default for a column of `column_type` must be
/// quoted.
///
/// Date/time types quote, enum types (`enum_` prefix or a known enum)
/// quote, numeric and boolean types do not, anything else quotes.
#[must_use]
pub fn default_needs_quoting(column_type: &str, known_enum: bool) -> bool {
    let upper = column_type.trim().to_uppercase();
    if TEMPORAL_TYPE_PREFIXES.iter().any(|p| upper.starts_with(p)) {
        return true;
    }
    if known_enum || upper.starts_with("ENUM_") {
        return true;
    }
    !UNQUOTED_TYPE_PREFIXES.iter().any(|p| upper.starts_with(p))
}

/// Renders a literal default value for a column.
///
/// Already quoted literals and `NULL` pass through untouched.
#[must_use]
pub fn render_literal_default(value: &str, column_type: &str, known_enum: bool) -> String {
    if is_quoted(value) || value.eq_ignore_ascii_case("NULL") {
        return value.to_string();
    }
    if default_needs_quoting(column_type, known_enum) {
        quote_literal(value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_needs_quoting() {
        assert!(!default_needs_quoting("INTEGER", false));
        assert!(!default_needs_quoting("bigint", false));
        assert!(!default_needs_quoting("DECIMAL(10,2)", false));
        assert!(!default_needs_quoting("BOOLEAN", false));
        assert!(default_needs_quoting("TIMESTAMP", false));
        assert!(default_needs_quoting("DATE", false));
        // INTERVAL starts with INT but is temporal.
        assert!(default_needs_quoting("INTERVAL", false));
        assert!(default_needs_quoting("enum_status", false));
        assert!(default_needs_quoting("VARCHAR(20)", false));
        assert!(default_needs_quoting("status", true));
    }

    #[test]
    fn test_render_literal_default() {
        assert_eq!(render_literal_default("active", "VARCHAR(20)", false), "'active'");
        assert_eq!(render_literal_default("'active'", "VARCHAR(20)", false), "'active'");
        assert_eq!(render_literal_default("0", "INTEGER", false), "0");
        assert_eq!(render_literal_default("true", "BOOLEAN", false), "true");
        assert_eq!(render_literal_default("null", "TEXT", false), "null");
        assert_eq!(render_literal_default("it's", "TEXT", false), "'it''s'");
    }

    #[test]
    fn test_constraint_rendering() {
        let base = BaseRenderer::new("test");
        assert_eq!(
            base.render_constraint(&ConstraintNode::primary_key(&["a", "b"]))
                .unwrap(),
            "PRIMARY KEY (a, b)"
        );
        assert_eq!(
            base.render_constraint(&ConstraintNode::unique("uq_email", &["email"]))
                .unwrap(),
            "CONSTRAINT uq_email UNIQUE (email)"
        );
        assert_eq!(
            base.render_constraint(&ConstraintNode::unique("", &["email"]))
                .unwrap(),
            "UNIQUE (email)"
        );
        assert_eq!(
            base.render_constraint(&ConstraintNode::check("", "price > 0"))
                .unwrap(),
            "CHECK (price > 0)"
        );

        let fk = ConstraintNode::foreign_key(
            "fk_orders_user",
            &["user_id"],
            Some(ForeignKeyRef::new("users", "id", "fk_orders_user").on_delete("CASCADE")),
        );
        assert_eq!(
            base.render_constraint(&fk).unwrap(),
            "CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_foreign_key_without_reference_fails() {
        let base = BaseRenderer::new("test");
        let fk = ConstraintNode::foreign_key("fk_x", &["x_id"], None);
        let err = base.render_constraint(&fk).unwrap_err();
        assert!(err.to_string().contains("missing reference"));
    }

    #[test]
    fn test_mysql_table_options() {
        let options = vec![
            ("collate".to_string(), "utf8mb4_bin".to_string()),
            ("Engine".to_string(), "InnoDB".to_string()),
        ];
        assert_eq!(
            mysql_table_options(&options, Some("Users")),
            vec!["ENGINE=InnoDB", "COLLATE=utf8mb4_bin", "COMMENT='Users'"]
        );

        let options = vec![("COMMENT".to_string(), "set here".to_string())];
        assert_eq!(
            mysql_table_options(&options, Some("ignored")),
            vec!["COMMENT='set here'"]
        );
        assert!(mysql_table_options(&[], None).is_empty());
    }

    #[test]
    fn test_write_comment_prefixes_each_line() {
        let mut base = BaseRenderer::new("test");
        base.write_comment("first\n\nsecond");
        assert_eq!(base.output(), "-- first\n--\n-- second\n");
        base.reset();
        assert_eq!(base.output(), "");
    }
}
