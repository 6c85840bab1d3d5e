//! PostgreSQL renderer.

use std::collections::BTreeSet;

use super::RenderVisitor;
use super::base::{BaseRenderer, quote_literal, quoted_list, render_literal_default};
use crate::ast::{
    AlterOperation, AlterTableNode, AlterTypeNode, AlterTypeOperation, ColumnChanges, ColumnNode,
    CommentNode, ConstraintNode, CreateTableNode, CreateTypeNode, DefaultValue, DropIndexNode,
    DropTableNode, DropTypeNode, EnumNode, IndexNode, TypeDefinition, Visitor,
};
use crate::error::Result;

/// Renders DDL for PostgreSQL.
///
/// - Enums become `CREATE TYPE ... AS ENUM` statements.
/// - Auto-increment columns become `SERIAL`/`BIGSERIAL`.
/// - Column-level foreign keys are hoisted to table constraints.
/// - Column changes are split into `TYPE`, nullability and default steps.
#[derive(Debug, Clone)]
pub struct PostgresRenderer {
    base: BaseRenderer,
    enums: BTreeSet<String>,
}

impl Default for PostgresRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PostgresRenderer {
    /// Creates a PostgreSQL renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseRenderer::new("postgres"),
            enums: BTreeSet::new(),
        }
    }

    /// Maps a column's type, replacing auto-increment integers with serials.
    fn column_type(col: &ColumnNode) -> String {
        let upper = col.column_type.trim().to_uppercase();
        let (base_type, inline_auto) = match upper.strip_suffix("AUTO_INCREMENT") {
            Some(rest) => (rest.trim_end().to_string(), true),
            None => (upper, false),
        };

        if !(inline_auto || col.auto_increment) {
            return col.column_type.clone();
        }
        match base_type.as_str() {
            "BIGINT" | "INT8" | "BIGSERIAL" => "BIGSERIAL".to_string(),
            "SMALLINT" | "INT2" | "SMALLSERIAL" => "SMALLSERIAL".to_string(),
            "INT" | "INTEGER" | "INT4" | "SERIAL" | "" => "SERIAL".to_string(),
            _ => base_type,
        }
    }

    /// Type used in `ALTER COLUMN ... TYPE`; serials are not valid there.
    fn alter_type(col: &ColumnNode) -> String {
        match Self::column_type(col).as_str() {
            "SERIAL" => "INTEGER".to_string(),
            "BIGSERIAL" => "BIGINT".to_string(),
            "SMALLSERIAL" => "SMALLINT".to_string(),
            other => other.to_string(),
        }
    }

    fn is_enum_type(&self, column_type: &str) -> bool {
        self.enums.contains(column_type)
    }

    fn render_default(&self, default: &DefaultValue, column_type: &str) -> String {
        match default {
            DefaultValue::Literal(value) => {
                render_literal_default(value, column_type, self.is_enum_type(column_type))
            }
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }

    /// Renders a column definition without its foreign key.
    fn column_definition(&self, col: &ColumnNode) -> String {
        let mut parts = vec![col.name.clone(), Self::column_type(col)];

        if col.primary {
            parts.push("PRIMARY KEY NOT NULL".to_string());
        } else {
            if col.is_not_null() {
                parts.push("NOT NULL".to_string());
            }
            if col.unique {
                parts.push("UNIQUE".to_string());
            }
        }

        if let Some(ref default) = col.default {
            parts.push(format!(
                "DEFAULT {}",
                self.render_default(default, &col.column_type)
            ));
        }

        if let Some(ref check) = col.check {
            parts.push(format!("CHECK ({check})"));
        }

        parts.join(" ")
    }

    fn comment_statements(&mut self, node: &CreateTableNode) {
        if let Some(ref comment) = node.comment {
            self.base.writeln(&format!(
                "COMMENT ON TABLE {} IS {};",
                node.name,
                quote_literal(comment)
            ));
        }
        for col in &node.columns {
            if let Some(ref comment) = col.comment {
                self.base.writeln(&format!(
                    "COMMENT ON COLUMN {}.{} IS {};",
                    node.name,
                    col.name,
                    quote_literal(comment)
                ));
            }
        }
    }

    fn write_enum(&mut self, name: &str, values: &[String]) {
        self.enums.insert(name.to_string());
        self.base.writeln(&format!(
            "CREATE TYPE {name} AS ENUM ({});",
            quoted_list(values)
        ));
    }

    /// Returns `true` for columns whose default comes from a sequence.
    fn is_serial(col: &ColumnNode) -> bool {
        col.auto_increment || Self::column_type(col).ends_with("SERIAL")
    }

    fn modify_column(&mut self, table: &str, col: &ColumnNode, changes: ColumnChanges) {
        let prefix = format!("ALTER TABLE {table} ALTER COLUMN {}", col.name);

        if changes.column_type {
            self.base
                .writeln(&format!("{prefix} TYPE {};", Self::alter_type(col)));
        }

        if changes.nullable {
            if col.is_not_null() {
                self.base.writeln(&format!("{prefix} SET NOT NULL;"));
            } else {
                self.base.writeln(&format!("{prefix} DROP NOT NULL;"));
            }
        }

        if changes.default {
            match col.default {
                Some(ref default) => {
                    let value = self.render_default(default, &col.column_type);
                    self.base
                        .writeln(&format!("{prefix} SET DEFAULT {value};"));
                }
                // The sequence default of a serial column stays.
                None if Self::is_serial(col) => {}
                None => self.base.writeln(&format!("{prefix} DROP DEFAULT;")),
            }
        }
    }
}

impl Visitor for PostgresRenderer {
    fn visit_create_table(&mut self, node: &CreateTableNode) -> Result<()> {
        let mut lines: Vec<String> = node
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();

        for col in &node.columns {
            if let Some(ref fk) = col.foreign_key {
                lines.push(self.base.hoisted_foreign_key(&col.name, fk));
            }
        }

        for constraint in &node.constraints {
            lines.push(self.base.render_constraint(constraint)?);
        }

        let mut sql = format!("CREATE TABLE {} (\n  {}\n)", node.name, lines.join(",\n  "));

        let options: Vec<String> = node
            .options
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case("ENGINE"))
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        if !options.is_empty() {
            sql.push_str(&format!(" WITH ({})", options.join(", ")));
        }

        sql.push(';');
        self.base.writeln(&sql);
        self.comment_statements(node);
        Ok(())
    }

    fn visit_alter_table(&mut self, node: &AlterTableNode) -> Result<()> {
        for operation in &node.operations {
            match operation {
                AlterOperation::AddColumn(col) => {
                    let definition = self.column_definition(col);
                    self.base.writeln(&format!(
                        "ALTER TABLE {} ADD COLUMN {definition};",
                        node.name
                    ));
                    if let Some(ref fk) = col.foreign_key {
                        let constraint = self.base.hoisted_foreign_key(&col.name, fk);
                        self.base
                            .writeln(&format!("ALTER TABLE {} ADD {constraint};", node.name));
                    }
                }
                AlterOperation::DropColumn(column) => {
                    self.base
                        .writeln(&format!("ALTER TABLE {} DROP COLUMN {column};", node.name));
                }
                AlterOperation::ModifyColumn(col) => {
                    self.modify_column(&node.name, col, ColumnChanges::ALL);
                }
                AlterOperation::AlterColumn(col, changes) => {
                    self.modify_column(&node.name, col, *changes);
                }
            }
        }
        Ok(())
    }

    fn visit_column(&mut self, node: &ColumnNode) -> Result<()> {
        let definition = self.column_definition(node);
        self.base.write(&definition);
        Ok(())
    }

    fn visit_constraint(&mut self, node: &ConstraintNode) -> Result<()> {
        let sql = self.base.render_constraint(node)?;
        self.base.write(&sql);
        Ok(())
    }

    fn visit_index(&mut self, node: &IndexNode) -> Result<()> {
        let sql = self.base.index_statement(node);
        self.base.writeln(&format!("{sql};"));
        if let Some(ref comment) = node.comment {
            self.base.writeln(&format!(
                "COMMENT ON INDEX {} IS {};",
                node.name,
                quote_literal(comment)
            ));
        }
        Ok(())
    }

    fn visit_drop_index(&mut self, node: &DropIndexNode) -> Result<()> {
        let if_exists = if node.if_exists { "IF EXISTS " } else { "" };
        self.base
            .writeln(&format!("DROP INDEX {if_exists}{};", node.name));
        Ok(())
    }

    fn visit_enum(&mut self, node: &EnumNode) -> Result<()> {
        self.write_enum(&node.name, &node.values);
        Ok(())
    }

    fn visit_comment(&mut self, node: &CommentNode) -> Result<()> {
        self.base.write_comment(&node.text);
        Ok(())
    }

    fn visit_drop_table(&mut self, node: &DropTableNode) -> Result<()> {
        if let Some(ref comment) = node.comment {
            self.base.write_comment(comment);
        }
        let sql = self.base.drop_table_statement(node);
        self.base.writeln(&format!("{sql};"));
        Ok(())
    }

    fn visit_drop_type(&mut self, node: &DropTypeNode) -> Result<()> {
        if let Some(ref comment) = node.comment {
            self.base.write_comment(comment);
        }
        let mut sql = String::from("DROP TYPE ");
        if node.if_exists {
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&node.name);
        if node.cascade {
            sql.push_str(" CASCADE");
        }
        sql.push(';');
        self.base.writeln(&sql);
        Ok(())
    }

    fn visit_create_type(&mut self, node: &CreateTypeNode) -> Result<()> {
        if let Some(ref comment) = node.comment {
            self.base.write_comment(comment);
        }
        match &node.definition {
            TypeDefinition::Enum(values) => self.write_enum(&node.name, values),
            TypeDefinition::Composite(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|f| format!("{} {}", f.name, f.field_type))
                    .collect();
                self.base.writeln(&format!(
                    "CREATE TYPE {} AS ({});",
                    node.name,
                    fields.join(", ")
                ));
            }
            TypeDefinition::Domain {
                base_type,
                nullable,
                default,
                check,
            } => {
                let mut sql = format!("CREATE DOMAIN {} AS {base_type}", node.name);
                if !nullable {
                    sql.push_str(" NOT NULL");
                }
                if let Some(default) = default {
                    sql.push_str(&format!(" DEFAULT {default}"));
                }
                if let Some(check) = check {
                    sql.push_str(&format!(" CHECK ({check})"));
                }
                sql.push(';');
                self.base.writeln(&sql);
            }
        }
        Ok(())
    }

    fn visit_alter_type(&mut self, node: &AlterTypeNode) -> Result<()> {
        for operation in &node.operations {
            let sql = match operation {
                AlterTypeOperation::AddValue {
                    value,
                    before,
                    after,
                } => {
                    let mut sql = format!("ALTER TYPE {} ADD VALUE {}", node.name, quote_literal(value));
                    if let Some(before) = before {
                        sql.push_str(&format!(" BEFORE {}", quote_literal(before)));
                    } else if let Some(after) = after {
                        sql.push_str(&format!(" AFTER {}", quote_literal(after)));
                    }
                    sql
                }
                AlterTypeOperation::RenameValue { old, new } => format!(
                    "ALTER TYPE {} RENAME VALUE {} TO {}",
                    node.name,
                    quote_literal(old),
                    quote_literal(new)
                ),
                AlterTypeOperation::RenameTo(new_name) => {
                    format!("ALTER TYPE {} RENAME TO {new_name}", node.name)
                }
            };
            self.base.writeln(&format!("{sql};"));
        }
        Ok(())
    }
}

impl RenderVisitor for PostgresRenderer {
    fn dialect(&self) -> &str {
        self.base.dialect()
    }

    fn reset(&mut self) {
        self.base.reset();
        self.enums.clear();
    }

    fn output(&self) -> &str {
        self.base.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ForeignKeyRef, Node, StatementList};

    fn render(node: impl Into<Node>) -> String {
        PostgresRenderer::new().render(&node.into()).unwrap()
    }

    #[test]
    fn test_primary_key_renders_not_null() {
        let table = CreateTableNode::new("users")
            .add_column(ColumnNode::new("id", "INTEGER").set_primary());
        let sql = render(table);
        assert!(sql.contains("id INTEGER PRIMARY KEY NOT NULL"));
    }

    #[test]
    fn test_auto_increment_becomes_serial() {
        let table = CreateTableNode::new("users")
            .add_column(ColumnNode::new("id", "INTEGER").set_primary().set_auto_increment())
            .add_column(ColumnNode::new("big_id", "BIGINT AUTO_INCREMENT"))
            .add_column(ColumnNode::new("legacy", "AUTO_INCREMENT"));
        let sql = render(table);
        assert!(sql.contains("id SERIAL PRIMARY KEY NOT NULL"));
        assert!(sql.contains("big_id BIGSERIAL"));
        assert!(sql.contains("legacy SERIAL"));
        assert!(!sql.contains("AUTO_INCREMENT"));
    }

    #[test]
    fn test_create_table_layout() {
        let table = CreateTableNode::new("users")
            .add_column(ColumnNode::new("id", "SERIAL").set_primary())
            .add_column(ColumnNode::new("email", "VARCHAR(255)").set_not_null().set_unique());
        assert_eq!(
            render(table),
            "CREATE TABLE users (\n  id SERIAL PRIMARY KEY NOT NULL,\n  email VARCHAR(255) NOT NULL UNIQUE\n);\n"
        );
    }

    #[test]
    fn test_foreign_keys_are_hoisted() {
        let table = CreateTableNode::new("orders")
            .add_column(ColumnNode::new("id", "SERIAL").set_primary())
            .add_column(
                ColumnNode::new("user_id", "INTEGER")
                    .set_not_null()
                    .set_foreign_key(
                        ForeignKeyRef::new("users", "id", "fk_orders_user").on_delete("CASCADE"),
                    ),
            );
        let sql = render(table);
        assert!(sql.contains("  user_id INTEGER NOT NULL,\n"));
        assert!(sql.contains(
            "CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE"
        ));
    }

    #[test]
    fn test_engine_option_is_filtered() {
        let table = CreateTableNode::new("t")
            .add_column(ColumnNode::new("id", "SERIAL").set_primary())
            .set_option("ENGINE", "InnoDB")
            .set_option("fillfactor", "70");
        let sql = render(table);
        assert!(!sql.contains("ENGINE"));
        assert!(sql.contains(") WITH (fillfactor=70);"));
    }

    #[test]
    fn test_default_quoting() {
        let table = CreateTableNode::new("t")
            .add_column(ColumnNode::new("count", "INTEGER").set_default("0"))
            .add_column(ColumnNode::new("name", "TEXT").set_default("anon"))
            .add_column(ColumnNode::new("since", "DATE").set_default("2020-01-01"))
            .add_column(ColumnNode::new("created_at", "TIMESTAMP").set_default_expression("NOW()"))
            .add_column(ColumnNode::new("active", "BOOLEAN").set_default("true"));
        let sql = render(table);
        assert!(sql.contains("count INTEGER DEFAULT 0"));
        assert!(sql.contains("name TEXT DEFAULT 'anon'"));
        assert!(sql.contains("since DATE DEFAULT '2020-01-01'"));
        assert!(sql.contains("created_at TIMESTAMP DEFAULT NOW()"));
        assert!(sql.contains("active BOOLEAN DEFAULT true"));
    }

    #[test]
    fn test_enum_default_is_quoted_for_known_enum() {
        let schema = StatementList::new()
            .with(
                CreateTableNode::new("users")
                    .add_column(ColumnNode::new("status", "user_status").set_default("active")),
            )
            .with(EnumNode::new("user_status", &["active", "banned"]));
        let sql = PostgresRenderer::new().render_schema(&schema).unwrap();
        assert!(sql.contains("status user_status DEFAULT 'active'"));
    }

    #[test]
    fn test_render_schema_puts_enums_first() {
        let schema = StatementList::new()
            .with(CreateTableNode::new("a").add_column(ColumnNode::new("id", "SERIAL").set_primary()))
            .with(EnumNode::new("first_enum", &["x"]))
            .with(CreateTableNode::new("b").add_column(ColumnNode::new("id", "SERIAL").set_primary()))
            .with(CreateTypeNode::new(
                "second_enum",
                TypeDefinition::Enum(vec!["y".into()]),
            ));
        let sql = PostgresRenderer::new().render_schema(&schema).unwrap();

        let first = sql.find("CREATE TYPE first_enum").unwrap();
        let second = sql.find("CREATE TYPE second_enum").unwrap();
        let table_a = sql.find("CREATE TABLE a").unwrap();
        let table_b = sql.find("CREATE TABLE b").unwrap();
        assert!(first < second);
        assert!(second < table_a);
        assert!(table_a < table_b);
    }

    #[test]
    fn test_modify_column_splits_statements() {
        let alter = AlterTableNode::new("users").add_operation(AlterOperation::ModifyColumn(
            ColumnNode::new("email", "VARCHAR(320)")
                .set_not_null()
                .set_default("none"),
        ));
        assert_eq!(
            render(alter),
            "ALTER TABLE users ALTER COLUMN email TYPE VARCHAR(320);\n\
             ALTER TABLE users ALTER COLUMN email SET NOT NULL;\n\
             ALTER TABLE users ALTER COLUMN email SET DEFAULT 'none';\n"
        );

        let alter = AlterTableNode::new("users")
            .add_operation(AlterOperation::ModifyColumn(ColumnNode::new("nickname", "TEXT")));
        let sql = render(alter);
        assert!(sql.contains("ALTER COLUMN nickname DROP NOT NULL;"));
        assert!(sql.contains("ALTER COLUMN nickname DROP DEFAULT;"));
    }

    #[test]
    fn test_alter_column_keeps_serial_default() {
        let nullable_only = ColumnChanges::from_kinds(["nullable"]);
        let alter = AlterTableNode::new("users").add_operation(AlterOperation::AlterColumn(
            ColumnNode::new("id", "SERIAL").set_primary(),
            nullable_only,
        ));
        assert_eq!(render(alter), "ALTER TABLE users ALTER COLUMN id SET NOT NULL;\n");

        let alter = AlterTableNode::new("users").add_operation(AlterOperation::AlterColumn(
            ColumnNode::new("id", "INTEGER").set_auto_increment(),
            ColumnChanges::ALL,
        ));
        let sql = render(alter);
        assert!(sql.contains("ALTER COLUMN id TYPE INTEGER;"));
        assert!(!sql.contains("DROP DEFAULT"));
    }

    #[test]
    fn test_add_and_drop_column() {
        let alter = AlterTableNode::new("users")
            .add_operation(AlterOperation::AddColumn(
                ColumnNode::new("team_id", "INTEGER")
                    .set_foreign_key(ForeignKeyRef::new("teams", "id", "fk_users_team")),
            ))
            .add_operation(AlterOperation::DropColumn("legacy".into()));
        let sql = render(alter);
        assert!(sql.contains("ALTER TABLE users ADD COLUMN team_id INTEGER;"));
        assert!(sql.contains(
            "ALTER TABLE users ADD CONSTRAINT fk_users_team FOREIGN KEY (team_id) REFERENCES teams(id);"
        ));
        assert!(sql.contains("ALTER TABLE users DROP COLUMN legacy;"));
    }

    #[test]
    fn test_comments_on_table_and_columns() {
        let table = CreateTableNode::new("items")
            .add_column(ColumnNode::new("id", "SERIAL").set_primary().set_comment("Row id"))
            .set_comment("Inventory items");
        let sql = render(table);
        assert!(sql.contains("COMMENT ON TABLE items IS 'Inventory items';"));
        assert!(sql.contains("COMMENT ON COLUMN items.id IS 'Row id';"));
    }

    #[test]
    fn test_types() {
        let sql = render(AlterTypeNode::new("status").add_operation(AlterTypeOperation::AddValue {
            value: "archived".into(),
            before: None,
            after: Some("active".into()),
        }));
        assert_eq!(sql, "ALTER TYPE status ADD VALUE 'archived' AFTER 'active';\n");

        let sql = render(CreateTypeNode::new(
            "positive_int",
            TypeDefinition::Domain {
                base_type: "INTEGER".into(),
                nullable: false,
                default: None,
                check: Some("VALUE > 0".into()),
            },
        ));
        assert_eq!(
            sql,
            "CREATE DOMAIN positive_int AS INTEGER NOT NULL CHECK (VALUE > 0);\n"
        );

        let sql = render(DropTypeNode::new("status").set_if_exists().set_cascade());
        assert_eq!(sql, "DROP TYPE IF EXISTS status CASCADE;\n");
    }

    #[test]
    fn test_missing_reference_fails_in_create_table() {
        let table = CreateTableNode::new("t")
            .add_column(ColumnNode::new("x_id", "INTEGER"))
            .add_constraint(ConstraintNode::foreign_key("fk_x", &["x_id"], None));
        assert!(PostgresRenderer::new().render(&table.into()).is_err());
    }
}
