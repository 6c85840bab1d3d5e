//! MySQL and MariaDB renderer.

use std::collections::BTreeMap;

use super::RenderVisitor;
use super::base::{
    BaseRenderer, mysql_table_options, quote_literal, quoted_list, render_literal_default,
};
use crate::ast::{
    AlterOperation, AlterTableNode, AlterTypeNode, AlterTypeOperation, ColumnNode, CommentNode,
    ConstraintNode, CreateTableNode, CreateTypeNode, DefaultValue, DropIndexNode, DropTableNode,
    DropTypeNode, EnumNode, IndexNode, TypeDefinition, Visitor,
};
use crate::error::Result;

/// Renders DDL for MySQL and MariaDB.
///
/// The two dialects share syntax for everything this crate emits; the
/// dialect name only shows up in explanatory comments. Enums have no
/// separate type object here: enum nodes register their values and columns
/// using that type render as inline `ENUM(...)`.
#[derive(Debug, Clone)]
pub struct MySqlRenderer {
    base: BaseRenderer,
    enums: BTreeMap<String, Vec<String>>,
}

impl MySqlRenderer {
    /// Creates a renderer for the given MySQL-family dialect name.
    #[must_use]
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            base: BaseRenderer::new(dialect),
            enums: BTreeMap::new(),
        }
    }

    /// Creates a MySQL renderer.
    #[must_use]
    pub fn mysql() -> Self {
        Self::new("mysql")
    }

    /// Creates a MariaDB renderer.
    #[must_use]
    pub fn mariadb() -> Self {
        Self::new("mariadb")
    }

    /// Maps a column type, returning the SQL type and whether the mapping
    /// itself implies auto-increment.
    fn column_type(&self, col: &ColumnNode) -> (String, bool) {
        if let Some(values) = self.enums.get(&col.column_type) {
            return (format!("ENUM({})", quoted_list(values)), false);
        }
        match col.column_type.trim().to_uppercase().as_str() {
            "SERIAL" => ("INT".to_string(), true),
            "BIGSERIAL" => ("BIGINT".to_string(), true),
            "SMALLSERIAL" => ("SMALLINT".to_string(), true),
            "JSONB" => ("JSON".to_string(), false),
            "UUID" => ("CHAR(36)".to_string(), false),
            "TIMESTAMPTZ" => ("TIMESTAMP".to_string(), false),
            _ => (col.column_type.clone(), false),
        }
    }

    fn render_default(&self, default: &DefaultValue, column_type: &str) -> String {
        match default {
            DefaultValue::Literal(value) => render_literal_default(
                value,
                column_type,
                self.enums.contains_key(column_type),
            ),
            DefaultValue::Expression(expr) => expr.clone(),
        }
    }

    /// Renders a column definition without its foreign key.
    ///
    /// With `with_primary` unset, a primary column is rendered as a plain
    /// NOT NULL column, which is what `MODIFY COLUMN` needs.
    fn column_definition(&self, col: &ColumnNode, with_primary: bool) -> String {
        let (column_type, implied_auto) = self.column_type(col);
        let auto_increment = (col.auto_increment || implied_auto)
            && !column_type.to_uppercase().contains("AUTO_INCREMENT");

        let mut parts = vec![col.name.clone(), column_type];

        if col.primary && with_primary {
            parts.push("PRIMARY KEY".to_string());
            if auto_increment {
                parts.push("AUTO_INCREMENT".to_string());
            }
        } else {
            if col.is_not_null() {
                parts.push("NOT NULL".to_string());
            }
            if col.unique {
                parts.push("UNIQUE".to_string());
            }
            if auto_increment {
                parts.push("AUTO_INCREMENT".to_string());
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

        if let Some(ref comment) = col.comment {
            parts.push(format!("COMMENT {}", quote_literal(comment)));
        }

        parts.join(" ")
    }

    fn unsupported(&mut self, statement: &str, name: &str) {
        let dialect = self.base.dialect().to_string();
        self.base.write_comment(&format!(
            "{dialect} has no separate type objects; {statement} {name} skipped (enums are inlined into column definitions)"
        ));
    }
}

impl Visitor for MySqlRenderer {
    fn visit_create_table(&mut self, node: &CreateTableNode) -> Result<()> {
        let mut lines: Vec<String> = node
            .columns
            .iter()
            .map(|c| self.column_definition(c, true))
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

        let options = mysql_table_options(&node.options, node.comment.as_deref());
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options.join(" "));
        }

        sql.push(';');
        self.base.writeln(&sql);
        Ok(())
    }

    fn visit_alter_table(&mut self, node: &AlterTableNode) -> Result<()> {
        for operation in &node.operations {
            match operation {
                AlterOperation::AddColumn(col) => {
                    let definition = self.column_definition(col, true);
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
                AlterOperation::ModifyColumn(col) | AlterOperation::AlterColumn(col, _) => {
                    let definition = self.column_definition(col, false);
                    self.base.writeln(&format!(
                        "ALTER TABLE {} MODIFY COLUMN {definition};",
                        node.name
                    ));
                }
            }
        }
        Ok(())
    }

    fn visit_column(&mut self, node: &ColumnNode) -> Result<()> {
        let definition = self.column_definition(node, true);
        self.base.write(&definition);
        Ok(())
    }

    fn visit_constraint(&mut self, node: &ConstraintNode) -> Result<()> {
        let sql = self.base.render_constraint(node)?;
        self.base.write(&sql);
        Ok(())
    }

    fn visit_index(&mut self, node: &IndexNode) -> Result<()> {
        let index_type = node.index_type.as_deref().map(str::to_uppercase);

        let mut sql = String::from("CREATE ");
        if node.unique {
            sql.push_str("UNIQUE ");
        }
        if let Some(kind @ ("FULLTEXT" | "SPATIAL")) = index_type.as_deref() {
            sql.push_str(kind);
            sql.push(' ');
        }
        sql.push_str(&format!(
            "INDEX {} ON {} ({})",
            node.name,
            node.table,
            node.columns.join(", ")
        ));
        if let Some(kind @ ("BTREE" | "HASH")) = index_type.as_deref() {
            sql.push_str(&format!(" USING {kind}"));
        }
        if let Some(ref comment) = node.comment {
            sql.push_str(&format!(" COMMENT {}", quote_literal(comment)));
        }
        sql.push(';');
        self.base.writeln(&sql);
        Ok(())
    }

    fn visit_drop_index(&mut self, node: &DropIndexNode) -> Result<()> {
        match node.table {
            Some(ref table) => {
                self.base
                    .writeln(&format!("DROP INDEX {} ON {table};", node.name));
            }
            None => {
                let dialect = self.base.dialect().to_string();
                self.base.write_comment(&format!(
                    "WARNING: {dialect} requires a table name to drop index {}\nDROP INDEX {} ON <table>;",
                    node.name, node.name
                ));
            }
        }
        Ok(())
    }

    fn visit_enum(&mut self, node: &EnumNode) -> Result<()> {
        self.enums.insert(node.name.clone(), node.values.clone());
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
        self.enums.remove(&node.name);
        self.unsupported("DROP TYPE", &node.name);
        Ok(())
    }

    fn visit_create_type(&mut self, node: &CreateTypeNode) -> Result<()> {
        if let TypeDefinition::Enum(ref values) = node.definition {
            self.enums.insert(node.name.clone(), values.clone());
        }
        self.unsupported("CREATE TYPE", &node.name);
        Ok(())
    }

    fn visit_alter_type(&mut self, node: &AlterTypeNode) -> Result<()> {
        if let Some(values) = self.enums.get_mut(&node.name) {
            for operation in &node.operations {
                match operation {
                    AlterTypeOperation::AddValue { value, .. } => values.push(value.clone()),
                    AlterTypeOperation::RenameValue { old, new } => {
                        if let Some(v) = values.iter_mut().find(|v| v.as_str() == old.as_str()) {
                            v.clone_from(new);
                        }
                    }
                    AlterTypeOperation::RenameTo(_) => {}
                }
            }
        }
        self.unsupported("ALTER TYPE", &node.name);
        Ok(())
    }
}

impl RenderVisitor for MySqlRenderer {
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
        MySqlRenderer::mysql().render(&node.into()).unwrap()
    }

    fn users_table() -> CreateTableNode {
        CreateTableNode::new("users")
            .add_column(
                ColumnNode::new("id", "INTEGER")
                    .set_primary()
                    .set_auto_increment(),
            )
            .add_column(
                ColumnNode::new("email", "VARCHAR(255)")
                    .set_not_null()
                    .set_unique(),
            )
    }

    #[test]
    fn test_users_table() {
        let sql = render(users_table());
        assert!(sql.contains("CREATE TABLE users ("));
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTO_INCREMENT"));
        assert!(sql.contains("email VARCHAR(255) NOT NULL UNIQUE"));
    }

    #[test]
    fn test_mariadb_renders_the_same_table() {
        let mut renderer = MySqlRenderer::mariadb();
        assert_eq!(renderer.dialect(), "mariadb");
        let sql = renderer.render(&users_table().into()).unwrap();
        assert!(sql.contains("id INTEGER PRIMARY KEY AUTO_INCREMENT"));
    }

    #[test]
    fn test_constraint_order_without_primary() {
        let table = CreateTableNode::new("counters").add_column(
            ColumnNode::new("seq", "BIGINT")
                .set_not_null()
                .set_unique()
                .set_auto_increment(),
        );
        assert!(render(table).contains("seq BIGINT NOT NULL UNIQUE AUTO_INCREMENT"));
    }

    #[test]
    fn test_serial_and_postgres_types_are_translated() {
        let table = CreateTableNode::new("t")
            .add_column(ColumnNode::new("id", "SERIAL").set_primary())
            .add_column(ColumnNode::new("payload", "JSONB"))
            .add_column(ColumnNode::new("token", "UUID"))
            .add_column(ColumnNode::new("legacy", "INT AUTO_INCREMENT"));
        let sql = render(table);
        assert!(sql.contains("id INT PRIMARY KEY AUTO_INCREMENT"));
        assert!(sql.contains("payload JSON"));
        assert!(sql.contains("token CHAR(36)"));
        assert!(sql.contains("legacy INT AUTO_INCREMENT"));
        assert!(!sql.contains("AUTO_INCREMENT AUTO_INCREMENT"));
    }

    #[test]
    fn test_enums_render_inline() {
        let schema = StatementList::new()
            .with(EnumNode::new("user_status", &["active", "banned"]))
            .with(
                CreateTableNode::new("users").add_column(
                    ColumnNode::new("status", "user_status")
                        .set_not_null()
                        .set_default("active"),
                ),
            );
        let sql = MySqlRenderer::mysql().render_schema(&schema).unwrap();
        assert!(!sql.contains("CREATE TYPE"));
        assert!(sql.contains("status ENUM('active', 'banned') NOT NULL DEFAULT 'active'"));
    }

    #[test]
    fn test_table_options() {
        let table = CreateTableNode::new("t")
            .add_column(ColumnNode::new("id", "INT").set_primary())
            .set_option("charset", "utf8mb4")
            .set_option("ENGINE", "InnoDB")
            .set_option("comment", "it's a table");
        let sql = render(table);
        assert!(sql.contains(") ENGINE=InnoDB CHARSET=utf8mb4 COMMENT='it''s a table';"));
    }

    #[test]
    fn test_table_comment_without_option() {
        let table = CreateTableNode::new("t")
            .add_column(ColumnNode::new("id", "INT").set_primary().set_comment("Row id"))
            .set_comment("Things");
        let sql = render(table);
        assert!(sql.contains("id INT PRIMARY KEY COMMENT 'Row id'"));
        assert!(sql.ends_with(") COMMENT='Things';\n"));
    }

    #[test]
    fn test_foreign_keys_are_hoisted() {
        let table = CreateTableNode::new("orders")
            .add_column(ColumnNode::new("id", "INT").set_primary())
            .add_column(
                ColumnNode::new("user_id", "INT")
                    .set_foreign_key(ForeignKeyRef::new("users", "id", "fk_orders_user")),
            );
        let sql = render(table);
        assert!(sql.contains(
            "CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users(id)"
        ));
    }

    #[test]
    fn test_modify_column() {
        let alter = AlterTableNode::new("users")
            .add_operation(AlterOperation::ModifyColumn(
                ColumnNode::new("email", "VARCHAR(320)").set_not_null(),
            ))
            .add_operation(AlterOperation::ModifyColumn(
                ColumnNode::new("id", "BIGINT").set_primary().set_auto_increment(),
            ))
            .add_operation(AlterOperation::DropColumn("legacy".into()));
        assert_eq!(
            render(alter),
            "ALTER TABLE users MODIFY COLUMN email VARCHAR(320) NOT NULL;\n\
             ALTER TABLE users MODIFY COLUMN id BIGINT NOT NULL AUTO_INCREMENT;\n\
             ALTER TABLE users DROP COLUMN legacy;\n"
        );
    }

    #[test]
    fn test_indexes() {
        assert_eq!(
            render(IndexNode::new("idx_users_email", "users", &["email"]).set_type("btree")),
            "CREATE INDEX idx_users_email ON users (email) USING BTREE;\n"
        );
        assert_eq!(
            render(IndexNode::new("ft_posts_body", "posts", &["body"]).set_type("FULLTEXT")),
            "CREATE FULLTEXT INDEX ft_posts_body ON posts (body);\n"
        );
        assert_eq!(
            render(DropIndexNode::new("idx_users_email").on_table("users")),
            "DROP INDEX idx_users_email ON users;\n"
        );
        assert!(render(DropIndexNode::new("idx_orphan")).starts_with("-- WARNING"));
    }

    #[test]
    fn test_type_statements_are_comments() {
        let sql = render(CreateTypeNode::new(
            "mood",
            TypeDefinition::Enum(vec!["happy".into()]),
        ));
        assert!(sql.starts_with("-- mysql has no separate type objects"));
        assert!(render(AlterTypeNode::new("mood").add_value("sad")).starts_with("--"));
        assert!(render(DropTypeNode::new("mood")).starts_with("--"));
    }

    #[test]
    fn test_alter_type_updates_inline_enum() {
        let schema = StatementList::new()
            .with(CreateTypeNode::new(
                "mood",
                TypeDefinition::Enum(vec!["happy".into()]),
            ))
            .with(AlterTypeNode::new("mood").add_value("sad"))
            .with(CreateTableNode::new("people").add_column(ColumnNode::new("mood", "mood")));
        let sql = MySqlRenderer::mysql().render_schema(&schema).unwrap();
        assert!(sql.contains("mood ENUM('happy', 'sad')"));
    }
}
