//! Conversion from the declared schema model to DDL nodes.

use super::{
    ColumnNode, ConstraintNode, CreateTableNode, EnumNode, ForeignKeyRef, IndexNode,
    StatementList,
};
use crate::differ::{map_type_to_sql, table_fields};
use crate::schema::{Field, GeneratedSchema, Index, Table};

/// Builds the column node for a declared field.
///
/// Enum fields get the dialect's enum type (inline `ENUM(...)` on MySQL);
/// other types are passed through for the renderer to translate. A foreign
/// key without an explicit name is called `fk_<table>_<column>`.
#[must_use]
pub fn column_node(field: &Field, table: &str, dialect: &str) -> ColumnNode {
    let column_type = if field.is_enum() {
        map_type_to_sql(&field.field_type, &field.enum_values, dialect)
    } else {
        field.field_type.clone()
    };

    let mut column = ColumnNode::new(field.name.clone(), column_type);
    column.nullable = field.nullable && !field.primary;
    column.primary = field.primary;
    column.unique = field.unique;
    column.auto_increment = field.auto_increment;
    column.check.clone_from(&field.check);
    column.comment.clone_from(&field.comment);

    if let Some(ref expr) = field.default_expr {
        column = column.set_default_expression(expr.clone());
    } else if let Some(ref value) = field.default {
        column = column.set_default(value.clone());
    }

    if let Some((ref_table, ref_column)) = field.foreign_reference() {
        let name = field
            .foreign_key_name
            .clone()
            .unwrap_or_else(|| format!("fk_{table}_{}", field.name));
        let mut reference = ForeignKeyRef::new(ref_table, ref_column, name);
        reference.on_delete.clone_from(&field.on_delete);
        reference.on_update.clone_from(&field.on_update);
        column = column.set_foreign_key(reference);
    }

    column
}

/// Builds the CREATE TABLE node for a declared table, embedded fields
/// included.
#[must_use]
pub fn table_node(schema: &GeneratedSchema, table: &Table, dialect: &str) -> CreateTableNode {
    let fields = table_fields(schema, table);

    let mut primary: Vec<&str> = fields
        .iter()
        .filter(|f| f.primary)
        .map(|f| f.name.as_str())
        .collect();
    if primary.len() < 2 && table.primary_key.len() > 1 {
        primary = table.primary_key.iter().map(String::as_str).collect();
    }
    let composite = primary.len() > 1;

    let mut node = CreateTableNode::new(table.name.clone());
    for field in &fields {
        let mut column = column_node(field, &table.name, dialect);
        if composite && primary.contains(&field.name.as_str()) {
            column.primary = false;
            column.nullable = false;
        }
        node = node.add_column(column);
    }

    if composite {
        node = node.add_constraint(ConstraintNode::primary_key(&primary));
    }

    if let Some(options) = table.options_for(dialect) {
        for (key, value) in options {
            node = node.set_option(key.clone(), value.clone());
        }
    }

    if let Some(ref comment) = table.comment {
        node = node.set_comment(comment.clone());
    }

    node
}

/// Builds the CREATE INDEX node for a declared index. Returns `None` when
/// the index refers to an undeclared struct.
#[must_use]
pub fn index_node(schema: &GeneratedSchema, index: &Index) -> Option<IndexNode> {
    let table = schema
        .tables
        .iter()
        .find(|t| t.struct_name == index.struct_name)?;

    let mut node = IndexNode {
        name: index.name.clone(),
        table: table.name.clone(),
        columns: index.fields.clone(),
        unique: index.unique,
        index_type: None,
        comment: None,
    };
    if let Some(ref comment) = index.comment {
        node = node.set_comment(comment.clone());
    }
    Some(node)
}

/// Builds the full creation script for a schema: enums, then tables in
/// declaration order, then indexes.
#[must_use]
pub fn schema_statements(schema: &GeneratedSchema, dialect: &str) -> StatementList {
    let mut statements = StatementList::new();

    for declared in schema.effective_enums() {
        statements.push(EnumNode {
            name: declared.name,
            values: declared.values,
        });
    }

    for table in &schema.tables {
        statements.push(table_node(schema, table, dialect));
    }

    for index in &schema.indexes {
        if let Some(node) = index_node(schema, index) {
            statements.push(node);
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConstraintKind, DefaultValue, Node};
    use crate::renderer::{MySqlRenderer, PostgresRenderer, RenderVisitor};
    use crate::schema::Enum;

    fn schema() -> GeneratedSchema {
        GeneratedSchema::new()
            .enum_type(Enum::new("user_status", &["active", "banned"]))
            .table(
                Table::new("User", "users")
                    .comment("Registered users")
                    .option("mysql", "ENGINE", "InnoDB"),
            )
            .field(Field::new("User", "id", "SERIAL").primary())
            .field(Field::new("User", "status", "user_status").default_value("active"))
            .field(
                Field::new("User", "team_id", "INTEGER")
                    .nullable()
                    .foreign("teams", "id")
                    .on_delete("SET NULL"),
            )
            .index(Index::new("User", "idx_users_status", &["status"]))
    }

    #[test]
    fn test_column_node() {
        let field = Field::new("User", "created_at", "TIMESTAMP").default_expr("NOW()");
        let column = column_node(&field, "users", "postgres");
        assert!(!column.nullable);
        assert_eq!(column.default, Some(DefaultValue::Expression("NOW()".into())));

        let field = Field::new("User", "team_id", "INTEGER").foreign("teams", "id");
        let column = column_node(&field, "users", "postgres");
        let fk = column.foreign_key.unwrap();
        assert_eq!(fk.name, "fk_users_team_id");
        assert_eq!(fk.table, "teams");
    }

    #[test]
    fn test_table_node_composite_key() {
        let schema = GeneratedSchema::new()
            .table(Table::new("Membership", "memberships"))
            .field(Field::new("Membership", "user_id", "INTEGER").primary())
            .field(Field::new("Membership", "team_id", "INTEGER").primary());
        let node = table_node(&schema, &schema.tables[0], "postgres");
        assert!(node.columns.iter().all(|c| !c.primary && !c.nullable));
        assert_eq!(
            node.constraints[0].kind,
            ConstraintKind::PrimaryKey {
                columns: vec!["user_id".into(), "team_id".into()]
            }
        );
    }

    #[test]
    fn test_schema_statements_postgres() {
        let statements = schema_statements(&schema(), "postgres");
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements.statements[0], Node::Enum(_)));

        let sql = PostgresRenderer::new().render_schema(&statements).unwrap();
        assert!(sql.starts_with("CREATE TYPE user_status AS ENUM ('active', 'banned');\n"));
        assert!(sql.contains("status user_status NOT NULL DEFAULT 'active'"));
        assert!(sql.contains(
            "CONSTRAINT fk_users_team_id FOREIGN KEY (team_id) REFERENCES teams(id) ON DELETE SET NULL"
        ));
        assert!(sql.contains("COMMENT ON TABLE users IS 'Registered users';"));
        assert!(sql.contains("CREATE INDEX idx_users_status ON users (status);"));
        assert!(!sql.contains("ENGINE"));
    }

    #[test]
    fn test_schema_statements_mysql() {
        let statements = schema_statements(&schema(), "mysql");
        let sql = MySqlRenderer::mysql().render_schema(&statements).unwrap();
        assert!(!sql.contains("CREATE TYPE"));
        assert!(sql.contains("status ENUM('active', 'banned') NOT NULL DEFAULT 'active'"));
        assert!(sql.contains(") ENGINE=InnoDB COMMENT='Registered users';"));
    }
}
