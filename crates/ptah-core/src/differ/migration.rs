//! Migration SQL generation from a [`SchemaDiff`].

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::embedded::table_fields;
use super::sqlgen::generate_basic_create_table_sql;
use super::{EnumDiff, SchemaDiff, TableDiff};
use crate::ast::from_schema::{column_node, index_node};
use crate::ast::{
    AlterOperation, AlterTableNode, AlterTypeNode, ColumnChanges, DropIndexNode, EnumNode, Node,
};
use crate::renderer::{Dialect, RenderVisitor, renderer_for};
use crate::schema::{Field, GeneratedSchema};

impl SchemaDiff {
    /// Generates the statements that bring the database in line with
    /// `generated`.
    ///
    /// Statements come in dependency order: new enums, enum changes, new
    /// tables, column changes, removed columns and tables, then index
    /// changes. Destructive changes are never applied: they are emitted as
    /// commented-out statements under a `WARNING` line.
    #[must_use]
    pub fn migration_sql(&self, generated: &GeneratedSchema, dialect: &str) -> Vec<String> {
        let mut generator = MigrationGenerator {
            generated,
            kind: Dialect::from_name(dialect),
            dialect,
            renderer: renderer_for(dialect),
            statements: Vec::new(),
        };

        generator.enums_added(&self.enums_added);
        for enum_diff in &self.enums_modified {
            generator.enum_modified(enum_diff);
        }
        generator.enums_removed(&self.enums_removed);
        generator.tables_added(&self.tables_added);
        for table_diff in &self.tables_modified {
            generator.table_modified(table_diff);
        }
        generator.tables_removed(&self.tables_removed);
        generator.indexes_added(&self.indexes_added);
        generator.indexes_removed(&self.indexes_removed, &self.removed_index_tables);

        debug!(
            dialect,
            statements = generator.statements.len(),
            "generated migration SQL"
        );
        generator.statements
    }
}

struct MigrationGenerator<'a> {
    generated: &'a GeneratedSchema,
    kind: Dialect,
    dialect: &'a str,
    renderer: Box<dyn RenderVisitor>,
    statements: Vec<String>,
}

impl MigrationGenerator<'_> {
    /// Renders a node and records the output. Render failures become
    /// `-- ERROR:` comments so the rest of the script is still produced.
    fn render(&mut self, node: Node) {
        match self.renderer.render(&node) {
            Ok(sql) => self.push(sql.trim_end()),
            Err(e) => {
                warn!(dialect = self.dialect, error = %e, "failed to render migration statement");
                self.push(&format!("-- ERROR: {e}"));
            }
        }
    }

    fn push(&mut self, sql: &str) {
        if !sql.is_empty() {
            self.statements.push(sql.to_string());
        }
    }

    fn enums_added(&mut self, names: &[String]) {
        let enums = self.generated.effective_enums();
        for name in names {
            if let Some(declared) = enums.iter().find(|e| &e.name == name) {
                self.render(Node::Enum(EnumNode {
                    name: declared.name.clone(),
                    values: declared.values.clone(),
                }));
            }
        }
    }

    fn enum_modified(&mut self, enum_diff: &EnumDiff) {
        let name = &enum_diff.enum_name;

        if self.kind.is_mysql_family() {
            self.push(&format!(
                "-- NOTE: enum {name} is inlined in column definitions on {}; affected columns are updated with MODIFY COLUMN",
                self.dialect
            ));
            return;
        }

        if !enum_diff.values_added.is_empty() {
            let node = enum_diff
                .values_added
                .iter()
                .fold(AlterTypeNode::new(name.clone()), |node, value| {
                    node.add_value(value.clone())
                });
            self.render(Node::AlterType(node));
        }

        if !enum_diff.values_removed.is_empty() {
            let removed = enum_diff.values_removed.join(", ");
            warn!(enum_name = %name, values = %removed, "enum values removed, manual migration required");
            if self.kind == Dialect::Postgres {
                self.push(&format!(
                    "-- WARNING: PostgreSQL does not support removing enum values; remove {removed} from {name} manually"
                ));
            } else {
                self.push(&format!(
                    "-- WARNING: enum {name} lost values {removed}; update it manually for {}",
                    self.dialect
                ));
            }
        }
    }

    fn enums_removed(&mut self, names: &[String]) {
        for name in names {
            warn!(enum_name = %name, "enum exists only in the database");
            self.push(&format!(
                "-- WARNING: enum {name} is no longer declared, review before dropping\n-- DROP TYPE {name};"
            ));
        }
    }

    fn tables_added(&mut self, names: &[String]) {
        // Declaration order, so referenced tables come first.
        let tables = self
            .generated
            .tables
            .iter()
            .filter(|t| names.contains(&t.name));
        for table in tables {
            let fields = table_fields(self.generated, table);
            let sql = generate_basic_create_table_sql(table, &fields, self.dialect);
            self.push(&sql);
        }
    }

    fn fields_of(&self, table_name: &str) -> Vec<Field> {
        self.generated
            .get_table(table_name)
            .map(|t| table_fields(self.generated, t))
            .unwrap_or_default()
    }

    fn table_modified(&mut self, table_diff: &TableDiff) {
        let table = &table_diff.table_name;
        let fields = self.fields_of(table);
        let find = |name: &str| fields.iter().find(|f| f.name == name);

        let mut alter = AlterTableNode::new(table.clone());
        for name in &table_diff.columns_added {
            if let Some(field) = find(name) {
                alter = alter.add_operation(AlterOperation::AddColumn(column_node(
                    field,
                    table,
                    self.dialect,
                )));
            }
        }
        let mut constraint_notes = Vec::new();
        for column_diff in &table_diff.columns_modified {
            let Some(field) = find(&column_diff.column_name) else {
                continue;
            };
            let changes =
                ColumnChanges::from_kinds(column_diff.changes.keys().map(String::as_str));
            if !changes.is_empty() || self.kind.is_mysql_family() {
                alter = alter.add_operation(AlterOperation::AlterColumn(
                    column_node(field, table, self.dialect),
                    changes,
                ));
            }
            // MODIFY COLUMN restates the key flags on MySQL; elsewhere they
            // live in constraints.
            if !self.kind.is_mysql_family() {
                for kind in ["primary_key", "unique"] {
                    if let Some(change) = column_diff.changes.get(kind) {
                        constraint_notes.push(format!(
                            "-- TODO: {kind} of {table}.{} changed ({change}); update its constraint manually",
                            column_diff.column_name
                        ));
                    }
                }
            }
        }
        if !alter.operations.is_empty() {
            self.render(Node::AlterTable(alter));
        }
        for note in constraint_notes {
            self.push(&note);
        }

        for column in &table_diff.columns_removed {
            warn!(table = %table, column = %column, "column exists only in the database");
            self.push(&format!(
                "-- WARNING: column {table}.{column} is no longer declared, dropping it destroys data\n-- ALTER TABLE {table} DROP COLUMN {column};"
            ));
        }
    }

    fn tables_removed(&mut self, names: &[String]) {
        for name in names {
            warn!(table = %name, "table exists only in the database");
            self.push(&format!(
                "-- WARNING: table {name} is no longer declared, dropping it destroys data\n-- DROP TABLE {name};"
            ));
        }
    }

    fn indexes_added(&mut self, names: &[String]) {
        for name in names {
            let Some(index) = self.generated.indexes.iter().find(|i| &i.name == name) else {
                continue;
            };
            match index_node(self.generated, index) {
                Some(node) => self.render(Node::Index(node)),
                None => self.push(&format!(
                    "-- WARNING: index {name} refers to unknown struct {}",
                    index.struct_name
                )),
            }
        }
    }

    fn indexes_removed(&mut self, names: &[String], tables: &BTreeMap<String, String>) {
        for name in names {
            let mut node = DropIndexNode::new(name.clone());
            if let Some(table) = tables.get(name) {
                node = node.on_table(table.clone());
            } else if self.kind.is_mysql_family() {
                self.push(&format!(
                    "-- TODO: DROP INDEX {name} ON <table>; {} needs the owning table",
                    self.dialect
                ));
                continue;
            }
            if !self.kind.is_mysql_family() {
                node = node.set_if_exists();
            }
            self.render(Node::DropIndex(node));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::differ::{ColumnDiff, EnumDiff, SchemaDiff, TableDiff};
    use crate::schema::{Enum, Field, GeneratedSchema, Index, Table};

    fn changes(kinds: &[(&str, &str)]) -> BTreeMap<String, String> {
        kinds
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn generated() -> GeneratedSchema {
        GeneratedSchema::new()
            .enum_type(Enum::new("user_status", &["active", "banned"]))
            .table(Table::new("User", "users"))
            .field(Field::new("User", "id", "SERIAL").primary())
            .field(Field::new("User", "email", "VARCHAR(255)").unique())
            .field(Field::new("User", "status", "user_status").default_value("active"))
            .index(Index::new("User", "idx_users_email", &["email"]))
    }

    #[test]
    fn test_new_table_and_enum() {
        let diff = SchemaDiff {
            tables_added: vec!["users".into()],
            enums_added: vec!["user_status".into()],
            indexes_added: vec!["idx_users_email".into()],
            ..SchemaDiff::default()
        };
        let sql = diff.migration_sql(&generated(), "postgres");
        assert_eq!(sql.len(), 3);
        assert_eq!(sql[0], "CREATE TYPE user_status AS ENUM ('active', 'banned');");
        assert!(sql[1].starts_with("CREATE TABLE users ("));
        assert!(sql[1].contains("status user_status NOT NULL DEFAULT 'active'"));
        assert_eq!(sql[2], "CREATE INDEX idx_users_email ON users (email);");
    }

    #[test]
    fn test_mysql_new_table_inlines_enum() {
        let diff = SchemaDiff {
            tables_added: vec!["users".into()],
            ..SchemaDiff::default()
        };
        let sql = diff.migration_sql(&generated(), "mysql");
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("status ENUM('active', 'banned') NOT NULL DEFAULT 'active'"));
        assert!(sql[0].contains("id INT AUTO_INCREMENT PRIMARY KEY"));
    }

    #[test]
    fn test_enum_value_removal_warns_on_postgres() {
        let diff = SchemaDiff {
            enums_modified: vec![EnumDiff {
                enum_name: "user_status".into(),
                values_added: vec!["archived".into()],
                values_removed: vec!["deleted".into()],
            }],
            ..SchemaDiff::default()
        };
        let sql = diff.migration_sql(&generated(), "postgres");
        assert_eq!(sql[0], "ALTER TYPE user_status ADD VALUE 'archived';");
        assert!(sql[1].starts_with("-- WARNING: PostgreSQL does not support removing enum values"));
        assert!(sql[1].contains("deleted"));
    }

    #[test]
    fn test_column_changes_and_removals() {
        let diff = SchemaDiff {
            tables_modified: vec![TableDiff {
                table_name: "users".into(),
                columns_added: vec!["email".into()],
                columns_removed: vec!["legacy".into()],
                columns_modified: vec![ColumnDiff {
                    column_name: "status".into(),
                    changes: changes(&[("type", "text -> user_status"), ("default", "none -> active")]),
                }],
            }],
            tables_removed: vec!["old_things".into()],
            ..SchemaDiff::default()
        };

        let sql = diff.migration_sql(&generated(), "postgres");
        assert!(sql[0].contains("ALTER TABLE users ADD COLUMN email VARCHAR(255) NOT NULL UNIQUE;"));
        assert!(sql[0].contains("ALTER TABLE users ALTER COLUMN status TYPE user_status;"));
        assert!(sql[0].contains("ALTER TABLE users ALTER COLUMN status SET DEFAULT 'active';"));
        assert!(!sql[0].contains("NOT NULL;"));
        assert_eq!(
            sql[1],
            "-- WARNING: column users.legacy is no longer declared, dropping it destroys data\n-- ALTER TABLE users DROP COLUMN legacy;"
        );
        assert!(sql[2].starts_with("-- WARNING: table old_things"));
        assert!(sql.iter().all(|s| !s.starts_with("DROP")));

        let sql = diff.migration_sql(&generated(), "mysql");
        assert!(sql[0].contains("ALTER TABLE users MODIFY COLUMN status ENUM('active', 'banned') NOT NULL DEFAULT 'active';"));
    }

    #[test]
    fn test_generic_dialect_stays_conservative() {
        let diff = SchemaDiff {
            tables_modified: vec![TableDiff {
                table_name: "users".into(),
                columns_modified: vec![ColumnDiff {
                    column_name: "email".into(),
                    changes: changes(&[("type", "text -> varchar(255)")]),
                }],
                ..TableDiff::default()
            }],
            indexes_removed: vec!["idx_old".into()],
            ..SchemaDiff::default()
        };
        let sql = diff.migration_sql(&generated(), "oracle");
        assert!(sql.iter().all(|s| s.lines().all(|l| l.starts_with("--"))));
        assert!(sql[0].contains("TODO"));
    }

    #[test]
    fn test_serial_column_keeps_its_sequence() {
        let diff = SchemaDiff {
            tables_modified: vec![TableDiff {
                table_name: "users".into(),
                columns_modified: vec![ColumnDiff {
                    column_name: "id".into(),
                    changes: changes(&[
                        ("nullable", "true -> false"),
                        ("primary_key", "false -> true"),
                    ]),
                }],
                ..TableDiff::default()
            }],
            ..SchemaDiff::default()
        };
        let sql = diff.migration_sql(&generated(), "postgres");
        assert_eq!(sql[0], "ALTER TABLE users ALTER COLUMN id SET NOT NULL;");
        assert!(sql[1].starts_with("-- TODO: primary_key of users.id changed"));
        assert!(sql.iter().all(|s| !s.contains("DROP DEFAULT")));
    }

    #[test]
    fn test_mysql_index_drop_uses_recorded_table() {
        let diff = SchemaDiff {
            indexes_removed: vec!["idx_old".into(), "idx_orphan".into()],
            removed_index_tables: [("idx_old".to_string(), "users".to_string())]
                .into_iter()
                .collect(),
            ..SchemaDiff::default()
        };
        let sql = diff.migration_sql(&generated(), "mariadb");
        assert_eq!(
            sql,
            vec![
                "DROP INDEX idx_old ON users;",
                "-- TODO: DROP INDEX idx_orphan ON <table>; mariadb needs the owning table",
            ]
        );
        let sql = diff.migration_sql(&generated(), "postgres");
        assert_eq!(
            sql,
            vec!["DROP INDEX IF EXISTS idx_old;", "DROP INDEX IF EXISTS idx_orphan;"]
        );
    }
}
