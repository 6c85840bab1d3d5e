//! Schema differ.
//!
//! Compares the schema declared by application code ([`GeneratedSchema`])
//! with an introspected database ([`DatabaseSchema`]) and describes the
//! differences as a [`SchemaDiff`]. The comparison is read-only and
//! deterministic: every list in the result is sorted by name.
//!
//! ```rust
//! use ptah_core::differ::compare_schemas;
//! use ptah_core::schema::{DatabaseSchema, Field, GeneratedSchema, Table};
//!
//! let generated = GeneratedSchema::new()
//!     .table(Table::new("User", "users"))
//!     .field(Field::new("User", "id", "SERIAL").primary());
//! let database = DatabaseSchema::new("postgres");
//!
//! let diff = compare_schemas(&generated, &database);
//! assert_eq!(diff.tables_added, vec!["users"]);
//! ```

mod embedded;
mod migration;
mod sqlgen;
mod types;

pub use embedded::{expand_embedded_fields, table_fields};
pub use sqlgen::{generate_basic_create_table_sql, generate_column_definition};
pub use types::{
    implies_auto_increment, is_enum_type, map_type_to_sql, needs_quoting, normalize_default,
    normalize_type, parse_inline_enum,
};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::renderer::Dialect;
use crate::schema::{DatabaseSchema, DbColumn, DbTable, Field, GeneratedSchema, Table};

// ================================================================
// Public types
// ================================================================

/// Changes to a single column, keyed by what changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDiff {
    /// Column name.
    pub column_name: String,
    /// Change kind (`type`, `nullable`, `primary_key`, `unique`,
    /// `default`) mapped to an `"old -> new"` description.
    pub changes: BTreeMap<String, String>,
}

/// Column-level changes to a table present on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDiff {
    /// Table name.
    pub table_name: String,
    /// Columns declared in code but missing from the database.
    pub columns_added: Vec<String>,
    /// Columns present in the database but no longer declared.
    pub columns_removed: Vec<String>,
    /// Columns whose definition differs.
    pub columns_modified: Vec<ColumnDiff>,
}

impl TableDiff {
    /// Returns `true` if the table has any column change.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.columns_added.is_empty()
            || !self.columns_removed.is_empty()
            || !self.columns_modified.is_empty()
    }
}

/// Value changes of an enum present on both sides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDiff {
    /// Enum name.
    pub enum_name: String,
    /// Values declared in code but missing from the database.
    pub values_added: Vec<String>,
    /// Values present in the database but no longer declared.
    pub values_removed: Vec<String>,
}

/// Result of comparing a generated schema with a database schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Tables to create.
    pub tables_added: Vec<String>,
    /// Tables present only in the database.
    pub tables_removed: Vec<String>,
    /// Tables with column changes.
    pub tables_modified: Vec<TableDiff>,
    /// Enums to create.
    pub enums_added: Vec<String>,
    /// Enums present only in the database.
    pub enums_removed: Vec<String>,
    /// Enums with value changes.
    pub enums_modified: Vec<EnumDiff>,
    /// Indexes to create.
    pub indexes_added: Vec<String>,
    /// Indexes present only in the database.
    pub indexes_removed: Vec<String>,
    /// Owning table of each removed index, as recorded by the database.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub removed_index_tables: BTreeMap<String, String>,
}

impl SchemaDiff {
    /// Returns `true` if at least one change was found.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.tables_added.is_empty()
            || !self.tables_removed.is_empty()
            || !self.tables_modified.is_empty()
            || !self.enums_added.is_empty()
            || !self.enums_removed.is_empty()
            || !self.enums_modified.is_empty()
            || !self.indexes_added.is_empty()
            || !self.indexes_removed.is_empty()
    }
}

// ================================================================
// Comparison
// ================================================================

/// Compares the declared schema against the database.
///
/// Tables, enums and indexes are compared in independent passes. Enums are
/// not compared against MySQL-family databases, which have no enum types.
#[must_use]
pub fn compare_schemas(generated: &GeneratedSchema, database: &DatabaseSchema) -> SchemaDiff {
    let mut diff = SchemaDiff::default();
    let dialect = Dialect::from_name(&database.dialect);

    compare_tables(generated, database, &dialect, &mut diff);
    if !dialect.is_mysql_family() {
        compare_enums(generated, database, &mut diff);
    }
    compare_indexes(generated, database, &mut diff);

    debug!(
        dialect = %dialect,
        tables_added = diff.tables_added.len(),
        tables_removed = diff.tables_removed.len(),
        tables_modified = diff.tables_modified.len(),
        enums_added = diff.enums_added.len(),
        enums_modified = diff.enums_modified.len(),
        indexes_added = diff.indexes_added.len(),
        indexes_removed = diff.indexes_removed.len(),
        "compared schemas"
    );

    diff
}

fn compare_tables(
    generated: &GeneratedSchema,
    database: &DatabaseSchema,
    dialect: &Dialect,
    diff: &mut SchemaDiff,
) {
    let generated_names: BTreeSet<&str> = generated.tables.iter().map(|t| t.name.as_str()).collect();
    let database_names: BTreeSet<&str> = database.tables.iter().map(|t| t.name.as_str()).collect();

    diff.tables_added = generated_names
        .difference(&database_names)
        .map(|s| (*s).to_string())
        .collect();
    diff.tables_removed = database_names
        .difference(&generated_names)
        .map(|s| (*s).to_string())
        .collect();

    for &name in generated_names.intersection(&database_names) {
        let (Some(table), Some(db_table)) = (generated.get_table(name), database.get_table(name))
        else {
            continue;
        };
        let table_diff = compare_table(generated, table, database, db_table, dialect);
        if table_diff.has_changes() {
            diff.tables_modified.push(table_diff);
        }
    }
}

fn compare_table(
    generated: &GeneratedSchema,
    table: &Table,
    database: &DatabaseSchema,
    db_table: &DbTable,
    dialect: &Dialect,
) -> TableDiff {
    let fields = table_fields(generated, table);

    let field_names: BTreeSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    let column_names: BTreeSet<&str> = db_table.columns.iter().map(|c| c.name.as_str()).collect();

    let mut table_diff = TableDiff {
        table_name: table.name.clone(),
        columns_added: field_names
            .difference(&column_names)
            .map(|s| (*s).to_string())
            .collect(),
        columns_removed: column_names
            .difference(&field_names)
            .map(|s| (*s).to_string())
            .collect(),
        columns_modified: Vec::new(),
    };

    for &name in field_names.intersection(&column_names) {
        let (Some(field), Some(column)) = (
            fields.iter().find(|f| f.name == name),
            db_table.get_column(name),
        ) else {
            continue;
        };

        let primary = field.primary || table.primary_key.iter().any(|c| c == name);
        let changes = compare_column(field, primary, column, db_table, database, dialect);
        if !changes.is_empty() {
            table_diff.columns_modified.push(ColumnDiff {
                column_name: name.to_string(),
                changes,
            });
        }
    }

    table_diff
}

/// Compares one declared field with its database column.
fn compare_column(
    field: &Field,
    primary: bool,
    column: &DbColumn,
    db_table: &DbTable,
    database: &DatabaseSchema,
    dialect: &Dialect,
) -> BTreeMap<String, String> {
    let mut changes = BTreeMap::new();
    let db_type = column.full_type();

    // ---- type --------------------------------------------------
    let type_matches = if field.is_enum() {
        if dialect.is_mysql_family() {
            parse_inline_enum(&db_type).is_some_and(|values| values == field.enum_values)
        } else {
            db_type.eq_ignore_ascii_case(&field.field_type)
        }
    } else {
        normalize_type(&field.field_type) == normalize_type(&db_type)
    };
    if !type_matches {
        let expected = map_type_to_sql(&field.field_type, &field.enum_values, dialect.name());
        changes.insert("type".to_string(), format!("{db_type} -> {expected}"));
    }

    // ---- nullability -------------------------------------------
    let nullable = field.nullable && !primary;
    if column.nullable != nullable {
        changes.insert(
            "nullable".to_string(),
            format!("{} -> {nullable}", column.nullable),
        );
    }

    // ---- primary key -------------------------------------------
    if column.primary_key != primary {
        changes.insert(
            "primary_key".to_string(),
            format!("{} -> {primary}", column.primary_key),
        );
    }

    // ---- unique ------------------------------------------------
    if !primary {
        let db_unique = column.unique
            || database.constraints.iter().any(|c| {
                c.table == db_table.name
                    && c.column == column.name
                    && c.constraint_type.eq_ignore_ascii_case("UNIQUE")
            });
        if db_unique != field.unique {
            changes.insert(
                "unique".to_string(),
                format!("{db_unique} -> {}", field.unique),
            );
        }
    }

    // ---- default -----------------------------------------------
    let declared = field.default_expr.as_deref().or(field.default.as_deref());
    let expected_default = normalize_default(declared);
    let actual_default = normalize_default(column.default.as_deref());
    if expected_default != actual_default {
        changes.insert(
            "default".to_string(),
            format!(
                "{} -> {}",
                actual_default.as_deref().unwrap_or("none"),
                expected_default.as_deref().unwrap_or("none")
            ),
        );
    }

    changes
}

fn compare_enums(generated: &GeneratedSchema, database: &DatabaseSchema, diff: &mut SchemaDiff) {
    let enums = generated.effective_enums();

    let generated_names: BTreeSet<&str> = enums.iter().map(|e| e.name.as_str()).collect();
    let database_names: BTreeSet<&str> = database.enums.iter().map(|e| e.name.as_str()).collect();

    diff.enums_added = generated_names
        .difference(&database_names)
        .map(|s| (*s).to_string())
        .collect();
    diff.enums_removed = database_names
        .difference(&generated_names)
        .map(|s| (*s).to_string())
        .collect();

    for &name in generated_names.intersection(&database_names) {
        let (Some(declared), Some(existing)) = (
            enums.iter().find(|e| e.name == name),
            database.get_enum(name),
        ) else {
            continue;
        };

        let values_added: Vec<String> = declared
            .values
            .iter()
            .filter(|v| !existing.values.contains(v))
            .cloned()
            .collect();
        let values_removed: Vec<String> = existing
            .values
            .iter()
            .filter(|v| !declared.values.contains(v))
            .cloned()
            .collect();

        if !values_added.is_empty() || !values_removed.is_empty() {
            diff.enums_modified.push(EnumDiff {
                enum_name: name.to_string(),
                values_added,
                values_removed,
            });
        }
    }
}

fn compare_indexes(generated: &GeneratedSchema, database: &DatabaseSchema, diff: &mut SchemaDiff) {
    let generated_names: BTreeSet<&str> =
        generated.indexes.iter().map(|i| i.name.as_str()).collect();

    let unique_constraints: BTreeSet<&str> = database
        .constraints
        .iter()
        .filter(|c| c.constraint_type.eq_ignore_ascii_case("UNIQUE"))
        .map(|c| c.name.as_str())
        .collect();

    // Unique columns declared in code get an implicit index in the database.
    let unique_columns: BTreeSet<(String, String)> = generated
        .tables
        .iter()
        .flat_map(|t| {
            table_fields(generated, t)
                .into_iter()
                .filter(|f| f.unique)
                .map(move |f| (t.name.clone(), f.name))
        })
        .collect();

    let database_names: BTreeSet<&str> = database
        .indexes
        .iter()
        .filter(|i| !i.primary && !unique_constraints.contains(i.name.as_str()))
        .filter(|i| {
            !(i.unique
                && i.columns.len() == 1
                && unique_columns.contains(&(i.table.clone(), i.columns[0].clone())))
        })
        .map(|i| i.name.as_str())
        .collect();

    diff.indexes_added = generated_names
        .difference(&database_names)
        .filter(|name| !database.indexes.iter().any(|i| i.name == **name))
        .map(|s| (*s).to_string())
        .collect();
    diff.indexes_removed = database_names
        .difference(&generated_names)
        .map(|s| (*s).to_string())
        .collect();
    diff.removed_index_tables = database
        .indexes
        .iter()
        .filter(|i| diff.indexes_removed.contains(&i.name) && !i.table.is_empty())
        .map(|i| (i.name.clone(), i.table.clone()))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DbEnum, DbIndex, Enum, Index};

    fn users_generated() -> GeneratedSchema {
        GeneratedSchema::new()
            .table(Table::new("User", "users"))
            .field(Field::new("User", "id", "SERIAL").primary())
            .field(Field::new("User", "email", "VARCHAR(255)").unique())
    }

    fn users_database() -> DatabaseSchema {
        DatabaseSchema::new("postgres").table(
            DbTable::new("users")
                .column(
                    DbColumn::new("id", "integer")
                        .primary_key()
                        .auto_increment()
                        .default_value("nextval('users_id_seq'::regclass)"),
                )
                .column(
                    DbColumn::new("email", "character varying")
                        .max_length(255)
                        .unique(),
                ),
        )
    }

    #[test]
    fn test_identical_schemas_have_no_changes() {
        let diff = compare_schemas(&users_generated(), &users_database());
        assert!(!diff.has_changes(), "unexpected diff: {diff:?}");
    }

    #[test]
    fn test_table_added_and_removed() {
        let generated = users_generated();
        let database = DatabaseSchema::new("postgres").table(DbTable::new("legacy"));
        let diff = compare_schemas(&generated, &database);
        assert_eq!(diff.tables_added, vec!["users"]);
        assert_eq!(diff.tables_removed, vec!["legacy"]);
        assert!(diff.tables_modified.is_empty());
    }

    #[test]
    fn test_column_changes() {
        let generated = users_generated()
            .field(Field::new("User", "name", "TEXT").nullable())
            .field(Field::new("User", "status", "VARCHAR(20)").default_value("active"));
        let database = DatabaseSchema::new("postgres").table(
            DbTable::new("users")
                .column(DbColumn::new("id", "integer").primary_key())
                .column(DbColumn::new("email", "character varying").max_length(100))
                .column(DbColumn::new("status", "character varying").max_length(20))
                .column(DbColumn::new("legacy", "text").nullable()),
        );

        let diff = compare_schemas(&generated, &database);
        assert_eq!(diff.tables_modified.len(), 1);
        let table = &diff.tables_modified[0];
        assert_eq!(table.columns_added, vec!["name"]);
        assert_eq!(table.columns_removed, vec!["legacy"]);

        let email = table
            .columns_modified
            .iter()
            .find(|c| c.column_name == "email")
            .unwrap();
        assert_eq!(
            email.changes.get("type").map(String::as_str),
            Some("character varying(100) -> VARCHAR(255)")
        );
        assert_eq!(
            email.changes.get("unique").map(String::as_str),
            Some("false -> true")
        );

        let status = table
            .columns_modified
            .iter()
            .find(|c| c.column_name == "status")
            .unwrap();
        assert_eq!(
            status.changes.get("default").map(String::as_str),
            Some("none -> active")
        );
    }

    #[test]
    fn test_enum_added_removed_and_modified() {
        let generated = users_generated()
            .enum_type(Enum::new("user_status", &["active", "banned"]))
            .enum_type(Enum::new("mood", &["happy"]));
        let database = users_database()
            .enum_type(DbEnum::new("user_status", &["active", "deleted"]))
            .enum_type(DbEnum::new("legacy_kind", &["a"]));

        let diff = compare_schemas(&generated, &database);
        assert_eq!(diff.enums_added, vec!["mood"]);
        assert_eq!(diff.enums_removed, vec!["legacy_kind"]);
        assert_eq!(
            diff.enums_modified,
            vec![EnumDiff {
                enum_name: "user_status".into(),
                values_added: vec!["banned".into()],
                values_removed: vec!["deleted".into()],
            }]
        );
    }

    #[test]
    fn test_mysql_skips_enum_pass_and_compares_inline_values() {
        let generated = GeneratedSchema::new()
            .table(Table::new("User", "users"))
            .enum_type(Enum::new("user_status", &["active", "banned"]))
            .field(Field::new("User", "status", "user_status"));
        let database = DatabaseSchema::new("mysql").table(
            DbTable::new("users").column(DbColumn::new("status", "enum('active','banned')")),
        );
        let diff = compare_schemas(&generated, &database);
        assert!(!diff.has_changes(), "unexpected diff: {diff:?}");

        let database = DatabaseSchema::new("mysql").table(
            DbTable::new("users").column(DbColumn::new("status", "enum('active')")),
        );
        let diff = compare_schemas(&generated, &database);
        let change = &diff.tables_modified[0].columns_modified[0];
        assert_eq!(
            change.changes.get("type").map(String::as_str),
            Some("enum('active') -> ENUM('active', 'banned')")
        );
        assert!(diff.enums_added.is_empty());
    }

    #[test]
    fn test_indexes_ignore_primary_and_unique_backing() {
        let generated = users_generated()
            .index(Index::new("User", "idx_users_created", &["created_at"]));
        let database = users_database()
            .index(DbIndex::new("users_pkey", "users", &["id"]).unique().primary())
            .index(DbIndex::new("users_email_key", "users", &["email"]).unique())
            .index(DbIndex::new("idx_users_old", "users", &["name"]));

        let diff = compare_schemas(&generated, &database);
        assert_eq!(diff.indexes_added, vec!["idx_users_created"]);
        assert_eq!(diff.indexes_removed, vec!["idx_users_old"]);
    }
}
