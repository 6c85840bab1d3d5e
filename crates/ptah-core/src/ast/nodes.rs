//! DDL node types.
//!
//! Nodes are plain data holders. The fluent setters consume and return the
//! node so trees can be assembled in a single expression; nothing is
//! validated here, validation happens when a renderer walks the tree.

use std::fmt;
use std::str::FromStr;

use crate::error::PtahError;

// =============================================================================
// Columns
// =============================================================================

/// Default value of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// A literal value, quoted by the renderer when the column type needs it.
    Literal(String),
    /// A raw SQL expression such as `CURRENT_TIMESTAMP` or `now()`.
    Expression(String),
}

/// A foreign key reference to a column in another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyRef {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
    /// ON DELETE action, e.g. `CASCADE`.
    pub on_delete: Option<String>,
    /// ON UPDATE action.
    pub on_update: Option<String>,
    /// Constraint name.
    pub name: String,
}

impl ForeignKeyRef {
    /// Creates a new reference without referential actions.
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            on_delete: None,
            on_update: None,
            name: name.into(),
        }
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: impl Into<String>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: impl Into<String>) -> Self {
        self.on_update = Some(action.into());
        self
    }
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNode {
    /// Column name.
    pub name: String,
    /// SQL type as written in the schema, e.g. `VARCHAR(255)`.
    pub column_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is the primary key.
    pub primary: bool,
    /// Whether the column is UNIQUE.
    pub unique: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// CHECK expression.
    pub check: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
    /// Column-level foreign key.
    pub foreign_key: Option<ForeignKeyRef>,
}

impl ColumnNode {
    /// Creates a nullable column with no constraints.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            nullable: true,
            primary: false,
            unique: false,
            auto_increment: false,
            default: None,
            check: None,
            comment: None,
            foreign_key: None,
        }
    }

    /// Marks the column as PRIMARY KEY.
    #[must_use]
    pub fn set_primary(mut self) -> Self {
        self.primary = true;
        self.nullable = false; // Primary keys are implicitly NOT NULL
        self
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn set_not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as nullable.
    #[must_use]
    pub fn set_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn set_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn set_auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets a literal default value.
    #[must_use]
    pub fn set_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Sets a default SQL expression.
    #[must_use]
    pub fn set_default_expression(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(DefaultValue::Expression(expr.into()));
        self
    }

    /// Sets a CHECK expression.
    #[must_use]
    pub fn set_check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(expr.into());
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets a column-level foreign key.
    #[must_use]
    pub fn set_foreign_key(mut self, reference: ForeignKeyRef) -> Self {
        self.foreign_key = Some(reference);
        self
    }

    /// Returns `true` if the column must be rendered as NOT NULL.
    ///
    /// Primary keys are NOT NULL whatever the stored `nullable` flag says.
    #[must_use]
    pub fn is_not_null(&self) -> bool {
        self.primary || !self.nullable
    }
}

// =============================================================================
// Constraints
// =============================================================================

/// Textual discriminant of a table constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    /// PRIMARY KEY.
    PrimaryKey,
    /// UNIQUE.
    Unique,
    /// FOREIGN KEY.
    ForeignKey,
    /// CHECK.
    Check,
}

impl ConstraintType {
    /// Returns the SQL keyword for this constraint type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::Unique => "UNIQUE",
            Self::ForeignKey => "FOREIGN KEY",
            Self::Check => "CHECK",
        }
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConstraintType {
    type Err = PtahError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            "PRIMARY KEY" => Ok(Self::PrimaryKey),
            "UNIQUE" => Ok(Self::Unique),
            "FOREIGN KEY" => Ok(Self::ForeignKey),
            "CHECK" => Ok(Self::Check),
            _ => Err(PtahError::UnknownConstraintType(s.to_string())),
        }
    }
}

/// Kind-specific payload of a table constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    /// PRIMARY KEY (columns).
    PrimaryKey {
        /// Key columns.
        columns: Vec<String>,
    },
    /// UNIQUE (columns).
    Unique {
        /// Unique columns.
        columns: Vec<String>,
    },
    /// FOREIGN KEY (columns) REFERENCES ...
    ForeignKey {
        /// Local columns.
        columns: Vec<String>,
        /// Referenced table and column. Rendering fails when absent.
        reference: Option<ForeignKeyRef>,
    },
    /// CHECK (expression).
    Check {
        /// Boolean SQL expression.
        expression: String,
    },
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintNode {
    /// Optional constraint name.
    pub name: Option<String>,
    /// Constraint payload.
    pub kind: ConstraintKind,
}

impl ConstraintNode {
    /// Creates an unnamed primary key constraint.
    #[must_use]
    pub fn primary_key(columns: &[&str]) -> Self {
        Self {
            name: None,
            kind: ConstraintKind::PrimaryKey {
                columns: to_strings(columns),
            },
        }
    }

    /// Creates a unique constraint.
    #[must_use]
    pub fn unique(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: non_empty(name.into()),
            kind: ConstraintKind::Unique {
                columns: to_strings(columns),
            },
        }
    }

    /// Creates a foreign key constraint.
    #[must_use]
    pub fn foreign_key(
        name: impl Into<String>,
        columns: &[&str],
        reference: Option<ForeignKeyRef>,
    ) -> Self {
        Self {
            name: non_empty(name.into()),
            kind: ConstraintKind::ForeignKey {
                columns: to_strings(columns),
                reference,
            },
        }
    }

    /// Creates a check constraint.
    #[must_use]
    pub fn check(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: non_empty(name.into()),
            kind: ConstraintKind::Check {
                expression: expression.into(),
            },
        }
    }

    /// Returns the constraint type.
    #[must_use]
    pub const fn constraint_type(&self) -> ConstraintType {
        match self.kind {
            ConstraintKind::PrimaryKey { .. } => ConstraintType::PrimaryKey,
            ConstraintKind::Unique { .. } => ConstraintType::Unique,
            ConstraintKind::ForeignKey { .. } => ConstraintType::ForeignKey,
            ConstraintKind::Check { .. } => ConstraintType::Check,
        }
    }
}

// =============================================================================
// Tables
// =============================================================================

/// CREATE TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableNode {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnNode>,
    /// Table-level constraints.
    pub constraints: Vec<ConstraintNode>,
    /// Dialect-specific options (e.g. `ENGINE` → `InnoDB`), in insertion order.
    pub options: Vec<(String, String)>,
    /// Table comment.
    pub comment: Option<String>,
}

impl CreateTableNode {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            options: Vec::new(),
            comment: None,
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn add_column(mut self, column: ColumnNode) -> Self {
        self.columns.push(column);
        self
    }

    /// Appends a table-level constraint.
    #[must_use]
    pub fn add_constraint(mut self, constraint: ConstraintNode) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Sets a table option, replacing an existing value for the same key.
    #[must_use]
    pub fn set_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.options.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(entry) => entry.1 = value,
            None => self.options.push((key, value)),
        }
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnNode> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A single ALTER TABLE operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterOperation {
    /// ADD COLUMN.
    AddColumn(ColumnNode),
    /// DROP COLUMN by name.
    DropColumn(String),
    /// Change an existing column to the given definition.
    ModifyColumn(ColumnNode),
    /// Change only the listed parts of an existing column.
    ///
    /// Dialects that can only restate the whole column render it like
    /// [`AlterOperation::ModifyColumn`].
    AlterColumn(ColumnNode, ColumnChanges),
}

impl AlterOperation {
    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> AlterOperationKind {
        match self {
            Self::AddColumn(_) => AlterOperationKind::AddColumn,
            Self::DropColumn(_) => AlterOperationKind::DropColumn,
            Self::ModifyColumn(_) | Self::AlterColumn(..) => AlterOperationKind::ModifyColumn,
        }
    }
}

/// Parts of a column touched by [`AlterOperation::AlterColumn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnChanges {
    /// The column type changes.
    pub column_type: bool,
    /// Nullability changes.
    pub nullable: bool,
    /// The default value changes.
    pub default: bool,
}

impl ColumnChanges {
    /// Every part changes.
    pub const ALL: Self = Self {
        column_type: true,
        nullable: true,
        default: true,
    };

    /// Nothing changes.
    pub const NONE: Self = Self {
        column_type: false,
        nullable: false,
        default: false,
    };

    /// Builds the set from differ change kinds (`type`, `nullable`,
    /// `default`). Other kinds are ignored.
    #[must_use]
    pub fn from_kinds<'a>(kinds: impl IntoIterator<Item = &'a str>) -> Self {
        kinds
            .into_iter()
            .fold(Self::NONE, |mut changes, kind| {
                match kind {
                    "type" => changes.column_type = true,
                    "nullable" => changes.nullable = true,
                    "default" => changes.default = true,
                    _ => {}
                }
                changes
            })
    }

    /// Returns `true` if no part changes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.column_type || self.nullable || self.default)
    }
}

/// Textual discriminant of an ALTER TABLE operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlterOperationKind {
    /// ADD COLUMN.
    AddColumn,
    /// DROP COLUMN.
    DropColumn,
    /// MODIFY COLUMN.
    ModifyColumn,
}

impl AlterOperationKind {
    /// Returns the SQL phrase for this operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AddColumn => "ADD COLUMN",
            Self::DropColumn => "DROP COLUMN",
            Self::ModifyColumn => "MODIFY COLUMN",
        }
    }
}

impl fmt::Display for AlterOperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlterOperationKind {
    type Err = PtahError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('_', " ").as_str() {
            "ADD COLUMN" | "ADD" => Ok(Self::AddColumn),
            "DROP COLUMN" | "DROP" => Ok(Self::DropColumn),
            "MODIFY COLUMN" | "MODIFY" | "ALTER COLUMN" => Ok(Self::ModifyColumn),
            _ => Err(PtahError::UnknownAlterOperation(s.to_string())),
        }
    }
}

/// ALTER TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTableNode {
    /// Table name.
    pub name: String,
    /// Operations, rendered in order.
    pub operations: Vec<AlterOperation>,
}

impl AlterTableNode {
    /// Creates an ALTER TABLE with no operations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Appends an operation.
    #[must_use]
    pub fn add_operation(mut self, operation: AlterOperation) -> Self {
        self.operations.push(operation);
        self
    }
}

/// DROP TABLE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableNode {
    /// Table name.
    pub name: String,
    /// Adds IF EXISTS.
    pub if_exists: bool,
    /// Adds CASCADE.
    pub cascade: bool,
    /// Comment emitted before the statement.
    pub comment: Option<String>,
}

impl DropTableNode {
    /// Creates a plain DROP TABLE.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_exists: false,
            cascade: false,
            comment: None,
        }
    }

    /// Adds IF EXISTS.
    #[must_use]
    pub fn set_if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Adds CASCADE.
    #[must_use]
    pub fn set_cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Sets the leading comment.
    #[must_use]
    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

// =============================================================================
// Indexes
// =============================================================================

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNode {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// UNIQUE index.
    pub unique: bool,
    /// Index method, e.g. `GIN` or `BTREE`.
    pub index_type: Option<String>,
    /// Index comment.
    pub comment: Option<String>,
}

impl IndexNode {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: to_strings(columns),
            unique: false,
            index_type: None,
            comment: None,
        }
    }

    /// Marks the index as UNIQUE.
    #[must_use]
    pub fn set_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the index method.
    #[must_use]
    pub fn set_type(mut self, index_type: impl Into<String>) -> Self {
        self.index_type = Some(index_type.into());
        self
    }

    /// Sets the index comment.
    #[must_use]
    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// DROP INDEX statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndexNode {
    /// Index name.
    pub name: String,
    /// Owning table; required by MySQL-family dialects.
    pub table: Option<String>,
    /// Adds IF EXISTS where supported.
    pub if_exists: bool,
}

impl DropIndexNode {
    /// Creates a DROP INDEX.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            if_exists: false,
        }
    }

    /// Sets the owning table.
    #[must_use]
    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Adds IF EXISTS.
    #[must_use]
    pub fn set_if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

// =============================================================================
// Types
// =============================================================================

/// An enum type with ordered values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumNode {
    /// Type name.
    pub name: String,
    /// Values in declaration order.
    pub values: Vec<String>,
}

impl EnumNode {
    /// Creates an enum node.
    #[must_use]
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: to_strings(values),
        }
    }
}

/// A field of a composite type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeField {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: String,
}

/// Definition carried by a CREATE TYPE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDefinition {
    /// `AS ENUM (...)`.
    Enum(Vec<String>),
    /// `AS (field type, ...)`.
    Composite(Vec<CompositeField>),
    /// A domain over a base type.
    Domain {
        /// Underlying type.
        base_type: String,
        /// Whether NULL is allowed.
        nullable: bool,
        /// Default expression.
        default: Option<String>,
        /// CHECK expression.
        check: Option<String>,
    },
}

/// CREATE TYPE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTypeNode {
    /// Type name.
    pub name: String,
    /// Type definition.
    pub definition: TypeDefinition,
    /// Comment emitted before the statement.
    pub comment: Option<String>,
}

impl CreateTypeNode {
    /// Creates a CREATE TYPE statement.
    #[must_use]
    pub fn new(name: impl Into<String>, definition: TypeDefinition) -> Self {
        Self {
            name: name.into(),
            definition,
            comment: None,
        }
    }

    /// Sets the leading comment.
    #[must_use]
    pub fn set_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A single ALTER TYPE operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterTypeOperation {
    /// ADD VALUE, optionally positioned.
    AddValue {
        /// New value.
        value: String,
        /// Insert before this value.
        before: Option<String>,
        /// Insert after this value.
        after: Option<String>,
    },
    /// RENAME VALUE old TO new.
    RenameValue {
        /// Current value.
        old: String,
        /// Replacement value.
        new: String,
    },
    /// RENAME TO new name.
    RenameTo(String),
}

/// ALTER TYPE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterTypeNode {
    /// Type name.
    pub name: String,
    /// Operations, rendered in order.
    pub operations: Vec<AlterTypeOperation>,
}

impl AlterTypeNode {
    /// Creates an ALTER TYPE with no operations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Appends an ADD VALUE operation.
    #[must_use]
    pub fn add_value(mut self, value: impl Into<String>) -> Self {
        self.operations.push(AlterTypeOperation::AddValue {
            value: value.into(),
            before: None,
            after: None,
        });
        self
    }

    /// Appends an arbitrary operation.
    #[must_use]
    pub fn add_operation(mut self, operation: AlterTypeOperation) -> Self {
        self.operations.push(operation);
        self
    }
}

/// DROP TYPE statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTypeNode {
    /// Type name.
    pub name: String,
    /// Adds IF EXISTS.
    pub if_exists: bool,
    /// Adds CASCADE.
    pub cascade: bool,
    /// Comment emitted before the statement.
    pub comment: Option<String>,
}

impl DropTypeNode {
    /// Creates a plain DROP TYPE.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            if_exists: false,
            cascade: false,
            comment: None,
        }
    }

    /// Adds IF EXISTS.
    #[must_use]
    pub fn set_if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Adds CASCADE.
    #[must_use]
    pub fn set_cascade(mut self) -> Self {
        self.cascade = true;
        self
    }
}

/// A free-text SQL comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    /// Comment text; every line is prefixed with `-- `.
    pub text: String,
}

impl CommentNode {
    /// Creates a comment node.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|&s| s.to_string()).collect()
}

fn non_empty(name: String) -> Option<String> {
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_primary_forces_not_null() {
        let col = ColumnNode::new("id", "INTEGER").set_nullable().set_primary();
        assert!(col.primary);
        assert!(!col.nullable);
        assert!(col.is_not_null());
    }

    #[test]
    fn test_primary_is_not_null_even_if_flag_says_otherwise() {
        let mut col = ColumnNode::new("id", "INTEGER").set_primary();
        col.nullable = true;
        assert!(col.is_not_null());
    }

    #[test]
    fn test_column_defaults() {
        let col = ColumnNode::new("status", "VARCHAR(20)").set_default("active");
        assert_eq!(col.default, Some(DefaultValue::Literal("active".into())));

        let col = ColumnNode::new("created_at", "TIMESTAMP").set_default_expression("NOW()");
        assert_eq!(col.default, Some(DefaultValue::Expression("NOW()".into())));
    }

    #[test]
    fn test_constraint_type_from_str() {
        assert_eq!(
            "primary key".parse::<ConstraintType>().unwrap(),
            ConstraintType::PrimaryKey
        );
        assert_eq!(
            "FOREIGN_KEY".parse::<ConstraintType>().unwrap(),
            ConstraintType::ForeignKey
        );
        let err = "EXCLUDE".parse::<ConstraintType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown constraint type: EXCLUDE");
    }

    #[test]
    fn test_alter_operation_kind_from_str() {
        assert_eq!(
            "modify_column".parse::<AlterOperationKind>().unwrap(),
            AlterOperationKind::ModifyColumn
        );
        assert_eq!(
            AlterOperation::DropColumn("x".into()).kind(),
            AlterOperationKind::DropColumn
        );
        let err = "RENAME".parse::<AlterOperationKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown alter operation: RENAME");
    }

    #[test]
    fn test_column_changes_from_kinds() {
        let changes = ColumnChanges::from_kinds(["nullable", "primary_key"]);
        assert!(changes.nullable);
        assert!(!changes.column_type && !changes.default);
        assert!(ColumnChanges::from_kinds(["unique"]).is_empty());
        assert_eq!(
            AlterOperation::AlterColumn(ColumnNode::new("id", "INTEGER"), changes).kind(),
            AlterOperationKind::ModifyColumn
        );
    }

    #[test]
    fn test_unnamed_constraints() {
        let c = ConstraintNode::unique("", &["a", "b"]);
        assert_eq!(c.name, None);
        assert_eq!(c.constraint_type(), ConstraintType::Unique);
    }

    #[test]
    fn test_set_option_replaces_case_insensitively() {
        let table = CreateTableNode::new("t")
            .set_option("ENGINE", "MyISAM")
            .set_option("engine", "InnoDB");
        assert_eq!(table.options, vec![("ENGINE".to_string(), "InnoDB".to_string())]);
    }
}
