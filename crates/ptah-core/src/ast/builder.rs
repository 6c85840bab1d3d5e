//! Fluent construction of DDL trees.
//!
//! Child builders own their parent and hand the finished node back to it
//! with `end()`, so a whole schema reads as one expression:
//!
//! ```rust
//! use ptah_core::ast::builder::SchemaBuilder;
//!
//! let statements = SchemaBuilder::new()
//!     .enum_type("post_status", &["draft", "published"])
//!     .table("posts")
//!         .column("id", "SERIAL").primary().end()
//!         .column("status", "post_status").not_null().default_value("draft").end()
//!         .column("author_id", "INTEGER")
//!             .foreign_key("fk_posts_author")
//!                 .references("users", "id")
//!                 .on_delete("CASCADE")
//!                 .end()
//!             .end()
//!         .end()
//!     .index("idx_posts_status", "posts").column("status").end()
//!     .build();
//!
//! assert_eq!(statements.len(), 3);
//! ```
//!
//! Builders created with `new` are detached and finish with `build()`
//! instead.

use super::{
    ColumnNode, CommentNode, ConstraintKind, ConstraintNode, CreateTableNode, EnumNode,
    ForeignKeyRef, IndexNode, StatementList,
};

/// Parent of a detached builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

/// A builder context that accepts a finished child node.
pub trait Parent<T> {
    /// Takes ownership of `child` and returns the context.
    #[must_use]
    fn attach(self, child: T) -> Self;
}

// =============================================================================
// TableBuilder
// =============================================================================

/// Builds a [`CreateTableNode`].
#[derive(Debug, Clone)]
pub struct TableBuilder<P = Detached> {
    parent: P,
    node: CreateTableNode,
}

impl TableBuilder<Detached> {
    /// Starts a standalone table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parent: Detached,
            node: CreateTableNode::new(name),
        }
    }

    /// Returns the finished table.
    #[must_use]
    pub fn build(self) -> CreateTableNode {
        self.node
    }
}

impl<P> TableBuilder<P> {
    /// Opens a column.
    #[must_use]
    pub fn column(
        self,
        name: impl Into<String>,
        column_type: impl Into<String>,
    ) -> ColumnBuilder<Self> {
        ColumnBuilder::with_parent(self, ColumnNode::new(name, column_type))
    }

    /// Adds a table-level primary key.
    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.node = self.node.add_constraint(ConstraintNode::primary_key(columns));
        self
    }

    /// Adds a unique constraint. An empty name leaves it unnamed.
    #[must_use]
    pub fn unique(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.node = self.node.add_constraint(ConstraintNode::unique(name, columns));
        self
    }

    /// Adds a check constraint.
    #[must_use]
    pub fn check(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.node = self.node.add_constraint(ConstraintNode::check(name, expression));
        self
    }

    /// Opens a table-level foreign key over `columns`.
    #[must_use]
    pub fn foreign_key(self, name: impl Into<String>, columns: &[&str]) -> ForeignKeyBuilder<Self> {
        ForeignKeyBuilder::with_parent(self, name.into(), columns)
    }

    /// Sets a table option such as `ENGINE`.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node = self.node.set_option(key, value);
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.node = self.node.set_comment(comment);
        self
    }
}

impl<P: Parent<CreateTableNode>> TableBuilder<P> {
    /// Closes the table and returns to the parent.
    #[must_use]
    pub fn end(self) -> P {
        self.parent.attach(self.node)
    }
}

impl<P> Parent<ColumnNode> for TableBuilder<P> {
    fn attach(mut self, child: ColumnNode) -> Self {
        self.node = self.node.add_column(child);
        self
    }
}

impl<P> Parent<ConstraintNode> for TableBuilder<P> {
    fn attach(mut self, child: ConstraintNode) -> Self {
        self.node = self.node.add_constraint(child);
        self
    }
}

// =============================================================================
// ColumnBuilder
// =============================================================================

/// Builds a [`ColumnNode`].
#[derive(Debug, Clone)]
pub struct ColumnBuilder<P = Detached> {
    parent: P,
    node: ColumnNode,
    // Foreign keys that could not be folded into the column.
    pending: Vec<ConstraintNode>,
}

impl ColumnBuilder<Detached> {
    /// Starts a standalone column.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self::with_parent(Detached, ColumnNode::new(name, column_type))
    }

    /// Returns the finished column.
    #[must_use]
    pub fn build(self) -> ColumnNode {
        self.node
    }
}

impl<P> ColumnBuilder<P> {
    const fn with_parent(parent: P, node: ColumnNode) -> Self {
        Self {
            parent,
            node,
            pending: Vec::new(),
        }
    }

    /// Marks the column as primary key, which also makes it NOT NULL.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.node = self.node.set_primary();
        self
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.node = self.node.set_not_null();
        self
    }

    /// Marks the column nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.node = self.node.set_nullable();
        self
    }

    /// Marks the column UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.node = self.node.set_unique();
        self
    }

    /// Marks the column auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.node = self.node.set_auto_increment();
        self
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.node = self.node.set_default(value);
        self
    }

    /// Sets a raw SQL default expression.
    #[must_use]
    pub fn default_expression(mut self, expr: impl Into<String>) -> Self {
        self.node = self.node.set_default_expression(expr);
        self
    }

    /// Sets a CHECK expression.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.node = self.node.set_check(expr);
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.node = self.node.set_comment(comment);
        self
    }

    /// Opens a foreign key on this column.
    #[must_use]
    pub fn foreign_key(self, name: impl Into<String>) -> ForeignKeyBuilder<Self> {
        let column = self.node.name.clone();
        ForeignKeyBuilder::with_parent(self, name.into(), &[column.as_str()])
    }
}

impl<P> ColumnBuilder<P>
where
    P: Parent<ColumnNode> + Parent<ConstraintNode>,
{
    /// Closes the column and returns to the table.
    #[must_use]
    pub fn end(self) -> P {
        let mut parent = self.parent.attach(self.node);
        for constraint in self.pending {
            parent = parent.attach(constraint);
        }
        parent
    }
}

impl<P> Parent<ConstraintNode> for ColumnBuilder<P> {
    fn attach(mut self, child: ConstraintNode) -> Self {
        match child.kind {
            ConstraintKind::ForeignKey {
                reference: Some(reference),
                ..
            } => self.node = self.node.set_foreign_key(reference),
            // A reference-less key is kept so rendering reports it.
            _ => self.pending.push(child),
        }
        self
    }
}

// =============================================================================
// ForeignKeyBuilder
// =============================================================================

/// Builds a foreign key constraint.
#[derive(Debug, Clone)]
pub struct ForeignKeyBuilder<P = Detached> {
    parent: P,
    name: String,
    columns: Vec<String>,
    target: Option<(String, String)>,
    on_delete: Option<String>,
    on_update: Option<String>,
}

impl ForeignKeyBuilder<Detached> {
    /// Starts a standalone foreign key over `columns`.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::with_parent(Detached, name.into(), columns)
    }

    /// Returns the finished constraint.
    #[must_use]
    pub fn build(self) -> ConstraintNode {
        self.finish().1
    }
}

impl<P> ForeignKeyBuilder<P> {
    fn with_parent(parent: P, name: String, columns: &[&str]) -> Self {
        Self {
            parent,
            name,
            columns: columns.iter().map(|&c| c.to_string()).collect(),
            target: None,
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the referenced table and column.
    #[must_use]
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.target = Some((table.into(), column.into()));
        self
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

    fn finish(self) -> (P, ConstraintNode) {
        let reference = self.target.map(|(table, column)| ForeignKeyRef {
            table,
            column,
            on_delete: self.on_delete,
            on_update: self.on_update,
            name: self.name.clone(),
        });
        let columns: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let constraint = ConstraintNode::foreign_key(self.name.as_str(), &columns, reference);
        (self.parent, constraint)
    }
}

impl<P: Parent<ConstraintNode>> ForeignKeyBuilder<P> {
    /// Closes the foreign key and returns to the column or table.
    #[must_use]
    pub fn end(self) -> P {
        let (parent, constraint) = self.finish();
        parent.attach(constraint)
    }
}

// =============================================================================
// IndexBuilder
// =============================================================================

/// Builds an [`IndexNode`].
#[derive(Debug, Clone)]
pub struct IndexBuilder<P = Detached> {
    parent: P,
    node: IndexNode,
}

impl IndexBuilder<Detached> {
    /// Starts a standalone index on `table`.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            parent: Detached,
            node: IndexNode::new(name, table, &[]),
        }
    }

    /// Returns the finished index.
    #[must_use]
    pub fn build(self) -> IndexNode {
        self.node
    }
}

impl<P> IndexBuilder<P> {
    /// Appends an indexed column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.node.columns.push(name.into());
        self
    }

    /// Appends several indexed columns.
    #[must_use]
    pub fn columns(mut self, names: &[&str]) -> Self {
        self.node.columns.extend(names.iter().map(|&n| n.to_string()));
        self
    }

    /// Makes the index UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.node = self.node.set_unique();
        self
    }

    /// Sets the index method, e.g. `BTREE` or `FULLTEXT`.
    #[must_use]
    pub fn using(mut self, index_type: impl Into<String>) -> Self {
        self.node = self.node.set_type(index_type);
        self
    }

    /// Sets the index comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.node = self.node.set_comment(comment);
        self
    }
}

impl<P: Parent<IndexNode>> IndexBuilder<P> {
    /// Closes the index and returns to the schema.
    #[must_use]
    pub fn end(self) -> P {
        self.parent.attach(self.node)
    }
}

// =============================================================================
// SchemaBuilder
// =============================================================================

/// Builds a [`StatementList`] of enums, tables and indexes.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    statements: StatementList,
}

impl SchemaBuilder {
    /// Starts an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an enum type.
    #[must_use]
    pub fn enum_type(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.statements.push(EnumNode::new(name, values));
        self
    }

    /// Adds a comment line.
    #[must_use]
    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.statements.push(CommentNode::new(text));
        self
    }

    /// Opens a table.
    #[must_use]
    pub fn table(self, name: impl Into<String>) -> TableBuilder<Self> {
        TableBuilder {
            parent: self,
            node: CreateTableNode::new(name),
        }
    }

    /// Opens an index on `table`.
    #[must_use]
    pub fn index(self, name: impl Into<String>, table: impl Into<String>) -> IndexBuilder<Self> {
        IndexBuilder {
            parent: self,
            node: IndexNode::new(name, table, &[]),
        }
    }

    /// Returns the statements in the order they were added.
    #[must_use]
    pub fn build(self) -> StatementList {
        self.statements
    }
}

impl Parent<CreateTableNode> for SchemaBuilder {
    fn attach(mut self, child: CreateTableNode) -> Self {
        self.statements.push(child);
        self
    }
}

impl Parent<IndexNode> for SchemaBuilder {
    fn attach(mut self, child: IndexNode) -> Self {
        self.statements.push(child);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DefaultValue, Node};
    use crate::error::PtahError;
    use crate::renderer::{MySqlRenderer, PostgresRenderer, RenderVisitor};

    #[test]
    fn test_table_builder() {
        let table = TableBuilder::new("users")
            .column("id", "SERIAL")
            .primary()
            .end()
            .column("email", "VARCHAR(255)")
            .not_null()
            .unique()
            .end()
            .column("created_at", "TIMESTAMP")
            .default_expression("NOW()")
            .end()
            .check("chk_email", "email <> ''")
            .comment("Registered users")
            .build();

        assert_eq!(table.name, "users");
        assert_eq!(table.columns.len(), 3);
        assert!(table.columns[0].primary && !table.columns[0].nullable);
        assert!(table.columns[1].unique);
        assert_eq!(
            table.columns[2].default,
            Some(DefaultValue::Expression("NOW()".into()))
        );
        assert_eq!(table.constraints.len(), 1);
        assert_eq!(table.comment.as_deref(), Some("Registered users"));
    }

    #[test]
    fn test_column_foreign_key_folds_into_column() {
        let table = TableBuilder::new("posts")
            .column("user_id", "INTEGER")
            .foreign_key("fk_posts_user")
            .references("users", "id")
            .on_delete("CASCADE")
            .end()
            .end()
            .build();

        let fk = table.columns[0].foreign_key.as_ref().unwrap();
        assert_eq!(fk.name, "fk_posts_user");
        assert_eq!(fk.table, "users");
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
        assert!(table.constraints.is_empty());
    }

    #[test]
    fn test_foreign_key_without_reference_fails_to_render() {
        let table = TableBuilder::new("posts")
            .column("user_id", "INTEGER")
            .foreign_key("fk_posts_user")
            .end()
            .end()
            .build();
        assert_eq!(table.constraints.len(), 1);

        let err = PostgresRenderer::new()
            .render(&Node::CreateTable(table))
            .unwrap_err();
        assert!(matches!(err, PtahError::MissingReference { .. }));
    }

    #[test]
    fn test_table_level_foreign_key() {
        let table = TableBuilder::new("memberships")
            .column("user_id", "INTEGER")
            .not_null()
            .end()
            .column("team_id", "INTEGER")
            .not_null()
            .end()
            .primary_key(&["user_id", "team_id"])
            .foreign_key("fk_memberships_team", &["team_id"])
            .references("teams", "id")
            .end()
            .build();

        let sql = MySqlRenderer::mysql()
            .render(&Node::CreateTable(table))
            .unwrap();
        assert!(sql.contains("PRIMARY KEY (user_id, team_id)"));
        assert!(sql.contains(
            "CONSTRAINT fk_memberships_team FOREIGN KEY (team_id) REFERENCES teams(id)"
        ));
    }

    #[test]
    fn test_rendered_output_keeps_every_column_and_constraint() {
        let table = TableBuilder::new("products")
            .column("id", "SERIAL")
            .primary()
            .end()
            .column("sku", "VARCHAR(32)")
            .not_null()
            .end()
            .column("price", "DECIMAL(10,2)")
            .check("price >= 0")
            .end()
            .unique("uq_products_sku", &["sku"])
            .check("chk_products_price", "price < 100000")
            .build();

        let sql = PostgresRenderer::new()
            .render(&Node::CreateTable(table))
            .unwrap();
        for needle in [
            "id",
            "sku",
            "price",
            "CONSTRAINT uq_products_sku UNIQUE (sku)",
            "CONSTRAINT chk_products_price CHECK (price < 100000)",
        ] {
            assert!(sql.contains(needle), "missing {needle} in {sql}");
        }
    }

    #[test]
    fn test_index_builder() {
        let index = IndexBuilder::new("idx_users_name", "users")
            .columns(&["last_name", "first_name"])
            .unique()
            .using("BTREE")
            .build();
        assert_eq!(index.columns, vec!["last_name", "first_name"]);
        assert!(index.unique);
        assert_eq!(index.index_type.as_deref(), Some("BTREE"));
    }

    #[test]
    fn test_schema_builder_preserves_order() {
        let statements = SchemaBuilder::new()
            .comment("initial schema")
            .table("users")
            .column("id", "SERIAL")
            .primary()
            .end()
            .end()
            .enum_type("user_role", &["admin", "member"])
            .index("idx_users_id", "users")
            .column("id")
            .end()
            .build();

        let kinds: Vec<_> = statements.iter().map(Node::kind).collect();
        assert_eq!(kinds, vec!["comment", "create table", "enum", "index"]);

        let sql = PostgresRenderer::new().render_schema(&statements).unwrap();
        let enum_pos = sql.find("CREATE TYPE user_role").unwrap();
        let table_pos = sql.find("CREATE TABLE users").unwrap();
        assert!(enum_pos < table_pos);
    }
}
