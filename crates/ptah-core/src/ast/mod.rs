//! Syntax tree for DDL statements.
//!
//! The node set is closed: [`Node`] enumerates every statement a renderer
//! must understand, and [`Visitor`] has one method per node type. Adding a
//! renderer means implementing [`Visitor`]; adding a node means touching
//! every renderer, which the compiler enforces.
//!
//! # Example
//!
//! ```rust
//! use ptah_core::ast::{ColumnNode, CreateTableNode, Node};
//! use ptah_core::renderer::{PostgresRenderer, RenderVisitor};
//!
//! let table = CreateTableNode::new("users")
//!     .add_column(ColumnNode::new("id", "SERIAL").set_primary())
//!     .add_column(ColumnNode::new("email", "VARCHAR(255)").set_not_null().set_unique());
//!
//! let mut renderer = PostgresRenderer::new();
//! let sql = renderer.render(&Node::CreateTable(table)).unwrap();
//! assert!(sql.contains("id SERIAL PRIMARY KEY NOT NULL"));
//! ```

pub mod builder;
pub mod from_schema;
mod nodes;

pub use nodes::{
    AlterOperation, AlterOperationKind, AlterTableNode, AlterTypeNode, AlterTypeOperation,
    ColumnChanges, ColumnNode, CommentNode, CompositeField, ConstraintKind, ConstraintNode, ConstraintType,
    CreateTableNode, CreateTypeNode, DefaultValue, DropIndexNode, DropTableNode, DropTypeNode,
    EnumNode, ForeignKeyRef, IndexNode, TypeDefinition,
};

use crate::error::Result;

/// Receives one call per visited node.
///
/// Renderers implement this trait and accumulate output as they go.
pub trait Visitor {
    /// Visits a CREATE TABLE statement.
    fn visit_create_table(&mut self, node: &CreateTableNode) -> Result<()>;
    /// Visits an ALTER TABLE statement.
    fn visit_alter_table(&mut self, node: &AlterTableNode) -> Result<()>;
    /// Visits a standalone column definition.
    fn visit_column(&mut self, node: &ColumnNode) -> Result<()>;
    /// Visits a standalone table constraint.
    fn visit_constraint(&mut self, node: &ConstraintNode) -> Result<()>;
    /// Visits a CREATE INDEX statement.
    fn visit_index(&mut self, node: &IndexNode) -> Result<()>;
    /// Visits a DROP INDEX statement.
    fn visit_drop_index(&mut self, node: &DropIndexNode) -> Result<()>;
    /// Visits an enum type definition.
    fn visit_enum(&mut self, node: &EnumNode) -> Result<()>;
    /// Visits a comment.
    fn visit_comment(&mut self, node: &CommentNode) -> Result<()>;
    /// Visits a DROP TABLE statement.
    fn visit_drop_table(&mut self, node: &DropTableNode) -> Result<()>;
    /// Visits a DROP TYPE statement.
    fn visit_drop_type(&mut self, node: &DropTypeNode) -> Result<()>;
    /// Visits a CREATE TYPE statement.
    fn visit_create_type(&mut self, node: &CreateTypeNode) -> Result<()>;
    /// Visits an ALTER TYPE statement.
    fn visit_alter_type(&mut self, node: &AlterTypeNode) -> Result<()>;
}

/// Dispatches a node to the matching [`Visitor`] method.
pub trait Accept {
    /// Calls the visitor method for this node.
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()>;
}

macro_rules! impl_accept {
    ($($node:ty => $method:ident),* $(,)?) => {
        $(
            impl Accept for $node {
                fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
                    visitor.$method(self)
                }
            }
        )*
    };
}

impl_accept! {
    CreateTableNode => visit_create_table,
    AlterTableNode => visit_alter_table,
    ColumnNode => visit_column,
    ConstraintNode => visit_constraint,
    IndexNode => visit_index,
    DropIndexNode => visit_drop_index,
    EnumNode => visit_enum,
    CommentNode => visit_comment,
    DropTableNode => visit_drop_table,
    DropTypeNode => visit_drop_type,
    CreateTypeNode => visit_create_type,
    AlterTypeNode => visit_alter_type,
}

/// Any DDL node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// CREATE TABLE.
    CreateTable(CreateTableNode),
    /// ALTER TABLE.
    AlterTable(AlterTableNode),
    /// Column definition.
    Column(ColumnNode),
    /// Table constraint.
    Constraint(ConstraintNode),
    /// CREATE INDEX.
    Index(IndexNode),
    /// DROP INDEX.
    DropIndex(DropIndexNode),
    /// Enum type.
    Enum(EnumNode),
    /// Comment.
    Comment(CommentNode),
    /// DROP TABLE.
    DropTable(DropTableNode),
    /// DROP TYPE.
    DropType(DropTypeNode),
    /// CREATE TYPE.
    CreateType(CreateTypeNode),
    /// ALTER TYPE.
    AlterType(AlterTypeNode),
    /// Ordered statements.
    StatementList(StatementList),
}

impl Node {
    /// Returns a short name of the node kind, used in error context.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "create table",
            Self::AlterTable(_) => "alter table",
            Self::Column(_) => "column",
            Self::Constraint(_) => "constraint",
            Self::Index(_) => "index",
            Self::DropIndex(_) => "drop index",
            Self::Enum(_) => "enum",
            Self::Comment(_) => "comment",
            Self::DropTable(_) => "drop table",
            Self::DropType(_) => "drop type",
            Self::CreateType(_) => "create type",
            Self::AlterType(_) => "alter type",
            Self::StatementList(_) => "statement list",
        }
    }

    /// Returns `true` for nodes that define an enum type.
    #[must_use]
    pub const fn defines_enum(&self) -> bool {
        matches!(
            self,
            Self::Enum(_)
                | Self::CreateType(CreateTypeNode {
                    definition: TypeDefinition::Enum(_),
                    ..
                })
        )
    }
}

impl Accept for Node {
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        match self {
            Self::CreateTable(n) => n.accept(visitor),
            Self::AlterTable(n) => n.accept(visitor),
            Self::Column(n) => n.accept(visitor),
            Self::Constraint(n) => n.accept(visitor),
            Self::Index(n) => n.accept(visitor),
            Self::DropIndex(n) => n.accept(visitor),
            Self::Enum(n) => n.accept(visitor),
            Self::Comment(n) => n.accept(visitor),
            Self::DropTable(n) => n.accept(visitor),
            Self::DropType(n) => n.accept(visitor),
            Self::CreateType(n) => n.accept(visitor),
            Self::AlterType(n) => n.accept(visitor),
            Self::StatementList(n) => n.accept(visitor),
        }
    }
}

macro_rules! impl_from_node {
    ($($node:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$node> for Node {
                fn from(node: $node) -> Self {
                    Self::$variant(node)
                }
            }
        )*
    };
}

impl_from_node! {
    CreateTableNode => CreateTable,
    AlterTableNode => AlterTable,
    ColumnNode => Column,
    ConstraintNode => Constraint,
    IndexNode => Index,
    DropIndexNode => DropIndex,
    EnumNode => Enum,
    CommentNode => Comment,
    DropTableNode => DropTable,
    DropTypeNode => DropType,
    CreateTypeNode => CreateType,
    AlterTypeNode => AlterType,
    StatementList => StatementList,
}

/// An ordered sequence of statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementList {
    /// Statements in render order.
    pub statements: Vec<Node>,
}

impl StatementList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.statements.push(node.into());
    }

    /// Appends a statement, builder style.
    #[must_use]
    pub fn with(mut self, node: impl Into<Node>) -> Self {
        self.push(node);
        self
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns `true` if the list holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates over the statements.
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.statements.iter()
    }
}

impl Accept for StatementList {
    /// Visits each statement in order, stopping at the first failure.
    fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        for (index, statement) in self.statements.iter().enumerate() {
            statement
                .accept(visitor)
                .map_err(|e| e.in_statement(index, statement.kind()))?;
        }
        Ok(())
    }
}
