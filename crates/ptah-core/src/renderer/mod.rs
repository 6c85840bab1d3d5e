//! Dialect-specific SQL renderers.
//!
//! Every renderer is a [`Visitor`] that appends SQL to an internal buffer.
//! A renderer instance is not meant to be shared between concurrent callers;
//! create one per rendering job, or call [`RenderVisitor::reset`] between
//! unrelated renders on the same instance.

mod base;
mod generic;
mod mysql;
mod postgres;

pub use base::{
    BaseRenderer, default_needs_quoting, is_quoted, mysql_table_options, quote_literal,
    quoted_list, references_clause, render_literal_default,
};
pub use generic::GenericRenderer;
pub use mysql::MySqlRenderer;
pub use postgres::PostgresRenderer;

use std::fmt;

use crate::ast::{Accept, Node, StatementList, Visitor};
use crate::error::Result;

/// Target SQL dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// PostgreSQL.
    Postgres,
    /// MySQL.
    MySql,
    /// MariaDB.
    MariaDb,
    /// Any other name; rendered by the generic fallback.
    Other(String),
}

impl Dialect {
    /// Resolves a dialect name. Unknown names map to [`Dialect::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Self::Postgres,
            "mysql" => Self::MySql,
            "mariadb" => Self::MariaDb,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Canonical name of the dialect.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::Other(name) => name,
        }
    }

    /// Returns `true` for MySQL and MariaDB.
    #[must_use]
    pub const fn is_mysql_family(&self) -> bool {
        matches!(self, Self::MySql | Self::MariaDb)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A visitor that renders SQL for one dialect.
pub trait RenderVisitor: Visitor {
    /// Dialect name.
    fn dialect(&self) -> &str;

    /// Clears the output buffer and any per-render state.
    fn reset(&mut self);

    /// Output accumulated since the last reset.
    fn output(&self) -> &str;

    /// Resets, renders `node`, and returns the produced SQL.
    ///
    /// # Errors
    ///
    /// Fails when the tree is malformed, e.g. a foreign key constraint
    /// without a reference.
    fn render(&mut self, node: &Node) -> Result<String> {
        self.reset();
        node.accept(self)?;
        Ok(self.output().to_string())
    }

    /// Renders a whole schema: every enum definition first, then all other
    /// statements. Relative order inside each group is preserved.
    ///
    /// # Errors
    ///
    /// Stops at the first failing statement and reports its original index.
    fn render_schema(&mut self, schema: &StatementList) -> Result<String> {
        self.reset();
        let (enums, rest): (Vec<_>, Vec<_>) = schema
            .iter()
            .enumerate()
            .partition(|(_, node)| node.defines_enum());

        for (index, node) in enums.into_iter().chain(rest) {
            node.accept(self)
                .map_err(|e| e.in_statement(index, node.kind()))?;
        }
        Ok(self.output().to_string())
    }
}

/// Returns a renderer for the given dialect name.
///
/// `postgres`, `mysql` and `mariadb` get their dedicated renderers; any
/// other name gets the conservative [`GenericRenderer`].
#[must_use]
pub fn renderer_for(dialect: &str) -> Box<dyn RenderVisitor> {
    match Dialect::from_name(dialect) {
        Dialect::Postgres => Box::new(PostgresRenderer::new()),
        Dialect::MySql => Box::new(MySqlRenderer::mysql()),
        Dialect::MariaDb => Box::new(MySqlRenderer::mariadb()),
        Dialect::Other(name) => Box::new(GenericRenderer::new(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_name() {
        assert_eq!(Dialect::from_name("postgres"), Dialect::Postgres);
        assert_eq!(Dialect::from_name("PostgreSQL"), Dialect::Postgres);
        assert_eq!(Dialect::from_name("mysql"), Dialect::MySql);
        assert_eq!(Dialect::from_name("mariadb"), Dialect::MariaDb);
        assert_eq!(
            Dialect::from_name("sqlite"),
            Dialect::Other("sqlite".to_string())
        );
        assert!(Dialect::MariaDb.is_mysql_family());
        assert!(!Dialect::Postgres.is_mysql_family());
    }

    #[test]
    fn test_renderer_for() {
        assert_eq!(renderer_for("postgres").dialect(), "postgres");
        assert_eq!(renderer_for("mysql").dialect(), "mysql");
        assert_eq!(renderer_for("mariadb").dialect(), "mariadb");
        assert_eq!(renderer_for("oracle").dialect(), "oracle");
    }
}
