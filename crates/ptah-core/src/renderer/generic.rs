//! Fallback renderer for dialects without a dedicated implementation.
//!
//! Only statements with a portable ANSI form are emitted as SQL. Destructive
//! operations come out commented with a `WARNING` line, and anything that
//! needs dialect knowledge comes out commented with a `TODO` line.

use super::RenderVisitor;
use super::base::{BaseRenderer, quoted_list, render_literal_default};
use crate::ast::{
    AlterOperation, AlterTableNode, AlterTypeNode, ColumnNode, CommentNode, ConstraintNode,
    CreateTableNode, CreateTypeNode, DefaultValue, DropIndexNode, DropTableNode, DropTypeNode,
    EnumNode, IndexNode, Visitor,
};
use crate::error::Result;

/// Conservative ANSI renderer used for unknown dialects.
#[derive(Debug, Clone)]
pub struct GenericRenderer {
    base: BaseRenderer,
}

impl GenericRenderer {
    /// Creates a renderer labelled with the given dialect name.
    #[must_use]
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            base: BaseRenderer::new(dialect),
        }
    }

    fn column_definition(col: &ColumnNode) -> String {
        let mut parts = vec![col.name.clone(), col.column_type.clone()];

        if col.primary {
            parts.push("PRIMARY KEY".to_string());
        }
        if col.is_not_null() {
            parts.push("NOT NULL".to_string());
        }
        if col.unique && !col.primary {
            parts.push("UNIQUE".to_string());
        }

        match col.default {
            Some(DefaultValue::Literal(ref value)) => parts.push(format!(
                "DEFAULT {}",
                render_literal_default(value, &col.column_type, false)
            )),
            Some(DefaultValue::Expression(ref expr)) => parts.push(format!("DEFAULT {expr}")),
            None => {}
        }

        if let Some(ref check) = col.check {
            parts.push(format!("CHECK ({check})"));
        }

        parts.join(" ")
    }

    /// Writes a statement as a commented-out line under a marker comment.
    fn commented(&mut self, marker: &str, sql: &str) {
        self.base.write_comment(marker);
        self.base.write_comment(sql);
    }
}

impl Visitor for GenericRenderer {
    fn visit_create_table(&mut self, node: &CreateTableNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();

        if let Some(ref comment) = node.comment {
            self.base.write_comment(comment);
        }
        for col in node.columns.iter().filter(|c| c.auto_increment) {
            self.base.write_comment(&format!(
                "TODO: configure auto-increment for {}.{} manually ({dialect})",
                node.name, col.name
            ));
        }
        if !node.options.is_empty() {
            self.base.write_comment(&format!(
                "NOTE: table options for {} are not rendered for {dialect}",
                node.name
            ));
        }

        let mut lines: Vec<String> = node.columns.iter().map(Self::column_definition).collect();
        for col in &node.columns {
            if let Some(ref fk) = col.foreign_key {
                lines.push(self.base.hoisted_foreign_key(&col.name, fk));
            }
        }
        for constraint in &node.constraints {
            lines.push(self.base.render_constraint(constraint)?);
        }

        self.base.writeln(&format!(
            "CREATE TABLE {} (\n  {}\n);",
            node.name,
            lines.join(",\n  ")
        ));
        Ok(())
    }

    fn visit_alter_table(&mut self, node: &AlterTableNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();

        for operation in &node.operations {
            match operation {
                AlterOperation::AddColumn(col) => {
                    self.base.writeln(&format!(
                        "ALTER TABLE {} ADD COLUMN {};",
                        node.name,
                        Self::column_definition(col)
                    ));
                    if let Some(ref fk) = col.foreign_key {
                        let constraint = self.base.hoisted_foreign_key(&col.name, fk);
                        self.base
                            .writeln(&format!("ALTER TABLE {} ADD {constraint};", node.name));
                    }
                }
                AlterOperation::DropColumn(column) => self.commented(
                    &format!(
                        "WARNING: dropping {}.{column} destroys data, review before applying",
                        node.name
                    ),
                    &format!("ALTER TABLE {} DROP COLUMN {column};", node.name),
                ),
                AlterOperation::ModifyColumn(col) | AlterOperation::AlterColumn(col, _) => self.commented(
                    &format!(
                        "TODO: modifying {}.{} is not automated for {dialect}, complete manually",
                        node.name, col.name
                    ),
                    &format!(
                        "ALTER TABLE {} MODIFY COLUMN {};",
                        node.name,
                        Self::column_definition(col)
                    ),
                ),
            }
        }
        Ok(())
    }

    fn visit_column(&mut self, node: &ColumnNode) -> Result<()> {
        self.base.write(&Self::column_definition(node));
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
        Ok(())
    }

    fn visit_drop_index(&mut self, node: &DropIndexNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();
        let if_exists = if node.if_exists { "IF EXISTS " } else { "" };
        self.commented(
            &format!("TODO: check DROP INDEX syntax for {dialect} before applying"),
            &format!("DROP INDEX {if_exists}{};", node.name),
        );
        Ok(())
    }

    fn visit_enum(&mut self, node: &EnumNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();
        self.base.write_comment(&format!(
            "TODO: enum {} ({}) must be created manually for {dialect}",
            node.name,
            quoted_list(&node.values)
        ));
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
        self.commented(
            &format!(
                "WARNING: dropping table {} destroys data, review before applying",
                node.name
            ),
            &format!("{sql};"),
        );
        Ok(())
    }

    fn visit_drop_type(&mut self, node: &DropTypeNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();
        self.base.write_comment(&format!(
            "TODO: drop type {} manually for {dialect}",
            node.name
        ));
        Ok(())
    }

    fn visit_create_type(&mut self, node: &CreateTypeNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();
        if let Some(ref comment) = node.comment {
            self.base.write_comment(comment);
        }
        self.base.write_comment(&format!(
            "TODO: create type {} manually for {dialect}",
            node.name
        ));
        Ok(())
    }

    fn visit_alter_type(&mut self, node: &AlterTypeNode) -> Result<()> {
        let dialect = self.base.dialect().to_string();
        self.base.write_comment(&format!(
            "TODO: alter type {} manually for {dialect}",
            node.name
        ));
        Ok(())
    }
}

impl RenderVisitor for GenericRenderer {
    fn dialect(&self) -> &str {
        self.base.dialect()
    }

    fn reset(&mut self) {
        self.base.reset();
    }

    fn output(&self) -> &str {
        self.base.output()
    }
}
