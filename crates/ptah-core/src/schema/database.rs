//! Introspected database schema.

use serde::{Deserialize, Serialize};

/// A column as reported by the database catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbColumn {
    /// Column name.
    pub name: String,
    /// Catalog data type, e.g. `character varying` or `USER-DEFINED`.
    pub data_type: String,
    /// Underlying type name; holds the enum name for `USER-DEFINED` columns.
    pub udt_name: Option<String>,
    /// Length of character types.
    pub character_maximum_length: Option<u32>,
    /// Precision of numeric types.
    pub numeric_precision: Option<u32>,
    /// Scale of numeric types.
    pub numeric_scale: Option<u32>,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default as stored by the database.
    pub default: Option<String>,
    /// Whether the column is the primary key.
    pub primary_key: bool,
    /// Whether the column is UNIQUE.
    pub unique: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
}

impl DbColumn {
    /// Creates a NOT NULL column.
    #[must_use]
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Self::default()
        }
    }

    /// Allows NULL.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the column as primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the stored default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets the underlying type name.
    #[must_use]
    pub fn udt_name(mut self, name: impl Into<String>) -> Self {
        self.udt_name = Some(name.into());
        self
    }

    /// Sets the character length.
    #[must_use]
    pub fn max_length(mut self, length: u32) -> Self {
        self.character_maximum_length = Some(length);
        self
    }

    /// Reassembles a full type string from the catalog columns.
    ///
    /// `USER-DEFINED` types resolve to their UDT name; lengths and
    /// precisions are appended in parentheses.
    #[must_use]
    pub fn full_type(&self) -> String {
        if self.data_type.eq_ignore_ascii_case("USER-DEFINED") {
            return self
                .udt_name
                .clone()
                .unwrap_or_else(|| self.data_type.clone());
        }
        if let Some(length) = self.character_maximum_length {
            if !self.data_type.contains('(') {
                return format!("{}({length})", self.data_type);
            }
        }
        let lower = self.data_type.to_lowercase();
        if lower == "numeric" || lower == "decimal" {
            if let Some(precision) = self.numeric_precision {
                return format!(
                    "{}({precision},{})",
                    self.data_type,
                    self.numeric_scale.unwrap_or(0)
                );
            }
        }
        self.data_type.clone()
    }
}

/// A table as reported by the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbTable {
    /// Table name.
    pub name: String,
    /// Table comment.
    pub comment: Option<String>,
    /// Columns in ordinal order.
    pub columns: Vec<DbColumn>,
}

impl DbTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: DbColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&DbColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// An enum type as reported by the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbEnum {
    /// Type name.
    pub name: String,
    /// Values in sort order.
    pub values: Vec<String>,
}

impl DbEnum {
    /// Creates an enum.
    #[must_use]
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|&v| v.to_string()).collect(),
        }
    }
}

/// An index as reported by the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbIndex {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: String,
    /// Indexed columns.
    pub columns: Vec<String>,
    /// UNIQUE index.
    pub unique: bool,
    /// Backs the primary key.
    pub primary: bool,
}

impl DbIndex {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(|&c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Marks the index as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the index as backing the primary key.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }
}

/// A table constraint as reported by the database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConstraint {
    /// Constraint name.
    pub name: String,
    /// Owning table.
    pub table: String,
    /// Constraint type as text, e.g. `UNIQUE` or `FOREIGN KEY`.
    #[serde(rename = "type")]
    pub constraint_type: String,
    /// Constrained column.
    pub column: String,
    /// Referenced table of a foreign key.
    pub foreign_table: Option<String>,
    /// Referenced column of a foreign key.
    pub foreign_column: Option<String>,
    /// ON DELETE rule.
    pub delete_rule: Option<String>,
    /// ON UPDATE rule.
    pub update_rule: Option<String>,
    /// CHECK clause.
    pub check_clause: Option<String>,
}

impl DbConstraint {
    /// Creates a constraint.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        constraint_type: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            constraint_type: constraint_type.into(),
            column: column.into(),
            ..Self::default()
        }
    }
}

/// Everything introspected from one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSchema {
    /// Dialect of the database, e.g. `postgres` or `mysql`.
    pub dialect: String,
    /// Tables.
    pub tables: Vec<DbTable>,
    /// Enum types. Empty for MySQL-family databases.
    pub enums: Vec<DbEnum>,
    /// Indexes.
    pub indexes: Vec<DbIndex>,
    /// Constraints.
    pub constraints: Vec<DbConstraint>,
}

impl DatabaseSchema {
    /// Creates an empty schema for a dialect.
    #[must_use]
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            ..Self::default()
        }
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: DbTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds an enum.
    #[must_use]
    pub fn enum_type(mut self, enum_type: DbEnum) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: DbIndex) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: DbConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&DbTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up an enum by name.
    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&DbEnum> {
        self.enums.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_type() {
        assert_eq!(
            DbColumn::new("email", "character varying")
                .max_length(255)
                .full_type(),
            "character varying(255)"
        );
        assert_eq!(
            DbColumn::new("status", "USER-DEFINED")
                .udt_name("user_status")
                .full_type(),
            "user_status"
        );

        let mut price = DbColumn::new("price", "numeric");
        price.numeric_precision = Some(10);
        price.numeric_scale = Some(2);
        assert_eq!(price.full_type(), "numeric(10,2)");

        assert_eq!(DbColumn::new("id", "integer").full_type(), "integer");
    }

    #[test]
    fn test_deserialize_constraint_type() {
        let json = r#"{"name": "uq_email", "table": "users", "type": "UNIQUE", "column": "email"}"#;
        let constraint: DbConstraint = serde_json::from_str(json).unwrap();
        assert_eq!(constraint.constraint_type, "UNIQUE");
        assert_eq!(constraint.foreign_table, None);
    }
}
