//! Target schema declared by application code.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::differ::is_enum_type;

/// A column declared on a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Field {
    /// Owning struct; matches [`Table::struct_name`].
    pub struct_name: String,
    /// Column name.
    pub name: String,
    /// Declared SQL type, e.g. `VARCHAR(255)`, `SERIAL`, `enum_status`.
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Whether the column is (part of) the primary key.
    pub primary: bool,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Whether the column is UNIQUE.
    pub unique: bool,
    /// Literal default value.
    pub default: Option<String>,
    /// Default SQL expression; wins over `default`.
    pub default_expr: Option<String>,
    /// Values of an inline enum type.
    pub enum_values: Vec<String>,
    /// CHECK expression.
    pub check: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
    /// Foreign reference written as `table(column)`.
    pub foreign: Option<String>,
    /// Foreign key constraint name.
    pub foreign_key_name: Option<String>,
    /// ON DELETE action.
    pub on_delete: Option<String>,
    /// ON UPDATE action.
    pub on_update: Option<String>,
}

impl Field {
    /// Creates a NOT NULL field.
    #[must_use]
    pub fn new(
        struct_name: impl Into<String>,
        name: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            struct_name: struct_name.into(),
            name: name.into(),
            field_type: field_type.into(),
            ..Self::default()
        }
    }

    /// Allows NULL.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Marks the field as primary key.
    #[must_use]
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.nullable = false;
        self
    }

    /// Marks the field as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Marks the field as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets a literal default.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets a default expression.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default_expr = Some(expr.into());
        self
    }

    /// Sets inline enum values.
    #[must_use]
    pub fn enum_values(mut self, values: &[&str]) -> Self {
        self.enum_values = values.iter().map(|&v| v.to_string()).collect();
        self
    }

    /// Sets a CHECK expression.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(expr.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// References `table(column)`.
    #[must_use]
    pub fn foreign(mut self, table: &str, column: &str) -> Self {
        self.foreign = Some(format!("{table}({column})"));
        self
    }

    /// Sets the foreign key constraint name.
    #[must_use]
    pub fn foreign_key_name(mut self, name: impl Into<String>) -> Self {
        self.foreign_key_name = Some(name.into());
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

    /// Splits the `table(column)` reference into its parts.
    ///
    /// A bare table name references its `id` column.
    #[must_use]
    pub fn foreign_reference(&self) -> Option<(String, String)> {
        let foreign = self.foreign.as_deref()?.trim();
        if foreign.is_empty() {
            return None;
        }
        match foreign.split_once('(') {
            Some((table, rest)) => {
                let column = rest.trim_end_matches(')').trim();
                Some((table.trim().to_string(), column.to_string()))
            }
            None => Some((foreign.to_string(), "id".to_string())),
        }
    }

    /// Returns `true` if the field uses an enum type.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        is_enum_type(&self.field_type, &self.enum_values)
    }
}

/// A table declared by a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Table {
    /// Struct name; fields and indexes refer to it.
    pub struct_name: String,
    /// Table name.
    pub name: String,
    /// Table comment.
    pub comment: Option<String>,
    /// Explicit composite primary key.
    pub primary_key: Vec<String>,
    /// Options per dialect, e.g. `mysql` → `ENGINE` → `InnoDB`.
    pub options: BTreeMap<String, BTreeMap<String, String>>,
}

impl Table {
    /// Creates a table.
    #[must_use]
    pub fn new(struct_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            struct_name: struct_name.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets an explicit composite primary key.
    #[must_use]
    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|&c| c.to_string()).collect();
        self
    }

    /// Adds an option for one dialect.
    #[must_use]
    pub fn option(
        mut self,
        dialect: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.options
            .entry(dialect.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Options that apply to `dialect`. MariaDB falls back to MySQL options.
    #[must_use]
    pub fn options_for(&self, dialect: &str) -> Option<&BTreeMap<String, String>> {
        let dialect = dialect.to_lowercase();
        self.options.get(&dialect).or_else(|| {
            if dialect == "mariadb" {
                self.options.get("mysql")
            } else {
                None
            }
        })
    }
}

/// A named enum type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enum {
    /// Type name.
    pub name: String,
    /// Values in declaration order.
    pub values: Vec<String>,
}

impl Enum {
    /// Creates an enum.
    #[must_use]
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|&v| v.to_string()).collect(),
        }
    }
}

/// An index declared on a struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Index {
    /// Owning struct.
    pub struct_name: String,
    /// Index name.
    pub name: String,
    /// Indexed columns.
    pub fields: Vec<String>,
    /// UNIQUE index.
    pub unique: bool,
    /// Index comment.
    pub comment: Option<String>,
}

impl Index {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(struct_name: impl Into<String>, name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            struct_name: struct_name.into(),
            name: name.into(),
            fields: fields.iter().map(|&f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Marks the index as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// How an embedded struct is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmbeddedMode {
    /// Copy the embedded struct's columns into the parent table.
    #[default]
    Inline,
    /// Store the embedded value in one JSON column.
    Json,
    /// Store a foreign key to another table.
    Relation,
    /// Do not store it.
    Skip,
}

impl EmbeddedMode {
    /// Returns the textual mode name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Json => "json",
            Self::Relation => "relation",
            Self::Skip => "skip",
        }
    }
}

impl From<&str> for EmbeddedMode {
    /// Unrecognised modes fall back to [`EmbeddedMode::Inline`].
    fn from(mode: &str) -> Self {
        match mode.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "relation" => Self::Relation,
            "skip" => Self::Skip,
            _ => Self::Inline,
        }
    }
}

impl From<String> for EmbeddedMode {
    fn from(mode: String) -> Self {
        Self::from(mode.as_str())
    }
}

impl From<EmbeddedMode> for String {
    fn from(mode: EmbeddedMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for EmbeddedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A struct embedded into another struct's table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddedField {
    /// Owning struct.
    pub struct_name: String,
    /// Storage mode.
    pub mode: EmbeddedMode,
    /// Column prefix for inline mode.
    pub prefix: Option<String>,
    /// Column name for json mode.
    pub name: String,
    /// Struct name of the embedded type.
    pub embedded_type: String,
    /// Whether the generated columns accept NULL.
    pub nullable: bool,
    /// Column type for json mode; `JSONB` when unset.
    pub json_type: Option<String>,
    /// Foreign key column for relation mode.
    pub field: Option<String>,
    /// Referenced `table(column)` for relation mode.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    /// ON DELETE action for relation mode.
    pub on_delete: Option<String>,
    /// Column comment.
    pub comment: Option<String>,
}

impl EmbeddedField {
    /// Creates an embedded field.
    #[must_use]
    pub fn new(
        struct_name: impl Into<String>,
        name: impl Into<String>,
        embedded_type: impl Into<String>,
        mode: EmbeddedMode,
    ) -> Self {
        Self {
            struct_name: struct_name.into(),
            mode,
            name: name.into(),
            embedded_type: embedded_type.into(),
            ..Self::default()
        }
    }

    /// Sets the inline column prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the foreign key column and referenced `table(column)`.
    #[must_use]
    pub fn relation(mut self, field: impl Into<String>, reference: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self.reference = Some(reference.into());
        self
    }

    /// Sets the json column type.
    #[must_use]
    pub fn json_type(mut self, json_type: impl Into<String>) -> Self {
        self.json_type = Some(json_type.into());
        self
    }

    /// Allows NULL.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Everything the application code declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedSchema {
    /// Tables in declaration order.
    pub tables: Vec<Table>,
    /// Fields of every table.
    pub fields: Vec<Field>,
    /// Enum types.
    pub enums: Vec<Enum>,
    /// Indexes.
    pub indexes: Vec<Index>,
    /// Embedded structs.
    pub embedded_fields: Vec<EmbeddedField>,
}

impl GeneratedSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds an enum.
    #[must_use]
    pub fn enum_type(mut self, enum_type: Enum) -> Self {
        self.enums.push(enum_type);
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds an embedded field.
    #[must_use]
    pub fn embedded(mut self, embedded: EmbeddedField) -> Self {
        self.embedded_fields.push(embedded);
        self
    }

    /// Looks up a table by table name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Looks up an enum by name.
    #[must_use]
    pub fn get_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Declared enums plus enums only introduced through a field's inline
    /// values, in declaration order.
    #[must_use]
    pub fn effective_enums(&self) -> Vec<Enum> {
        let mut enums = self.enums.clone();
        for field in &self.fields {
            if field.enum_values.is_empty() || enums.iter().any(|e| e.name == field.field_type) {
                continue;
            }
            enums.push(Enum {
                name: field.field_type.clone(),
                values: field.enum_values.clone(),
            });
        }
        enums
    }

    /// Fields declared directly on `struct_name`, embedded fields excluded.
    pub fn struct_fields<'a>(&'a self, struct_name: &'a str) -> impl Iterator<Item = &'a Field> {
        self.fields
            .iter()
            .filter(move |f| f.struct_name == struct_name)
    }
}
