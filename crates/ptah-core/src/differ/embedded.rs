//! Flattening of embedded structs into plain table fields.

use crate::schema::{EmbeddedMode, Field, GeneratedSchema, Table};

/// Returns every column of `table`: its own fields followed by the columns
/// contributed by embedded structs.
///
/// Fields typed with a declared enum get that enum's values filled in, so
/// dialects with inline enums can render them.
#[must_use]
pub fn table_fields(schema: &GeneratedSchema, table: &Table) -> Vec<Field> {
    let mut fields = expand_embedded_fields(schema, table);
    for field in &mut fields {
        if field.enum_values.is_empty() {
            if let Some(declared) = schema.get_enum(&field.field_type) {
                field.enum_values.clone_from(&declared.values);
            }
        }
    }
    fields
}

/// Expands the embedded fields of `table` according to their mode.
///
/// - `inline`: the embedded struct's fields, with the prefix prepended.
/// - `json`: one column of the override type, `JSONB` by default.
/// - `relation`: one `INTEGER` foreign key column.
/// - `skip`: nothing.
#[must_use]
pub fn expand_embedded_fields(schema: &GeneratedSchema, table: &Table) -> Vec<Field> {
    let mut fields: Vec<Field> = schema.struct_fields(&table.struct_name).cloned().collect();

    let embedded = schema
        .embedded_fields
        .iter()
        .filter(|e| e.struct_name == table.struct_name);

    for embedded in embedded {
        match embedded.mode {
            EmbeddedMode::Inline => {
                let prefix = embedded.prefix.as_deref().unwrap_or_default();
                for inner in schema.struct_fields(&embedded.embedded_type) {
                    let mut field = inner.clone();
                    field.struct_name.clone_from(&table.struct_name);
                    field.name = format!("{prefix}{}", inner.name);
                    field.primary = false;
                    field.auto_increment = false;
                    field.nullable = field.nullable || embedded.nullable;
                    fields.push(field);
                }
            }
            EmbeddedMode::Json => {
                fields.push(Field {
                    struct_name: table.struct_name.clone(),
                    name: embedded.name.clone(),
                    field_type: embedded
                        .json_type
                        .clone()
                        .unwrap_or_else(|| "JSONB".to_string()),
                    nullable: embedded.nullable,
                    comment: embedded.comment.clone(),
                    ..Field::default()
                });
            }
            EmbeddedMode::Relation => {
                let name = embedded
                    .field
                    .clone()
                    .unwrap_or_else(|| format!("{}_id", embedded.name));
                fields.push(Field {
                    struct_name: table.struct_name.clone(),
                    foreign_key_name: Some(format!("fk_{}_{name}", table.name)),
                    name,
                    field_type: "INTEGER".to_string(),
                    nullable: embedded.nullable,
                    foreign: embedded.reference.clone(),
                    on_delete: embedded.on_delete.clone(),
                    comment: embedded.comment.clone(),
                    ..Field::default()
                });
            }
            EmbeddedMode::Skip => {}
        }
    }

    fields
}
