//! Schema model consumed by the differ and the renderers.
//!
//! Two views of a database are modelled:
//!
//! - [`GeneratedSchema`]: what the application code declares (the target).
//! - [`DatabaseSchema`]: what an introspected database currently contains.
//!
//! Both are plain serde types so they can be produced elsewhere and handed
//! over as JSON.

mod database;
mod generated;

pub use database::{DatabaseSchema, DbColumn, DbConstraint, DbEnum, DbIndex, DbTable};
pub use generated::{EmbeddedField, EmbeddedMode, Enum, Field, GeneratedSchema, Index, Table};
