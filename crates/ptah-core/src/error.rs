//! Error types for AST handling and SQL rendering.

/// Errors that can occur while building or rendering DDL.
#[derive(Debug, thiserror::Error)]
pub enum PtahError {
    /// A foreign key constraint was rendered without a reference.
    #[error("foreign key constraint '{constraint}' is missing reference")]
    MissingReference {
        /// Constraint name (empty for unnamed constraints).
        constraint: String,
    },

    /// A constraint type name that no renderer understands.
    #[error("unknown constraint type: {0}")]
    UnknownConstraintType(String),

    /// An ALTER TABLE operation name that no renderer understands.
    #[error("unknown alter operation: {0}")]
    UnknownAlterOperation(String),

    /// A statement inside a statement list failed to render.
    #[error("failed to render statement {index} ({kind}): {source}")]
    Statement {
        /// Position of the statement in its list.
        index: usize,
        /// Node kind of the failing statement.
        kind: &'static str,
        /// The underlying error.
        #[source]
        source: Box<PtahError>,
    },
}

impl PtahError {
    /// Wraps an error with the position of the statement that raised it.
    #[must_use]
    pub fn in_statement(self, index: usize, kind: &'static str) -> Self {
        Self::Statement {
            index,
            kind,
            source: Box::new(self),
        }
    }
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, PtahError>;
