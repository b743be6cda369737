use thiserror::Error;

/// Errors raised by the document model, its steps and transactions
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Position {pos} out of range (content size {size})")]
    PositionOutOfRange { pos: usize, size: usize },

    #[error("Replace failed: {0}")]
    Replace(String),

    #[error("Invalid content for {node}: {reason}")]
    InvalidContent { node: String, reason: String },

    #[error("No node at position {0}")]
    NoNodeAt(usize),

    #[error("Cannot split at position {0}")]
    CannotSplit(usize),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Unknown mark type: {0}")]
    UnknownMarkType(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid document JSON: {0}")]
    Json(String),

    #[error("Append hooks did not settle after {0} rounds")]
    AppendLoop(usize),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Json(err.to_string())
    }
}
