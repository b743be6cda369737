use marksync_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Document model error: {0}")]
    Model(#[from] ModelError),
    #[error("Invalid font size: {0}")]
    InvalidFontSize(u32),
}
