use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Wrap an I/O error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
