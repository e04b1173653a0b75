/// Errors from store operations.
///
/// The memory driver with the default codec never returns an error; the
/// channel exists so every driver shares one operation signature.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A codec failed to decode a stored value.
    #[error("codec error: {0}")]
    Codec(String),

    /// Serialization of a value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
