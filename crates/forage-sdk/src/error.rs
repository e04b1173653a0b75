use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] forage_store::StoreError),

    #[error("config error: {0}")]
    Config(#[from] forage_types::TypeError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
