use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("duplicate account: {0}")]
    Duplicate(String),

    #[error("invalid record: {0}")]
    Invalid(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}
