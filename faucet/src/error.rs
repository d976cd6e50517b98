use driplet_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaucetError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rejected before any network call; never recorded as an attempt.
    #[error("validation failed: {0}")]
    Validation(String),
}
