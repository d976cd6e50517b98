use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypeError {
    #[error("invalid ledger address: {0}")]
    InvalidAddress(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid faucet parameters: {0}")]
    InvalidParams(String),
}
