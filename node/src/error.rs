use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("faucet error: {0}")]
    Faucet(#[from] driplet_faucet::FaucetError),

    #[error("ledger error: {0}")]
    Ledger(#[from] driplet_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] driplet_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
