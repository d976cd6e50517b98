//! Storage traits for the driplet faucet.
//!
//! The reward controller depends only on the [`AccountStore`] and
//! [`TransactionStore`] traits; any backend can sit behind them. This crate
//! ships [`MemoryStore`], a thread-safe in-memory implementation used for
//! single-instance deployments and tests. Durable schema management is an
//! external collaborator's concern.

pub mod account;
pub mod error;
pub mod memory;
pub mod transaction;

pub use account::{Account, AccountStore};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use transaction::{Purpose, TransactionRecord, TransactionStore, TxOutcome};
