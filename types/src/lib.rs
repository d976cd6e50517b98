//! Core types shared across the driplet faucet.
//!
//! Everything here is plain data: opaque user ids, validated ledger
//! addresses, fixed-point token amounts, second-resolution timestamps, and
//! the faucet's tunable parameters. No I/O, no async.

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod time;
pub mod user;

pub use address::LedgerAddress;
pub use amount::Amount;
pub use error::TypeError;
pub use params::FaucetParams;
pub use time::{Clock, SystemClock, Timestamp};
pub use user::UserId;
