//! Host process plumbing for the driplet faucet.
//!
//! Wires the reward controller to a messaging transport through event
//! channels, tracks pending wallet sign-ins, and owns configuration,
//! logging, and shutdown.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod node;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use events::{InboundEvent, OutboundReply};
pub use logging::{init_logging, LogFormat};
pub use node::FaucetNode;
pub use shutdown::{Shutdown, ShutdownHandle};
