//! Configurable test doubles for driplet's external collaborators.
//!
//! Nullables are real implementations of the production traits with their
//! side effects removed: the clock does not tick, payments do not leave the
//! process, sign-ins replay a script. Tests configure them up front and
//! inspect what was recorded afterwards.

pub mod clock;
pub mod network;
pub mod signin;

pub use clock::NullClock;
pub use network::{NullNetwork, SentPayment};
pub use signin::NullSignIn;
