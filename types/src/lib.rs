//! Fundamental types for the dagcore ledger.
//!
//! This crate defines the value types shared across every other crate in the workspace:
//! block hashes and addresses, amounts, timestamps with epoch arithmetic, accumulated
//! difficulty, block status flags, and wire field kinds.

pub mod address;
pub mod amount;
pub mod difficulty;
pub mod error;
pub mod field;
pub mod flags;
pub mod hash;
pub mod network;
pub mod time;

pub use address::BlockAddress;
pub use amount::Amount;
pub use difficulty::Difficulty;
pub use error::TypesError;
pub use field::FieldType;
pub use flags::BlockFlags;
pub use hash::BlockHash;
pub use network::NetworkId;
pub use time::{Clock, SystemClock, Timestamp, EPOCH_BITS, MAIN_CHAIN_PERIOD};
