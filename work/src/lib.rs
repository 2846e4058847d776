//! Proof-of-work difficulty.
//!
//! A block's own work is read straight off its hash: the smaller the leading
//! 96 bits, the more work the miner did. Accumulating work along the DAG is
//! the ledger's job; this crate only scores a single hash.

pub mod difficulty;
pub mod error;
pub mod validator;

pub use difficulty::{hash_difficulty, work_target};
pub use error::WorkError;
pub use validator::{meets_difficulty, validate_work};
