//! Consensus core of a proof-of-work block DAG.
//!
//! Blocks link any number of older blocks. Each block accumulates the
//! difficulty of its best link plus its own work, with links inside the same
//! epoch capped so batching cannot inflate difficulty. The best-difficulty tip
//! defines the main chain (one block per epoch along best links); main-chain
//! blocks that are deep and old enough are finalized, which credits a reward
//! and applies the transfers of every block they newly reference. A heavier
//! branch unwinds finalizations above the fork point.
//!
//! [`Dagchain`] is the entry point: [`Dagchain::admit`] for new blocks,
//! [`Dagchain::check_finalization`] on a timer, queries under a read lock.

pub mod assembly;
pub mod block;
pub mod builder;
pub mod chain;
pub mod config;
mod confirm;
mod difficulty;
pub mod error;
pub mod head;
pub mod linker;
mod main_chain;
pub mod pool;
mod state;

pub use assembly::PLACEHOLDER_NONCE;
pub use block::{Block, FieldSignature, Link, LinkKind, BLOCK_SIZE};
pub use builder::BlockBuilder;
pub use chain::Dagchain;
pub use config::ChainConfig;
pub use error::LedgerError;
pub use head::{ChainHead, ChainStats};
pub use linker::{ImportResult, InvalidReason};
pub use pool::ExtraPool;
