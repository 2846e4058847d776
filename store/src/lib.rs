//! Abstract storage traits for the dagcore ledger.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The consensus engine depends only on the traits.

pub mod account;
pub mod block;
pub mod error;
pub mod meta;
pub mod orphan;

pub use account::AccountIndexStore;
pub use block::{BlockInfo, BlockStore};
pub use error::StoreError;
pub use meta::MetaStore;
pub use orphan::OrphanStore;

/// Everything the chain engine needs from persistence.
pub trait ChainStore:
    BlockStore + OrphanStore + AccountIndexStore + MetaStore + Send + Sync
{
}

impl<T> ChainStore for T where
    T: BlockStore + OrphanStore + AccountIndexStore + MetaStore + Send + Sync
{
}
