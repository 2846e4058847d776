//! LMDB storage backend for the dagcore ledger.
//!
//! Implements all storage traits from `dagcore-store` using the `heed` LMDB bindings.
//! Each logical store maps to one or more LMDB databases within a single environment;
//! [`LmdbEnvironment`] bundles them and implements `ChainStore` by delegation.

pub mod account;
pub mod block;
pub mod environment;
pub mod error;
pub mod meta;
pub mod migration;
pub mod orphan;

pub use account::LmdbAccountIndexStore;
pub use block::LmdbBlockStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use meta::LmdbMetaStore;
pub use migration::{Migrator, CURRENT_SCHEMA_VERSION};
pub use orphan::LmdbOrphanStore;
