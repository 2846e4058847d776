//! Durable tip (orphan) storage.

use dagcore_types::{BlockAddress, Timestamp};

use crate::StoreError;

/// Durable blocks that no later block references yet.
pub trait OrphanStore {
    fn add_orphan(&self, address: &BlockAddress, timestamp: Timestamp) -> Result<(), StoreError>;

    /// Returns whether the address was present.
    fn remove_orphan(&self, address: &BlockAddress) -> Result<bool, StoreError>;

    /// Up to `limit` tips with timestamp `<= not_after`, oldest first.
    fn orphans(&self, limit: usize, not_after: Timestamp) -> Result<Vec<BlockAddress>, StoreError>;

    fn orphan_count(&self) -> Result<u64, StoreError>;
}
