//! Index of locally-owned blocks.

use dagcore_types::BlockAddress;

use crate::StoreError;

/// Durable (address, key-index) records for blocks signed by a local key.
pub trait AccountIndexStore {
    fn save_our_block(&self, key_index: u32, address: &BlockAddress) -> Result<(), StoreError>;

    fn remove_our_block(&self, address: &BlockAddress) -> Result<(), StoreError>;

    fn our_blocks(&self) -> Result<Vec<(u32, BlockAddress)>, StoreError>;
}
