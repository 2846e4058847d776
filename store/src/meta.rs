//! Metadata storage trait.

use crate::StoreError;

/// Generic key-value store for engine bookkeeping (chain head, statistics,
/// schema version) that doesn't belong in a block-keyed store.
pub trait MetaStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn delete_meta(&self, key: &str) -> Result<(), StoreError>;
}
