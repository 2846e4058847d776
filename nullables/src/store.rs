//! Nullable store: thread-safe in-memory storage for tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use dagcore_store::{
    AccountIndexStore, BlockInfo, BlockStore, MetaStore, OrphanStore, StoreError,
};
use dagcore_types::{BlockAddress, Timestamp};

/// An in-memory implementation of every chain storage trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Debug, Default)]
pub struct NullStore {
    blocks: Mutex<HashMap<BlockAddress, Vec<u8>>>,
    infos: Mutex<HashMap<BlockAddress, BlockInfo>>,
    heights: Mutex<BTreeMap<u64, BlockAddress>>,
    orphans: Mutex<HashMap<BlockAddress, Timestamp>>,
    ours: Mutex<HashMap<BlockAddress, u32>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of finalized heights currently indexed.
    pub fn main_height_count(&self) -> usize {
        lock(&self.heights).len()
    }
}

// A panicking test thread must not hide the state from later assertions.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl BlockStore for NullStore {
    fn put_block(&self, address: &BlockAddress, raw: &[u8]) -> Result<(), StoreError> {
        lock(&self.blocks).insert(*address, raw.to_vec());
        Ok(())
    }

    fn get_block(&self, address: &BlockAddress) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.blocks).get(address).cloned())
    }

    fn exists(&self, address: &BlockAddress) -> Result<bool, StoreError> {
        Ok(lock(&self.blocks).contains_key(address))
    }

    fn delete_block(&self, address: &BlockAddress) -> Result<(), StoreError> {
        lock(&self.blocks).remove(address);
        lock(&self.infos).remove(address);
        Ok(())
    }

    fn put_info(&self, info: &BlockInfo) -> Result<(), StoreError> {
        lock(&self.infos).insert(info.address, info.clone());
        Ok(())
    }

    fn get_info(&self, address: &BlockAddress) -> Result<Option<BlockInfo>, StoreError> {
        Ok(lock(&self.infos).get(address).cloned())
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.blocks).len() as u64)
    }

    fn put_main_height(&self, height: u64, address: &BlockAddress) -> Result<(), StoreError> {
        lock(&self.heights).insert(height, *address);
        Ok(())
    }

    fn main_at_height(&self, height: u64) -> Result<Option<BlockAddress>, StoreError> {
        Ok(lock(&self.heights).get(&height).copied())
    }

    fn delete_main_height(&self, height: u64) -> Result<(), StoreError> {
        lock(&self.heights).remove(&height);
        Ok(())
    }
}

impl OrphanStore for NullStore {
    fn add_orphan(&self, address: &BlockAddress, timestamp: Timestamp) -> Result<(), StoreError> {
        lock(&self.orphans).insert(*address, timestamp);
        Ok(())
    }

    fn remove_orphan(&self, address: &BlockAddress) -> Result<bool, StoreError> {
        Ok(lock(&self.orphans).remove(address).is_some())
    }

    fn orphans(&self, limit: usize, not_after: Timestamp) -> Result<Vec<BlockAddress>, StoreError> {
        let mut tips: Vec<(Timestamp, BlockAddress)> = lock(&self.orphans)
            .iter()
            .filter(|(_, t)| **t <= not_after)
            .map(|(a, t)| (*t, *a))
            .collect();
        tips.sort();
        Ok(tips.into_iter().take(limit).map(|(_, a)| a).collect())
    }

    fn orphan_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.orphans).len() as u64)
    }
}

impl AccountIndexStore for NullStore {
    fn save_our_block(&self, key_index: u32, address: &BlockAddress) -> Result<(), StoreError> {
        lock(&self.ours).insert(*address, key_index);
        Ok(())
    }

    fn remove_our_block(&self, address: &BlockAddress) -> Result<(), StoreError> {
        lock(&self.ours).remove(address);
        Ok(())
    }

    fn our_blocks(&self) -> Result<Vec<(u32, BlockAddress)>, StoreError> {
        let mut blocks: Vec<(u32, BlockAddress)> =
            lock(&self.ours).iter().map(|(a, k)| (*k, *a)).collect();
        blocks.sort();
        Ok(blocks)
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        lock(&self.meta).insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.meta).get(key).cloned())
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.meta).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dagcore_types::{Amount, BlockHash};

    use super::*;

    fn address(n: u8) -> BlockAddress {
        BlockAddress::from_low_bytes([n; 24])
    }

    #[test]
    fn test_put_get_block() {
        let store = NullStore::new();
        store.put_block(&address(1), &[7u8; 512]).unwrap();
        assert_eq!(store.get_block(&address(1)).unwrap(), Some(vec![7u8; 512]));
        assert!(store.exists(&address(1)).unwrap());
        assert_eq!(store.get_block(&address(2)).unwrap(), None);
    }

    #[test]
    fn test_delete_block_drops_info() {
        let store = NullStore::new();
        let hash = BlockHash::new([4u8; 32]);
        let addr = hash.to_address();
        store.put_block(&addr, &[1u8; 512]).unwrap();
        store
            .put_info(&BlockInfo::new(addr, hash, Timestamp::new(3), Amount::ZERO))
            .unwrap();
        store.delete_block(&addr).unwrap();
        assert_eq!(store.block_count().unwrap(), 0);
        assert_eq!(store.get_info(&addr).unwrap(), None);
    }

    #[test]
    fn test_orphans_oldest_first() {
        let store = NullStore::new();
        store.add_orphan(&address(1), Timestamp::new(50)).unwrap();
        store.add_orphan(&address(2), Timestamp::new(20)).unwrap();
        store.add_orphan(&address(3), Timestamp::new(90)).unwrap();
        assert_eq!(
            store.orphans(5, Timestamp::new(60)).unwrap(),
            vec![address(2), address(1)]
        );
        assert!(store.remove_orphan(&address(2)).unwrap());
        assert_eq!(store.orphan_count().unwrap(), 2);
    }

    #[test]
    fn test_meta() {
        let store = NullStore::new();
        store.put_meta("head", b"abc").unwrap();
        assert_eq!(store.get_meta("head").unwrap(), Some(b"abc".to_vec()));
        store.delete_meta("head").unwrap();
        assert_eq!(store.get_meta("head").unwrap(), None);
    }
}
