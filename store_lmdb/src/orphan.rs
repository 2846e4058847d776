//! LMDB implementation of OrphanStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagcore_store::{OrphanStore, StoreError};
use dagcore_types::{BlockAddress, Timestamp};

use crate::block::decode_block_address;
use crate::LmdbError;

pub struct LmdbOrphanStore {
    pub(crate) env: Arc<Env>,
    /// address -> little-endian timestamp
    pub(crate) orphans_db: Database<Bytes, Bytes>,
}

impl OrphanStore for LmdbOrphanStore {
    fn add_orphan(&self, address: &BlockAddress, timestamp: Timestamp) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.orphans_db
            .put(&mut wtxn, address.as_bytes(), &timestamp.ticks().to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn remove_orphan(&self, address: &BlockAddress) -> Result<bool, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let removed = self
            .orphans_db
            .delete(&mut wtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(removed)
    }

    fn orphans(&self, limit: usize, not_after: Timestamp) -> Result<Vec<BlockAddress>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut tips = Vec::new();
        let iter = self.orphans_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            let arr: [u8; 8] = val
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid orphan timestamp".into()))?;
            let timestamp = Timestamp::new(u64::from_le_bytes(arr));
            if timestamp <= not_after {
                tips.push((timestamp, decode_block_address(key)?));
            }
        }
        tips.sort();
        Ok(tips.into_iter().take(limit).map(|(_, a)| a).collect())
    }

    fn orphan_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.orphans_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
