//! LMDB implementation of AccountIndexStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagcore_store::{AccountIndexStore, StoreError};
use dagcore_types::BlockAddress;

use crate::block::decode_block_address;
use crate::LmdbError;

pub struct LmdbAccountIndexStore {
    pub(crate) env: Arc<Env>,
    /// address -> little-endian key index
    pub(crate) ours_db: Database<Bytes, Bytes>,
}

impl AccountIndexStore for LmdbAccountIndexStore {
    fn save_our_block(&self, key_index: u32, address: &BlockAddress) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.ours_db
            .put(&mut wtxn, address.as_bytes(), &key_index.to_le_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn remove_our_block(&self, address: &BlockAddress) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.ours_db
            .delete(&mut wtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn our_blocks(&self) -> Result<Vec<(u32, BlockAddress)>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut blocks = Vec::new();
        let iter = self.ours_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, val) = result.map_err(LmdbError::from)?;
            let arr: [u8; 4] = val
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid key index".into()))?;
            blocks.push((u32::from_le_bytes(arr), decode_block_address(key)?));
        }
        Ok(blocks)
    }
}
