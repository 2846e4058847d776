//! LMDB implementation of BlockStore.

use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env};

use dagcore_store::{BlockInfo, BlockStore, StoreError};
use dagcore_types::BlockAddress;

use crate::LmdbError;

pub struct LmdbBlockStore {
    pub(crate) env: Arc<Env>,
    /// address -> 512 raw bytes
    pub(crate) blocks_db: Database<Bytes, Bytes>,
    /// address -> bincode(BlockInfo)
    pub(crate) info_db: Database<Bytes, Bytes>,
    /// big-endian height -> address
    pub(crate) heights_db: Database<Bytes, Bytes>,
}

pub(crate) fn decode_block_address(bytes: &[u8]) -> Result<BlockAddress, LmdbError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| LmdbError::Serialization("invalid block address length".into()))?;
    BlockAddress::from_bytes(arr).map_err(|e| LmdbError::Serialization(e.to_string()))
}

impl BlockStore for LmdbBlockStore {
    fn put_block(&self, address: &BlockAddress, raw: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.blocks_db
            .put(&mut wtxn, address.as_bytes(), raw)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_block(&self, address: &BlockAddress) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .blocks_db
            .get(&rtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(val.map(|v| v.to_vec()))
    }

    fn exists(&self, address: &BlockAddress) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .blocks_db
            .get(&rtxn, address.as_bytes())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }

    fn delete_block(&self, address: &BlockAddress) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.blocks_db
            .delete(&mut wtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        self.info_db
            .delete(&mut wtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn put_info(&self, info: &BlockInfo) -> Result<(), StoreError> {
        let bytes = bincode::serialize(info).map_err(LmdbError::from)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.info_db
            .put(&mut wtxn, info.address.as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_info(&self, address: &BlockAddress) -> Result<Option<BlockInfo>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .info_db
            .get(&rtxn, address.as_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => {
                let info: BlockInfo = bincode::deserialize(bytes).map_err(LmdbError::from)?;
                Ok(Some(info))
            }
            None => Ok(None),
        }
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.blocks_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }

    fn put_main_height(&self, height: u64, address: &BlockAddress) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.heights_db
            .put(&mut wtxn, &height.to_be_bytes(), address.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn main_at_height(&self, height: u64) -> Result<Option<BlockAddress>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .heights_db
            .get(&rtxn, &height.to_be_bytes())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(decode_block_address(bytes)?)),
            None => Ok(None),
        }
    }

    fn delete_main_height(&self, height: u64) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.heights_db
            .delete(&mut wtxn, &height.to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }
}
