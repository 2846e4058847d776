//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use dagcore_store::{
    AccountIndexStore, BlockInfo, BlockStore, MetaStore, OrphanStore, StoreError,
};
use dagcore_types::{BlockAddress, Timestamp};

use crate::{
    LmdbAccountIndexStore, LmdbBlockStore, LmdbError, LmdbMetaStore, LmdbOrphanStore, Migrator,
};

/// Number of named databases the environment creates.
pub const DATABASE_COUNT: u32 = 6;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub blocks: LmdbBlockStore,
    pub orphans: LmdbOrphanStore,
    pub accounts: LmdbAccountIndexStore,
    pub meta: LmdbMetaStore,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, max_dbs: u32, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // SAFETY: the environment is opened once per path by this process and
        // never concurrently truncated or removed while open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(max_dbs.max(DATABASE_COUNT))
                .open(path)?
        };
        let env = Arc::new(env);

        let mut wtxn = env.write_txn()?;
        let blocks_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("blocks"))?;
        let info_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("block_info"))?;
        let heights_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("main_heights"))?;
        let orphans_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("orphans"))?;
        let ours_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("our_blocks"))?;
        let meta_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        let environment = Self {
            blocks: LmdbBlockStore {
                env: Arc::clone(&env),
                blocks_db,
                info_db,
                heights_db,
            },
            orphans: LmdbOrphanStore {
                env: Arc::clone(&env),
                orphans_db,
            },
            accounts: LmdbAccountIndexStore {
                env: Arc::clone(&env),
                ours_db,
            },
            meta: LmdbMetaStore {
                env: Arc::clone(&env),
                meta_db,
            },
            env,
        };
        Migrator::run(&environment.meta)?;
        tracing::info!(path = %path.display(), "opened LMDB environment");
        Ok(environment)
    }

    /// Flush buffered writes to disk.
    pub fn sync(&self) -> Result<(), LmdbError> {
        self.env.force_sync()?;
        Ok(())
    }
}

impl BlockStore for LmdbEnvironment {
    fn put_block(&self, address: &BlockAddress, raw: &[u8]) -> Result<(), StoreError> {
        self.blocks.put_block(address, raw)
    }

    fn get_block(&self, address: &BlockAddress) -> Result<Option<Vec<u8>>, StoreError> {
        self.blocks.get_block(address)
    }

    fn exists(&self, address: &BlockAddress) -> Result<bool, StoreError> {
        self.blocks.exists(address)
    }

    fn delete_block(&self, address: &BlockAddress) -> Result<(), StoreError> {
        self.blocks.delete_block(address)
    }

    fn put_info(&self, info: &BlockInfo) -> Result<(), StoreError> {
        self.blocks.put_info(info)
    }

    fn get_info(&self, address: &BlockAddress) -> Result<Option<BlockInfo>, StoreError> {
        self.blocks.get_info(address)
    }

    fn block_count(&self) -> Result<u64, StoreError> {
        self.blocks.block_count()
    }

    fn put_main_height(&self, height: u64, address: &BlockAddress) -> Result<(), StoreError> {
        self.blocks.put_main_height(height, address)
    }

    fn main_at_height(&self, height: u64) -> Result<Option<BlockAddress>, StoreError> {
        self.blocks.main_at_height(height)
    }

    fn delete_main_height(&self, height: u64) -> Result<(), StoreError> {
        self.blocks.delete_main_height(height)
    }
}

impl OrphanStore for LmdbEnvironment {
    fn add_orphan(&self, address: &BlockAddress, timestamp: Timestamp) -> Result<(), StoreError> {
        self.orphans.add_orphan(address, timestamp)
    }

    fn remove_orphan(&self, address: &BlockAddress) -> Result<bool, StoreError> {
        self.orphans.remove_orphan(address)
    }

    fn orphans(&self, limit: usize, not_after: Timestamp) -> Result<Vec<BlockAddress>, StoreError> {
        self.orphans.orphans(limit, not_after)
    }

    fn orphan_count(&self) -> Result<u64, StoreError> {
        self.orphans.orphan_count()
    }
}

impl AccountIndexStore for LmdbEnvironment {
    fn save_our_block(&self, key_index: u32, address: &BlockAddress) -> Result<(), StoreError> {
        self.accounts.save_our_block(key_index, address)
    }

    fn remove_our_block(&self, address: &BlockAddress) -> Result<(), StoreError> {
        self.accounts.remove_our_block(address)
    }

    fn our_blocks(&self) -> Result<Vec<(u32, BlockAddress)>, StoreError> {
        self.accounts.our_blocks()
    }
}

impl MetaStore for LmdbEnvironment {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta.put_meta(key, value)
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.meta.get_meta(key)
    }

    fn delete_meta(&self, key: &str) -> Result<(), StoreError> {
        self.meta.delete_meta(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let address = BlockAddress::from_low_bytes([4u8; 24]);
        {
            let env = LmdbEnvironment::open(dir.path(), 8, 16 * 1024 * 1024).unwrap();
            env.put_block(&address, &[1u8; 512]).unwrap();
            env.put_meta("k", b"v").unwrap();
        }
        let env = LmdbEnvironment::open(dir.path(), 8, 16 * 1024 * 1024).unwrap();
        assert_eq!(env.get_block(&address).unwrap(), Some(vec![1u8; 512]));
        assert_eq!(env.get_meta("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        assert!(LmdbEnvironment::open(&nested, 8, 16 * 1024 * 1024).is_ok());
        assert!(nested.exists());
    }
}
