//! Block intake.
//!
//! Submits blocks to the chain. A block whose link is unknown is parked in the
//! [`UncheckedMap`] under the missing address; every admitted block releases
//! the blocks that were waiting for it, which may in turn release more.

use std::collections::VecDeque;
use std::sync::Arc;

use dagcore_ledger::{Block, Dagchain, ImportResult};
use dagcore_store::ChainStore;
use dagcore_types::{BlockAddress, Timestamp};
use parking_lot::Mutex;

use crate::unchecked::UncheckedMap;
use crate::NodeError;

/// Where an incoming block originated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockSource {
    /// Created or submitted locally.
    Local,
    /// Received from a peer.
    Network,
    /// Resubmitted after its missing link arrived.
    Unchecked,
}

pub struct BlockProcessor<S: ChainStore> {
    chain: Arc<Dagchain<S>>,
    unchecked: Mutex<UncheckedMap>,
}

fn unix_secs() -> u64 {
    Timestamp::now().as_millis() / 1000
}

impl<S: ChainStore> BlockProcessor<S> {
    pub fn new(chain: Arc<Dagchain<S>>, unchecked_max_size: usize) -> Self {
        Self {
            chain,
            unchecked: Mutex::new(UncheckedMap::new(unchecked_max_size)),
        }
    }

    pub fn chain(&self) -> &Arc<Dagchain<S>> {
        &self.chain
    }

    /// Admit `block` and everything that was waiting for it.
    ///
    /// Returns the outcome for `block` itself.
    pub fn process(&self, block: Block, source: BlockSource) -> Result<ImportResult, NodeError> {
        let address = block.address();
        let result = self.submit(block, source)?;
        if result.is_accepted() {
            self.release_dependents(address)?;
        }
        Ok(result)
    }

    /// Parse 512 wire bytes and process the block.
    pub fn process_bytes(&self, raw: &[u8], source: BlockSource) -> Result<ImportResult, NodeError> {
        let block = Block::from_bytes(raw)?;
        self.process(block, source)
    }

    fn submit(&self, block: Block, source: BlockSource) -> Result<ImportResult, NodeError> {
        let address = block.address();
        let result = self.chain.admit(block.clone())?;
        match result {
            ImportResult::Accepted { new_best } => {
                tracing::debug!(%address, ?source, new_best, "block processed");
            }
            ImportResult::NoParent(missing) => {
                let parked = self.unchecked.lock().insert(missing, block, unix_secs());
                if parked {
                    tracing::debug!(%address, %missing, ?source, "block parked until its link arrives");
                } else {
                    tracing::warn!(%address, %missing, "unchecked queue full or duplicate, block dropped");
                }
            }
            ImportResult::Invalid(reason) => {
                tracing::debug!(%address, %reason, ?source, "block rejected");
            }
            ImportResult::Exists => {
                tracing::trace!(%address, ?source, "block already known");
            }
        }
        Ok(result)
    }

    fn release_dependents(&self, start: BlockAddress) -> Result<(), NodeError> {
        let mut ready = VecDeque::from([start]);
        while let Some(arrived) = ready.pop_front() {
            let dependents = self.unchecked.lock().take_dependents(&arrived);
            for block in dependents {
                let address = block.address();
                if self.submit(block, BlockSource::Unchecked)?.is_accepted() {
                    ready.push_back(address);
                }
            }
        }
        Ok(())
    }

    /// Discard parked blocks older than `max_age_secs`.
    pub fn clear_expired(&self, max_age_secs: u64) -> usize {
        let removed = self.unchecked.lock().clear_expired(max_age_secs, unix_secs());
        if removed > 0 {
            tracing::debug!(removed, "expired unchecked blocks");
        }
        removed
    }

    pub fn unchecked_len(&self) -> usize {
        self.unchecked.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagcore_crypto::Keyring;
    use dagcore_ledger::{BlockBuilder, ChainConfig};
    use dagcore_nullables::{NullClock, NullStore};
    use dagcore_types::{Amount, NetworkId};

    fn processor(unchecked_max_size: usize) -> BlockProcessor<NullStore> {
        let clock = Arc::new(NullClock::new(Timestamp::start_of_epoch(30)));
        let chain = Dagchain::open(
            Arc::new(NullStore::new()),
            ChainConfig::devnet(),
            Keyring::empty(),
            clock,
        )
        .unwrap();
        BlockProcessor::new(Arc::new(chain), unchecked_max_size)
    }

    fn block(epoch: u64, links: &[BlockAddress]) -> Block {
        let mut builder = BlockBuilder::new(NetworkId::Devnet, Timestamp::start_of_epoch(epoch));
        for link in links {
            builder = builder.output(*link, Amount::ZERO);
        }
        builder.build().unwrap()
    }

    #[test]
    fn out_of_order_chain_resolves() {
        let bp = processor(16);
        let g = block(10, &[]);
        let p = block(11, &[g.address()]);
        let r = block(12, &[p.address()]);

        assert_eq!(
            bp.process(r.clone(), BlockSource::Network).unwrap(),
            ImportResult::NoParent(p.address())
        );
        assert_eq!(
            bp.process(p.clone(), BlockSource::Network).unwrap(),
            ImportResult::NoParent(g.address())
        );
        assert_eq!(bp.unchecked_len(), 2);

        assert!(bp.process(g.clone(), BlockSource::Local).unwrap().is_accepted());
        assert_eq!(bp.unchecked_len(), 0);
        for b in [&g, &p, &r] {
            assert!(bp.chain().contains(&b.address()).unwrap());
        }
        assert_eq!(bp.chain().head().top, Some(r.address()));
    }

    #[test]
    fn dependent_reparks_on_second_missing_link() {
        let bp = processor(16);
        let a = block(10, &[]);
        let b = BlockBuilder::new(
            NetworkId::Devnet,
            Timestamp::new(Timestamp::start_of_epoch(10).ticks() + 1),
        )
        .build()
        .unwrap();
        let child = block(11, &[a.address(), b.address()]);

        bp.process(child.clone(), BlockSource::Network).unwrap();
        bp.process(a, BlockSource::Network).unwrap();
        assert_eq!(bp.unchecked_len(), 1);
        assert!(!bp.chain().contains(&child.address()).unwrap());

        bp.process(b, BlockSource::Network).unwrap();
        assert!(bp.chain().contains(&child.address()).unwrap());
        assert_eq!(bp.unchecked_len(), 0);
    }

    #[test]
    fn full_queue_drops_block() {
        let bp = processor(1);
        let g = block(10, &[]);
        let p = block(11, &[g.address()]);
        let q = BlockBuilder::new(NetworkId::Devnet, Timestamp::start_of_epoch(11))
            .output(g.address(), Amount::ZERO)
            .remark([1; 32])
            .build()
            .unwrap();

        bp.process(p, BlockSource::Network).unwrap();
        bp.process(q.clone(), BlockSource::Network).unwrap();
        assert_eq!(bp.unchecked_len(), 1);

        bp.process(g, BlockSource::Network).unwrap();
        assert!(!bp.chain().contains(&q.address()).unwrap());
    }

    #[test]
    fn malformed_bytes_are_an_error() {
        let bp = processor(1);
        assert!(matches!(
            bp.process_bytes(&[1u8; 100], BlockSource::Network),
            Err(NodeError::Ledger(_))
        ));
    }

    #[test]
    fn fresh_entries_survive_expiry() {
        let bp = processor(4);
        let g = block(10, &[]);
        bp.process(block(11, &[g.address()]), BlockSource::Network).unwrap();
        assert_eq!(bp.clear_expired(3600), 0);
        assert_eq!(bp.clear_expired(0), 1);
        assert_eq!(bp.unchecked_len(), 0);
    }
}
