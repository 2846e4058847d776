//! Assembly of locally created blocks.

use dagcore_store::ChainStore;
use dagcore_types::Amount;

use crate::block::{FIELD_COUNT, FIELD_SIZE, NONCE_FIELD};
use crate::{Block, BlockBuilder, Dagchain, LedgerError};

/// Non-zero stand-in until the miner supplies a real nonce.
pub const PLACEHOLDER_NONCE: [u8; FIELD_SIZE] = {
    let mut nonce = [0u8; FIELD_SIZE];
    nonce[FIELD_SIZE - 1] = 1;
    nonce
};

impl<S: ChainStore> Dagchain<S> {
    /// A block timestamped now that links as many durable tips as fit,
    /// output-signed with the default key.
    pub fn create_link_block(&self, remark: Option<[u8; FIELD_SIZE]>) -> Result<Block, LedgerError> {
        let (network, now, key) = {
            let state = self.state.read();
            (
                state.config.network,
                state.clock.now(),
                state.keyring.default_key()?.clone(),
            )
        };

        let mut builder = BlockBuilder::new(network, now).sign_output(&key);
        if let Some(remark) = remark {
            builder = builder.remark(remark);
        }
        let capacity = FIELD_COUNT.saturating_sub(builder.field_count());
        for tip in self.orphans(capacity, now)? {
            builder = builder.output(tip, Amount::ZERO);
        }
        builder.build()
    }

    /// A main-block template closing the current epoch: the pretop link,
    /// then tips, output-signed with the default key and carrying
    /// [`PLACEHOLDER_NONCE`] for the miner to replace via [`Block::with_nonce`].
    pub fn create_main_block(&self) -> Result<Block, LedgerError> {
        let (network, now, key) = {
            let state = self.state.read();
            (
                state.config.network,
                state.clock.now(),
                state.keyring.default_key()?.clone(),
            )
        };
        let time = now.end_of_epoch();

        let mut builder = BlockBuilder::new(network, time)
            .sign_output(&key)
            .nonce(PLACEHOLDER_NONCE);
        let capacity = NONCE_FIELD.saturating_sub(builder.field_count());

        let mut links = Vec::with_capacity(capacity);
        if let Some(pretop) = self.pretop_for_link(time)? {
            links.push(pretop);
        }
        for tip in self.orphans(capacity, time)? {
            if links.len() >= capacity {
                break;
            }
            if !links.contains(&tip) {
                links.push(tip);
            }
        }
        for link in links {
            builder = builder.output(link, Amount::ZERO);
        }
        builder.build()
    }
}
