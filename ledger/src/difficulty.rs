//! Accumulated difficulty of a new block.

use dagcore_store::ChainStore;
use dagcore_types::{BlockAddress, Difficulty};

use crate::state::ChainState;
use crate::{Block, LedgerError};

impl<S: ChainStore> ChainState<S> {
    /// Accumulated difficulty of `block` and the link that contributed it.
    ///
    /// A link from an earlier epoch contributes its difficulty plus the
    /// block's own work. A same-epoch link only adds the block's own work on
    /// top of the first ancestor that leaves the epoch; if its best-link chain
    /// never leaves the epoch it contributes its difficulty unchanged. Ties
    /// keep the first link seen.
    pub(crate) fn compute_difficulty(
        &mut self,
        block: &Block,
    ) -> Result<(Difficulty, Option<BlockAddress>), LedgerError> {
        let own = block.own_difficulty();
        let epoch = block.timestamp().epoch();
        let mut best = own.clone();
        let mut best_link = None;

        for link in block.links() {
            let info = self.info(&link.address)?;
            let linked_epoch = info.timestamp.epoch();
            let linked_difficulty = info.difficulty.clone();
            let mut cursor = info.best_link;

            let candidate = if linked_epoch < epoch {
                &linked_difficulty + &own
            } else {
                let mut exit = None;
                while let Some(address) = cursor {
                    let ancestor = self.info(&address)?;
                    if ancestor.timestamp.epoch() < epoch {
                        exit = Some(ancestor.difficulty.clone());
                        break;
                    }
                    cursor = ancestor.best_link;
                }
                match exit {
                    Some(outside) => (&outside + &own).max(linked_difficulty),
                    None => linked_difficulty,
                }
            };

            if candidate > best {
                best = candidate;
                best_link = Some(link.address);
            }
        }

        Ok((best, best_link))
    }
}
