//! Block status flags.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Independent status bits tracked for every admitted block.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BlockFlags: u8 {
        /// Finalized main block.
        const MAIN = 0x01;
        /// On the current best-link path selected as the main chain.
        const MAIN_CHAIN = 0x02;
        /// Transfers of this block were executed.
        const APPLIED = 0x04;
        /// Visited by the application walk of some finalized block.
        const MAIN_REF = 0x08;
        /// Referenced by a later block; no longer a tip.
        const REF = 0x10;
        /// Output-signed by a key in the local keyring.
        const OURS = 0x20;
        /// Held in the in-memory extra pool, not yet durable.
        const EXTRA = 0x40;
        /// Carries a remark field.
        const REMARK = 0x80;
    }
}

impl BlockFlags {
    pub fn is_finalized(&self) -> bool {
        self.contains(Self::MAIN)
    }

    pub fn is_on_main_chain(&self) -> bool {
        self.contains(Self::MAIN_CHAIN)
    }

    pub fn is_applied(&self) -> bool {
        self.contains(Self::APPLIED)
    }

    pub fn is_processed(&self) -> bool {
        self.contains(Self::MAIN_REF)
    }

    pub fn is_referenced(&self) -> bool {
        self.contains(Self::REF)
    }

    pub fn is_owned(&self) -> bool {
        self.contains(Self::OURS)
    }

    pub fn is_extra(&self) -> bool {
        self.contains(Self::EXTRA)
    }

    pub fn has_remark(&self) -> bool {
        self.contains(Self::REMARK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_follow_bits() {
        let mut flags = BlockFlags::MAIN_CHAIN | BlockFlags::OURS;
        assert!(flags.is_on_main_chain());
        assert!(flags.is_owned());
        assert!(!flags.is_finalized());
        flags.insert(BlockFlags::MAIN);
        flags.remove(BlockFlags::MAIN_CHAIN);
        assert!(flags.is_finalized());
        assert!(!flags.is_on_main_chain());
    }

    #[test]
    fn wire_values_are_stable() {
        assert_eq!(BlockFlags::MAIN.bits(), 0x01);
        assert_eq!(BlockFlags::EXTRA.bits(), 0x40);
        assert_eq!(BlockFlags::all().bits(), 0xff);
    }
}
