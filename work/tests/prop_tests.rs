use proptest::prelude::*;

use dagcore_types::{BlockHash, Difficulty};
use dagcore_work::{hash_difficulty, meets_difficulty, work_target};

proptest! {
    /// Every hash scores at least the all-ones minimum.
    #[test]
    fn difficulty_has_floor(bytes in prop::array::uniform32(0u8..)) {
        let floor = Difficulty::from_u128(1u128 << 32);
        prop_assert!(hash_difficulty(&BlockHash::new(bytes)) >= floor);
    }

    /// A smaller target never scores less.
    #[test]
    fn smaller_target_more_work(
        a in prop::array::uniform32(0u8..),
        b in prop::array::uniform32(0u8..),
    ) {
        let (ha, hb) = (BlockHash::new(a), BlockHash::new(b));
        if work_target(&ha) <= work_target(&hb) {
            prop_assert!(hash_difficulty(&ha) >= hash_difficulty(&hb));
        }
    }

    /// A hash always meets its own difficulty.
    #[test]
    fn meets_own_difficulty(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert!(meets_difficulty(&hash, &hash_difficulty(&hash)));
    }

    /// Scoring is deterministic.
    #[test]
    fn scoring_is_deterministic(bytes in prop::array::uniform32(0u8..)) {
        let hash = BlockHash::new(bytes);
        prop_assert_eq!(hash_difficulty(&hash), hash_difficulty(&hash));
    }
}
