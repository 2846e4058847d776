use proptest::prelude::*;

use dagcore_types::{Amount, BlockAddress, BlockHash, Difficulty, Timestamp};

proptest! {
    /// The address of a hash never carries high bytes.
    #[test]
    fn address_high_bytes_zero(bytes in prop::array::uniform32(0u8..)) {
        let address = BlockHash::new(bytes).to_address();
        prop_assert_eq!(&address.as_bytes()[..8], &[0u8; 8]);
        prop_assert!(BlockAddress::from_bytes(*address.as_bytes()).is_ok());
    }

    /// Hashes that differ only in their top 8 bytes share an address.
    #[test]
    fn address_ignores_high_bytes(bytes in prop::array::uniform32(0u8..), high in any::<u64>()) {
        let mut other = bytes;
        other[..8].copy_from_slice(&high.to_le_bytes());
        prop_assert_eq!(BlockHash::new(bytes).to_address(), BlockHash::new(other).to_address());
    }

    /// BlockAddress bincode serialization roundtrip.
    #[test]
    fn address_bincode_roundtrip(low in prop::array::uniform24(0u8..)) {
        let address = BlockAddress::from_low_bytes(low);
        let encoded = bincode::serialize(&address).unwrap();
        let decoded: BlockAddress = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, address);
    }

    /// Every timestamp lies in the epoch of its own end-of-epoch tick.
    #[test]
    fn end_of_epoch_same_epoch(ticks in 0u64..u64::MAX) {
        let t = Timestamp::new(ticks);
        prop_assert_eq!(t.end_of_epoch().epoch(), t.epoch());
        prop_assert!(t.end_of_epoch() >= t);
        prop_assert!(t.end_of_epoch().is_end_of_epoch());
    }

    /// Epoch order agrees with timestamp order.
    #[test]
    fn epoch_monotone(a in any::<u64>(), b in any::<u64>()) {
        let (ta, tb) = (Timestamp::new(a), Timestamp::new(b));
        if ta <= tb {
            prop_assert!(ta.epoch() <= tb.epoch());
        }
    }

    /// A checked credit is undone exactly by the matching debit.
    #[test]
    fn amount_adjustment_reversible(start in any::<u64>(), delta in any::<u64>()) {
        let a = Amount::new(start);
        let d = Amount::new(delta);
        match a.checked_add(d) {
            Some(sum) => prop_assert_eq!(sum.checked_sub(d), Some(a)),
            None => prop_assert!(start.checked_add(delta).is_none()),
        }
    }

    /// Difficulty addition is monotone.
    #[test]
    fn difficulty_sum_dominates(a in any::<u128>(), b in any::<u128>()) {
        let (da, db) = (Difficulty::from_u128(a), Difficulty::from_u128(b));
        let sum = &da + &db;
        prop_assert!(sum >= da);
        prop_assert!(sum >= db);
    }
}
