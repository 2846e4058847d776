//! Own difficulty of a block hash.

use dagcore_types::{BlockHash, Difficulty};

/// Number of leading hash bytes that make up the work target.
const TARGET_BYTES: usize = 12;

/// The 96-bit work target: hash bytes `0..12` read big-endian.
pub fn work_target(hash: &BlockHash) -> u128 {
    hash.as_bytes()[..TARGET_BYTES]
        .iter()
        .fold(0u128, |acc, b| (acc << 8) | *b as u128)
}

/// `(2^128 - 1) / target`. A zero target scores the maximum.
pub fn hash_difficulty(hash: &BlockHash) -> Difficulty {
    let target = work_target(hash);
    if target == 0 {
        return Difficulty::from_u128(u128::MAX);
    }
    Difficulty::from_u128(u128::MAX / target)
}
