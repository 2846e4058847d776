//! Block address: the key every block is looked up by.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// Low 192 bits of a block hash, zero-padded to 32 bytes.
///
/// The first 8 bytes are always zero. On the wire those 8 bytes are reused to
/// carry the amount of a link (see the ledger's link codec).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockAddress([u8; 32]);

impl BlockAddress {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Build an address from the 24 low bytes of a hash.
    pub fn from_low_bytes(low: [u8; 24]) -> Self {
        let mut bytes = [0u8; 32];
        bytes[8..].copy_from_slice(&low);
        Self(bytes)
    }

    /// Wrap 32 bytes, rejecting values whose high 8 bytes are set.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, TypesError> {
        if bytes[..8] != [0u8; 8] {
            return Err(TypesError::NotAnAddress);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn low_bytes(&self) -> &[u8] {
        &self.0[8..]
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let bytes = hex::decode(s).map_err(|e| TypesError::InvalidHex(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypesError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Self::from_bytes(arr)
    }
}

impl fmt::Debug for BlockAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockAddress({})", hex::encode(&self.0[8..14]))
    }
}

impl fmt::Display for BlockAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
