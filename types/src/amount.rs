//! Coin amounts.
//!
//! Amounts are fixed-point integers: one coin is `2^32` raw units, matching the
//! 8-byte little-endian amount slot of a wire link.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A balance, fee, reward or link amount in raw units.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Raw units per whole coin.
    pub const UNIT: u64 = 1 << 32;

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Whole coins, saturating at the representable maximum.
    pub fn from_coins(coins: u64) -> Self {
        Self(coins.saturating_mul(Self::UNIT))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Right shift of the raw value (reward halving).
    pub fn shr(self, bits: u32) -> Self {
        Self(self.0.checked_shr(bits).unwrap_or(0))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 >> 32;
        let frac = ((self.0 & 0xffff_ffff) as u128 * 1_000_000_000) >> 32;
        write!(f, "{}.{:09}", whole, frac)
    }
}
