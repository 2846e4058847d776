//! Accumulated proof-of-work difficulty.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// An unbounded non-negative difficulty value.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Difficulty(BigUint);

impl Difficulty {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(BigUint::from(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for Difficulty {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl Add<&Difficulty> for &Difficulty {
    type Output = Difficulty;
    fn add(self, rhs: &Difficulty) -> Difficulty {
        Difficulty(&self.0 + &rhs.0)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_does_not_overflow_u128() {
        let max = Difficulty::from_u128(u128::MAX);
        let sum = &max + &max;
        assert!(sum > max);
        assert_eq!(sum.as_biguint(), &(BigUint::from(u128::MAX) * 2u32));
    }

    #[test]
    fn zero_is_default() {
        assert!(Difficulty::default().is_zero());
        assert!(!Difficulty::from_u128(1).is_zero());
    }
}
