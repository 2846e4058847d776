//! Timestamps and epoch arithmetic.
//!
//! Timestamps count 1/1024-second ticks since the Unix epoch. The high bits
//! above bit 16 select the *epoch*, a 64-second bucket; difficulty accumulation
//! and main-block selection both reason per epoch.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of low bits that address a tick inside an epoch.
pub const EPOCH_BITS: u32 = 16;

/// Length of one epoch (the main-chain period) in ticks.
pub const MAIN_CHAIN_PERIOD: u64 = 1 << EPOCH_BITS;

const EPOCH_MASK: u64 = MAIN_CHAIN_PERIOD - 1;

/// A point in time in 1/1024-second ticks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    pub fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Convert Unix milliseconds, rounding to the nearest tick.
    pub fn from_millis(ms: u64) -> Self {
        let ticks = (ms as u128 * 1024 + 500) / 1000;
        Self(ticks.min(u64::MAX as u128) as u64)
    }

    pub fn as_millis(&self) -> u64 {
        ((self.0 as u128 * 1000) / 1024) as u64
    }

    /// Current system time. A clock set before 1970 reads as time zero.
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self::from_millis(ms)
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }

    pub fn epoch(&self) -> u64 {
        self.0 >> EPOCH_BITS
    }

    /// Whether this timestamp is the closing tick of its epoch.
    pub fn is_end_of_epoch(&self) -> bool {
        self.0 & EPOCH_MASK == EPOCH_MASK
    }

    /// The closing tick of this timestamp's epoch ("main time").
    pub fn end_of_epoch(&self) -> Self {
        Self(self.0 | EPOCH_MASK)
    }

    /// First tick of the given epoch.
    pub fn start_of_epoch(epoch: u64) -> Self {
        Self(epoch << EPOCH_BITS)
    }

    pub fn saturating_add(&self, ticks: u64) -> Self {
        Self(self.0.saturating_add(ticks))
    }

    /// Whether `duration` ticks have passed since this timestamp, relative to `now`.
    pub fn has_aged(&self, duration: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Source of wall-clock time for the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The operating system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
