//! Integer timeline time.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};

/// Host time base: ticks per second.
pub const TICKS_PER_SECOND: i64 = 254_016_000_000;

/// A point or span on a sequence timeline, in host ticks.
///
/// All shift and placement arithmetic is done on integer ticks so that
/// adjacent clips meet exactly and never overlap through rounding.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Ticks(pub i64);

impl Ticks {
    pub const ZERO: Ticks = Ticks(0);

    /// Convert seconds to ticks, rounding to the nearest tick.
    pub fn from_secs_f64(secs: f64) -> Self {
        Ticks((secs * TICKS_PER_SECOND as f64).round() as i64)
    }

    /// Whole seconds.
    pub fn from_secs(secs: i64) -> Self {
        Ticks(secs * TICKS_PER_SECOND)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TICKS_PER_SECOND as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Add for Ticks {
    type Output = Ticks;

    fn add(self, rhs: Ticks) -> Ticks {
        Ticks(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Ticks {
    fn add_assign(&mut self, rhs: Ticks) {
        *self = *self + rhs;
    }
}

impl Sub for Ticks {
    type Output = Ticks;

    fn sub(self, rhs: Ticks) -> Ticks {
        Ticks(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}
