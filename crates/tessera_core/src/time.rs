//! # Time
//!
//! Signed nanosecond timestamps and durations.
//!
//! All animation timing is integer nanoseconds so that long-running
//! interfaces never lose precision. [`Nanoseconds::MAX`] doubles as the
//! "infinite future" sentinel for timestamps that have not happened yet.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A signed count of nanoseconds, used both as a timestamp and a duration.
///
/// Addition and subtraction saturate, so arithmetic involving
/// [`Nanoseconds::MAX`] stays at the sentinel instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Nanoseconds(i64);

impl Nanoseconds {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// The infinite future.
    pub const MAX: Self = Self(i64::MAX);

    /// The infinite past.
    pub const MIN: Self = Self(i64::MIN);

    /// Creates a value from a raw nanosecond count.
    #[inline]
    #[must_use]
    pub const fn new(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Creates a value from milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Creates a value from whole seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Creates a value from fractional seconds, rounding to the nearest nanosecond.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        // `as` saturates on out-of-range floats
        Self((secs * 1e9).round() as i64)
    }

    /// Returns the raw nanosecond count.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Returns the value in fractional seconds.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e9
    }
}

impl Add for Nanoseconds {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Nanoseconds {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Nanoseconds {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Nanoseconds {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl From<std::time::Duration> for Nanoseconds {
    fn from(duration: std::time::Duration) -> Self {
        Self(i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl fmt::Display for Nanoseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MAX => f.write_str("+inf"),
            Self::MIN => f.write_str("-inf"),
            Self(nanos) => write!(f, "{nanos}ns"),
        }
    }
}
