use core::fmt::{self, Debug, Display};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("value {value} is outside of {min}..={max}")]
pub struct RangeError {
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

/// Unsigned value restricted to `MIN..=MAX`.
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Ranged<const MIN: u32, const MAX: u32>(u32);

impl<const MIN: u32, const MAX: u32> Ranged<MIN, MAX> {
    pub const LOWER: u32 = MIN;
    pub const UPPER: u32 = MAX;

    pub fn new(value: u32) -> Result<Self, RangeError> {
        if (MIN..=MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RangeError {
                value,
                min: MIN,
                max: MAX,
            })
        }
    }

    /// Panics at compile time when used in a const context with an out-of-range value.
    pub const fn new_const(value: u32) -> Self {
        assert!(value >= MIN && value <= MAX);
        Self(value)
    }

    pub fn saturating(value: u32) -> Self {
        Self(value.clamp(MIN, MAX))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl<const MIN: u32, const MAX: u32> From<Ranged<MIN, MAX>> for u32 {
    fn from(value: Ranged<MIN, MAX>) -> Self {
        value.0
    }
}

impl<const MIN: u32, const MAX: u32> TryFrom<u32> for Ranged<MIN, MAX> {
    type Error = RangeError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<const MIN: u32, const MAX: u32> Debug for Ranged<MIN, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl<const MIN: u32, const MAX: u32> Display for Ranged<MIN, MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
