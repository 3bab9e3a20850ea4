use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// One generated integer in `[0, 10)`.
///
/// Samples carry no identity beyond their position in the sequence that produced them; they are
/// handed to consumers by value and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct NumberSample(u8);

impl NumberSample {
    /// Exclusive upper bound of sample values.
    pub const UPPER_BOUND: u8 = 10;

    pub fn new(value: u8) -> Result<Self, GenerationError> {
        if value < Self::UPPER_BOUND {
            Ok(Self(value))
        } else {
            Err(GenerationError::SampleOutOfRange(value))
        }
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_odd(&self) -> bool {
        self.0 % 2 == 1
    }
}

impl TryFrom<u8> for NumberSample {
    type Error = GenerationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NumberSample> for u8 {
    fn from(sample: NumberSample) -> Self {
        sample.0
    }
}

impl fmt::Display for NumberSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
