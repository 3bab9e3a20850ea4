use std::time::Duration;

use crate::error::GenerationError;

/// Half-open range `[min, max)` of simulated work delay applied before each sample.
///
/// A range whose bounds are equal always yields that bound. A zero range turns the delay into a
/// bare cooperative yield, keeping the suspension point without consuming time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    pub fn new(min: Duration, max: Duration) -> Result<Self, GenerationError> {
        if max < min {
            return Err(GenerationError::invalid_configuration(format!(
                "delay minimum ({:?}) exceeds delay maximum ({:?})",
                min, max
            )));
        }

        Ok(Self { min, max })
    }

    pub fn from_millis(min_millis: u64, max_millis: u64) -> Result<Self, GenerationError> {
        Self::new(Duration::from_millis(min_millis), Duration::from_millis(max_millis))
    }

    pub const fn none() -> Self {
        Self { min: Duration::ZERO, max: Duration::ZERO }
    }

    /// The slower pacing: `[300ms, 1500ms)`.
    pub const fn slow() -> Self {
        Self {
            min: Duration::from_millis(300),
            max: Duration::from_millis(1500),
        }
    }

    #[inline]
    pub const fn min(&self) -> Duration {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> Duration {
        self.max
    }

    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.max.is_zero()
    }
}

impl Default for DelayRange {
    /// `[50ms, 200ms)`
    fn default() -> Self {
        Self {
            min: Duration::from_millis(50),
            max: Duration::from_millis(200),
        }
    }
}
