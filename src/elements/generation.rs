use std::convert::TryFrom;

use super::DelayRange;
use crate::error::GenerationError;
use crate::settings::GenerationSettings;

/// How many samples to attempt and how long each simulated step takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    count: usize,
    delay: DelayRange,
}

impl GenerationRequest {
    pub const fn new(count: usize, delay: DelayRange) -> Self {
        Self { count, delay }
    }

    #[inline]
    pub const fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub const fn delay(&self) -> DelayRange {
        self.delay
    }

    pub fn with_delay(self, delay: DelayRange) -> Self {
        Self { delay, ..self }
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self::new(10, DelayRange::default())
    }
}

impl TryFrom<&GenerationSettings> for GenerationRequest {
    type Error = GenerationError;

    fn try_from(settings: &GenerationSettings) -> Result<Self, Self::Error> {
        let count = usize::try_from(settings.count).map_err(|_| {
            GenerationError::invalid_configuration(format!("sample count must not be negative: {}", settings.count))
        })?;

        let min = non_negative_millis("min_delay_ms", settings.min_delay_ms)?;
        let max = non_negative_millis("max_delay_ms", settings.max_delay_ms)?;
        let delay = DelayRange::from_millis(min, max)?;
        Ok(Self::new(count, delay))
    }
}

fn non_negative_millis(field: &str, millis: i64) -> Result<u64, GenerationError> {
    u64::try_from(millis)
        .map_err(|_| GenerationError::invalid_configuration(format!("{} must not be negative: {}", field, millis)))
}
