use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{DelayRange, NumberSample};
use crate::error::GenerationError;

/// Random draws backing a [`NumberSource`](super::NumberSource).
///
/// Each generation step draws its delay first and its value second.
pub trait Randomness: Send {
    fn draw_delay(&mut self, range: &DelayRange) -> Duration;
    fn draw_sample(&mut self, step: usize) -> Result<NumberSample, GenerationError>;
}

/// Uniform draws from a standard RNG, either seeded for reproducible runs or seeded from system
/// entropy.
pub struct SeededRandomness {
    seed: Option<u64>,
    rng: StdRng,
}

impl SeededRandomness {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), rng: StdRng::seed_from_u64(seed) }
    }

    pub fn from_entropy() -> Self {
        Self { seed: None, rng: StdRng::from_entropy() }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Randomness for SeededRandomness {
    fn draw_delay(&mut self, range: &DelayRange) -> Duration {
        if range.is_fixed() {
            range.min()
        } else {
            self.rng.gen_range(range.min()..range.max())
        }
    }

    fn draw_sample(&mut self, _step: usize) -> Result<NumberSample, GenerationError> {
        NumberSample::new(self.rng.gen_range(0..NumberSample::UPPER_BOUND))
    }
}

impl fmt::Debug for SeededRandomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandomness").field("seed", &self.seed).finish()
    }
}

/// Replays a fixed script of sample values, always using the minimum delay of the range.
///
/// Drawing past the end of the script fails the step with [`GenerationError::Exhausted`].
#[derive(Debug, Clone)]
pub struct ScriptedRandomness {
    script: VecDeque<NumberSample>,
}

impl ScriptedRandomness {
    pub fn new<I>(values: I) -> Result<Self, GenerationError>
    where
        I: IntoIterator<Item = u8>,
    {
        let script = values
            .into_iter()
            .map(NumberSample::new)
            .collect::<Result<VecDeque<_>, _>>()?;
        Ok(Self { script })
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Randomness for ScriptedRandomness {
    fn draw_delay(&mut self, range: &DelayRange) -> Duration {
        range.min()
    }

    fn draw_sample(&mut self, step: usize) -> Result<NumberSample, GenerationError> {
        self.script.pop_front().ok_or(GenerationError::Exhausted { step })
    }
}
