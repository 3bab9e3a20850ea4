use std::fmt;

use once_cell::sync::Lazy;
use prometheus::{IntCounter, Opts};

use super::{CancellationSignal, DelayRange, NumberSample, Randomness, SeededRandomness};
use crate::error::GenerationError;

pub static SAMPLES_GENERATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new(
        "numflow_samples_generated",
        "Number of samples produced by number sources",
    ))
    .expect("failed creating numflow_samples_generated metric")
});

/// Produces one sample per call after a random simulated delay.
///
/// Cancellation is checked before the delay starts. If cancellation is requested while the
/// delay is pending, the delay is cut short and the step fails with
/// [`GenerationError::Cancelled`] without drawing a value, so no sample is ever produced once
/// cancellation has been observed.
pub struct NumberSource<R = SeededRandomness> {
    delay: DelayRange,
    randomness: R,
    step: usize,
}

impl<R: Randomness> NumberSource<R> {
    pub fn new(delay: DelayRange, randomness: R) -> Self {
        Self { delay, randomness, step: 0 }
    }

    #[inline]
    pub fn delay(&self) -> DelayRange {
        self.delay
    }

    /// Number of completed generation steps.
    #[inline]
    pub fn steps(&self) -> usize {
        self.step
    }

    #[tracing::instrument(level = "trace", skip(self, signal), fields(step=%self.step))]
    pub async fn next(&mut self, signal: &CancellationSignal) -> Result<NumberSample, GenerationError> {
        if signal.is_cancelled() {
            tracing::trace!("cancellation observed before delay");
            return Err(GenerationError::Cancelled);
        }

        let pause = self.randomness.draw_delay(&self.delay);
        if pause.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::select! {
                biased;
                _ = signal.cancelled() => {
                    tracing::trace!(?pause, "cancellation observed during delay");
                    return Err(GenerationError::Cancelled);
                },
                _ = tokio::time::sleep(pause) => (),
            }
        }

        if signal.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let sample = self.randomness.draw_sample(self.step)?;
        self.step += 1;
        SAMPLES_GENERATED.inc();
        tracing::trace!(%sample, ?pause, "sample generated");
        Ok(sample)
    }
}

impl NumberSource<SeededRandomness> {
    pub fn seeded(delay: DelayRange, seed: u64) -> Self {
        Self::new(delay, SeededRandomness::seeded(seed))
    }
}

impl<R> fmt::Debug for NumberSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberSource")
            .field("delay", &self.delay)
            .field("step", &self.step)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use claim::*;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::elements::ScriptedRandomness;

    #[tokio::test]
    async fn test_cancelled_before_delay() {
        let mut source = NumberSource::seeded(DelayRange::default(), 7);
        let signal = CancellationSignal::cancelled_now();
        assert_eq!(source.next(&signal).await, Err(GenerationError::Cancelled));
        assert_eq!(source.steps(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_after_delay() {
        let delay = assert_ok!(DelayRange::from_millis(100, 100));
        let scripted = assert_ok!(ScriptedRandomness::new(vec![5]));
        let mut source = NumberSource::new(delay, scripted);
        let signal = CancellationSignal::new();

        let start = tokio::time::Instant::now();
        let sample = assert_ok!(source.next(&signal).await);
        assert_eq!(sample.value(), 5);
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert_eq!(source.steps(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_pending_delay() {
        let scripted = assert_ok!(ScriptedRandomness::new(vec![1, 2]));
        let mut source = NumberSource::new(DelayRange::slow(), scripted);
        let signal = CancellationSignal::new();

        let canceller = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let start = tokio::time::Instant::now();
        assert_eq!(source.next(&signal).await, Err(GenerationError::Cancelled));
        assert!(start.elapsed() < DelayRange::slow().min());
        assert_eq!(source.steps(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails_step() {
        let scripted = assert_ok!(ScriptedRandomness::new(Vec::<u8>::new()));
        let mut source = NumberSource::new(DelayRange::none(), scripted);
        let signal = CancellationSignal::new();
        assert_eq!(source.next(&signal).await, Err(GenerationError::Exhausted { step: 0 }));
    }
}
