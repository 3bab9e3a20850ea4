use numflow::elements::{CancellationSignal, SeededRandomness};
use numflow::error::PipelineError;
use numflow::flow::Subscriber;
use numflow::NumberSample;

#[allow(dead_code)]
pub fn seeded(seed: u64) -> SeededRandomness {
    SeededRandomness::seeded(seed)
}

/// Subscriber recording every sample and completion, optionally cancelling the run after a
/// number of samples.
#[derive(Debug, Default)]
pub struct Recording {
    pub samples: Vec<u8>,
    pub completions: usize,
    pub cancel_after: Option<(usize, CancellationSignal)>,
}

#[allow(dead_code)]
impl Recording {
    pub fn cancelling_after(count: usize, signal: CancellationSignal) -> Self {
        Self { cancel_after: Some((count, signal)), ..Self::default() }
    }
}

impl Subscriber<NumberSample> for Recording {
    fn on_next(&mut self, item: NumberSample) -> Result<(), PipelineError> {
        self.samples.push(item.value());
        if let Some((after, signal)) = &self.cancel_after {
            if self.samples.len() == *after {
                signal.cancel();
            }
        }
        Ok(())
    }

    fn on_completed(&mut self) -> Result<(), PipelineError> {
        self.completions += 1;
        Ok(())
    }
}
