use std::fmt;
use std::pin::Pin;

use async_stream::stream;
use futures::stream::Stream;
use once_cell::sync::Lazy;
use prometheus::{IntCounter, Opts};
use tokio::task::JoinHandle;

use super::{bridge, Subscriber};
use crate::elements::{
    CancellationSignal, GenerationRequest, NumberSample, NumberSource, Randomness, SeededRandomness,
};
use crate::error::{GenerationError, PipelineError};

pub static SEQUENCES_CANCELLED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new(
        "numflow_sequences_cancelled",
        "Number of number sequences ended early by cancellation",
    ))
    .expect("failed creating numflow_sequences_cancelled metric")
});

/// Lazily generated, finite sequence of samples. Cancellation ends the stream without an error
/// item; a failed generation step is yielded as a single `Err` item and ends the stream.
pub type SampleStream = Pin<Box<dyn Stream<Item = Result<NumberSample, GenerationError>> + Send>>;

/// Drives a [`NumberSource`] for a fixed number of steps.
///
/// A sequence is consumed by exactly one activation, pull or push, and cannot be restarted. Both
/// activations run the same generator so they observe identical values in identical order for
/// the same randomness.
///
/// # Examples
///
/// ```
/// use futures::StreamExt;
/// use numflow::elements::{CancellationSignal, DelayRange, GenerationRequest, ScriptedRandomness};
/// use numflow::flow::NumberSequence;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let request = GenerationRequest::new(3, DelayRange::none());
///     let randomness = ScriptedRandomness::new(vec![3, 4, 7])?;
///     let sequence = NumberSequence::new(request, randomness, CancellationSignal::new());
///
///     let mut samples = sequence.into_stream();
///     let mut actual = Vec::new();
///     while let Some(sample) = samples.next().await {
///         actual.push(sample?.value());
///     }
///
///     assert_eq!(actual, vec![3, 4, 7]);
///     Ok(())
/// }
/// ```
pub struct NumberSequence<R = SeededRandomness> {
    count: usize,
    source: NumberSource<R>,
    signal: CancellationSignal,
}

impl<R> NumberSequence<R>
where
    R: Randomness + 'static,
{
    pub fn new(request: GenerationRequest, randomness: R, signal: CancellationSignal) -> Self {
        Self::from_source(request.count(), NumberSource::new(request.delay(), randomness), signal)
    }

    pub fn from_source(count: usize, source: NumberSource<R>, signal: CancellationSignal) -> Self {
        Self { count, source, signal }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn signal(&self) -> &CancellationSignal {
        &self.signal
    }

    /// Pull activation: each poll of the stream suspends until the next sample is ready or the
    /// sequence ends.
    pub fn into_stream(self) -> SampleStream {
        let Self { count, mut source, signal } = self;

        Box::pin(stream! {
            for step in 0..count {
                match source.next(&signal).await {
                    Ok(sample) => {
                        tracing::trace!(%step, %sample, "yielding sample");
                        yield Ok(sample);
                    },

                    Err(GenerationError::Cancelled) => {
                        SEQUENCES_CANCELLED.inc();
                        tracing::info!(%step, %count, "cancellation observed - ending sequence early");
                        break;
                    },

                    Err(err) => {
                        tracing::error!(error=?err, %step, "generation step failed - ending sequence");
                        yield Err(err);
                        break;
                    },
                }
            }

            tracing::debug!(produced=%source.steps(), %count, "number sequence finished");
        })
    }

    /// Push activation driven from the calling task. The subscriber sees every sample as it
    /// becomes ready, followed by a single completion.
    pub async fn subscribe<S>(self, subscriber: S) -> Result<S, PipelineError>
    where
        S: Subscriber<NumberSample>,
    {
        bridge(self.into_stream()).subscribe(subscriber).await
    }

    /// Push activation on its own task, running to completion or cancellation independently of
    /// the caller.
    pub fn spawn<S>(self, subscriber: S) -> JoinHandle<Result<S, PipelineError>>
    where
        S: Subscriber<NumberSample> + 'static,
    {
        bridge(self.into_stream()).spawn(subscriber)
    }
}

impl<R> fmt::Debug for NumberSequence<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberSequence")
            .field("count", &self.count)
            .field("source", &self.source)
            .field("signal", &self.signal)
            .finish()
    }
}
