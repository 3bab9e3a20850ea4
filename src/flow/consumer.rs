use std::fmt;

use futures::stream::{Stream, StreamExt};

use super::Subscriber;
use crate::elements::NumberSample;
use crate::error::PipelineError;

/// The default predicate: keep odd samples.
#[inline]
pub fn is_odd(sample: &NumberSample) -> bool {
    sample.is_odd()
}

/// Terminal step of a consumer pipeline, applied to each item that passes the predicate.
pub trait Action<T>: Send {
    fn act(&mut self, item: T) -> Result<(), PipelineError>;

    /// Invoked once after the last item.
    fn complete(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

impl<T, F> Action<T> for F
where
    F: FnMut(T) -> anyhow::Result<()> + Send,
{
    fn act(&mut self, item: T) -> Result<(), PipelineError> {
        self(item).map_err(PipelineError::Action)
    }
}

/// Counts of what a pipeline saw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub observed: usize,
    pub passed: usize,
    pub completed: bool,
}

/// Predicate filter plus terminal action. Used directly as a push-mode [`Subscriber`] or driven
/// by pull iteration through [`consume`].
pub struct Pipeline<P, A> {
    predicate: P,
    action: A,
    outcome: Outcome,
}

impl<P, A> Pipeline<P, A> {
    pub fn new(predicate: P, action: A) -> Self {
        Self { predicate, action, outcome: Outcome::default() }
    }

    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn into_action(self) -> A {
        self.action
    }
}

impl<T, P, A> Subscriber<T> for Pipeline<P, A>
where
    P: FnMut(&T) -> bool + Send,
    A: Action<T>,
{
    fn on_next(&mut self, item: T) -> Result<(), PipelineError> {
        self.outcome.observed += 1;
        if (self.predicate)(&item) {
            self.outcome.passed += 1;
            self.action.act(item)?;
        }
        Ok(())
    }

    fn on_completed(&mut self) -> Result<(), PipelineError> {
        self.action.complete()?;
        self.outcome.completed = true;
        Ok(())
    }
}

impl<P, A> fmt::Debug for Pipeline<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline").field("outcome", &self.outcome).finish()
    }
}

/// Pull-mode consumption: iterates the sequence in order, acting on each item passing the
/// predicate, and completes the action once the sequence ends. The first failed item or action
/// aborts the run.
#[tracing::instrument(level = "debug", name = "consume sequence", skip(sequence, predicate, action))]
pub async fn consume<St, T, E, P, A>(sequence: St, predicate: P, action: A) -> Result<Outcome, PipelineError>
where
    St: Stream<Item = Result<T, E>>,
    E: Into<PipelineError>,
    P: FnMut(&T) -> bool + Send,
    A: Action<T>,
{
    let mut pipeline = Pipeline::new(predicate, action);
    tokio::pin!(sequence);

    while let Some(item) = sequence.next().await {
        pipeline.on_next(item.map_err(Into::into)?)?;
    }

    pipeline.on_completed()?;
    let outcome = pipeline.outcome();
    tracing::debug!(?outcome, "sequence consumed");
    Ok(outcome)
}
