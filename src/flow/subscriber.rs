use crate::error::PipelineError;

/// Push-mode consumer of a sequence.
///
/// `on_next` is invoked once per item in emission order. `on_completed` is invoked exactly once
/// after the last item, whether the sequence ran out or was cancelled. An error returned from
/// either callback ends the subscription and is reported to whoever drives it; `on_completed` is
/// not called for a failed subscription.
pub trait Subscriber<T>: Send {
    fn on_next(&mut self, item: T) -> Result<(), PipelineError>;

    fn on_completed(&mut self) -> Result<(), PipelineError> {
        Ok(())
    }
}

impl<T, S> Subscriber<T> for Box<S>
where
    S: Subscriber<T> + ?Sized,
{
    fn on_next(&mut self, item: T) -> Result<(), PipelineError> {
        (**self).on_next(item)
    }

    fn on_completed(&mut self) -> Result<(), PipelineError> {
        (**self).on_completed()
    }
}
