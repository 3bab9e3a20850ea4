use std::fmt;

use futures::stream::{Stream, StreamExt};
use tokio::task::JoinHandle;

use super::Subscriber;
use crate::error::PipelineError;

/// Adapts a pull-mode stream into a push-mode subscription.
///
/// Items are pulled one at a time and handed to the subscriber in the order the stream yields
/// them; nothing is buffered beyond the item in flight. An `Err` item ends the subscription with
/// that error.
///
/// # Examples
///
/// ```
/// use futures::stream;
/// use numflow::error::{GenerationError, PipelineError};
/// use numflow::flow::{bridge, Subscriber};
///
/// #[derive(Default)]
/// struct Collect(Vec<u8>, bool);
///
/// impl Subscriber<u8> for Collect {
///     fn on_next(&mut self, item: u8) -> Result<(), PipelineError> {
///         self.0.push(item);
///         Ok(())
///     }
///
///     fn on_completed(&mut self) -> Result<(), PipelineError> {
///         self.1 = true;
///         Ok(())
///     }
/// }
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let pulled = stream::iter(vec![Ok::<u8, GenerationError>(3), Ok(4), Ok(7)]);
///     let collected = bridge(pulled).subscribe(Collect::default()).await?;
///     assert_eq!(collected.0, vec![3, 4, 7]);
///     assert!(collected.1);
///     Ok(())
/// }
/// ```
pub struct Bridge<St> {
    stream: St,
}

pub fn bridge<St>(stream: St) -> Bridge<St> {
    Bridge { stream }
}

impl<St, T, E> Bridge<St>
where
    St: Stream<Item = Result<T, E>>,
    E: Into<PipelineError>,
{
    #[tracing::instrument(level = "debug", name = "bridge subscription", skip(self, subscriber))]
    pub async fn subscribe<S>(self, mut subscriber: S) -> Result<S, PipelineError>
    where
        S: Subscriber<T>,
    {
        let stream = self.stream;
        tokio::pin!(stream);

        let mut delivered = 0_usize;
        while let Some(item) = stream.next().await {
            let item = item.map_err(Into::into)?;
            subscriber.on_next(item)?;
            delivered += 1;
        }

        tracing::debug!(%delivered, "bridged stream depleted - completing subscriber");
        subscriber.on_completed()?;
        Ok(subscriber)
    }

    /// Runs the subscription on its own task so the producer proceeds independently of the
    /// caller.
    pub fn spawn<S>(self, subscriber: S) -> JoinHandle<Result<S, PipelineError>>
    where
        St: Send + 'static,
        S: Subscriber<T> + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        tokio::spawn(self.subscribe(subscriber))
    }
}

impl<St> fmt::Debug for Bridge<St> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge").finish()
    }
}
