use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};

use crate::error::{PipelineError, StageError};
use crate::graph::shape::{Shape, SourceShape};
use crate::graph::{Outlet, Port, Stage, PORT_DATA};
use crate::{AppData, NumflowResult, SharedString};

/// Bridges a pull-mode stream into a push-mode graph source.
///
/// When run, the source pulls each item from the stream and pushes it through its outlet,
/// preserving stream order. The source completes when the stream ends; an `Err` item fails the
/// stage, which in turn fails the graph run.
///
/// # Examples
///
/// ```
/// use futures::stream;
/// use numflow::error::GenerationError;
/// use numflow::graph::stage::{self, Stage};
/// use numflow::graph::{Connect, SinkShape, SourceShape};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let data = stream::iter(vec![Ok::<_, GenerationError>("I am serious."), Ok("And don't call me"), Ok("Shirley!")]);
///     let mut src = stage::StreamSource::new("quote", data);
///     let mut sink = stage::Fold::new("concatenate", String::new(), |acc: String, s: &'static str| {
///         let result = if !acc.is_empty() { acc + " " } else { acc };
///         result + s
///     });
///     let rx_quote = sink.take_final_rx().unwrap();
///
///     (src.outlet(), sink.inlet()).connect().await;
///
///     let sink_handle = tokio::spawn(async move { sink.run().await });
///     src.run().await?;
///     Box::new(src).close().await?;
///     sink_handle.await??;
///
///     assert_eq!(rx_quote.await?, "I am serious. And don't call me Shirley!");
///     Ok(())
/// }
/// ```
pub struct StreamSource<St, T> {
    name: SharedString,
    stream: Mutex<Option<St>>,
    outlet: Outlet<T>,
}

impl<St, T> StreamSource<St, T> {
    pub fn new<S>(name: S, stream: St) -> Self
    where
        S: Into<SharedString>,
    {
        let name = name.into();
        let outlet = Outlet::new(name.clone(), PORT_DATA);
        Self { name, stream: Mutex::new(Some(stream)), outlet }
    }
}

impl<St, T> Shape for StreamSource<St, T> {}

impl<St, T: AppData> SourceShape for StreamSource<St, T> {
    type Out = T;

    #[inline]
    fn outlet(&self) -> Outlet<Self::Out> {
        self.outlet.clone()
    }
}

#[async_trait]
impl<St, T, E> Stage for StreamSource<St, T>
where
    St: Stream<Item = Result<T, E>> + Send + 'static,
    T: AppData,
    E: Into<PipelineError> + Send + 'static,
{
    #[inline]
    fn name(&self) -> SharedString {
        self.name.clone()
    }

    #[tracing::instrument(level = "info", skip(self))]
    async fn check(&self) -> NumflowResult<()> {
        self.outlet.check_attachment().await?;
        Ok(())
    }

    #[tracing::instrument(level = "info", name = "run stream source", skip(self), fields(name=%self.name))]
    async fn run(&mut self) -> NumflowResult<()> {
        let stream = self
            .stream
            .get_mut()
            .map_err(|err| StageError::Materialization(err.to_string()))?
            .take()
            .ok_or_else(|| StageError::Materialization(format!("{} stream already consumed", self.name)))?;
        tokio::pin!(stream);

        let mut sent = 0_usize;
        while let Some(item) = stream.next().await {
            match item {
                Ok(item) => {
                    tracing::trace!(?item, "sending item");
                    self.outlet.send(item).await?;
                    sent += 1;
                },

                Err(err) => {
                    let err: PipelineError = err.into();
                    tracing::error!(error=?err, %sent, "stream source failed");
                    return Err(StageError::Pipeline(err).into());
                },
            }
        }

        tracing::debug!(%sent, "stream source depleted");
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> NumflowResult<()> {
        tracing::trace!("closing stream-source outlet.");
        self.outlet.close().await;
        Ok(())
    }
}

impl<St, T> fmt::Debug for StreamSource<St, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSource")
            .field("name", &self.name)
            .field("outlet", &self.outlet)
            .finish()
    }
}

/////////////////////////////////////////////////////
// Unit Tests ///////////////////////////////////////

#[cfg(test)]
mod tests {
    use claim::*;
    use futures::stream;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::{GenerationError, NumflowError};
    use crate::graph::Inlet;

    #[tokio::test]
    async fn test_basic_usage() {
        let my_data = vec![2, 3, 5, 7, 11, 13, 17, 19];
        let data = stream::iter(my_data.clone().into_iter().map(Ok::<_, GenerationError>));
        let mut src = StreamSource::new("my_data", data);

        let (tx, rx) = mpsc::channel(1);
        let mut inlet = Inlet::new("collect", PORT_DATA);
        inlet.attach("test_channel", rx).await;
        src.outlet().attach("collect::data", tx).await;

        let src_handle = tokio::spawn(async move {
            src.run().await?;
            Box::new(src).close().await
        });

        let mut actual = Vec::with_capacity(my_data.len());
        while let Some(d) = inlet.recv().await {
            actual.push(d);
        }

        assert_ok!(src_handle.await.expect("failed to join source"));
        assert_eq!(actual, my_data);
    }

    #[tokio::test]
    async fn test_error_item_fails_stage() {
        let data = stream::iter(vec![Ok(1), Err(GenerationError::Exhausted { step: 1 })]);
        let mut src = StreamSource::new("failing", data);

        let (tx, mut rx) = mpsc::channel(4);
        src.outlet().attach("test_rx", tx).await;

        let err = assert_err!(src.run().await);
        assert!(matches!(
            err,
            NumflowError::Graph(crate::error::GraphError::Stage(StageError::Pipeline(PipelineError::Generation(
                GenerationError::Exhausted { step: 1 }
            ))))
        ));
        assert_eq!(rx.recv().await, Some(1));

        let rerun = assert_err!(src.run().await);
        assert!(matches!(rerun, NumflowError::Graph(_)));
    }
}
