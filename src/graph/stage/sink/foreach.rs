use std::fmt;

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::{PipelineError, StageError};
use crate::graph::shape::{Shape, SinkShape};
use crate::graph::{Inlet, Port, Stage, PORT_DATA};
use crate::{AppData, NumflowResult, SharedString};

/// A Sink that will invoke the given procedure for each received element.
///
/// Once the inlet is depleted the sink signals completion exactly once, sending the number of
/// elements it processed to its completion receiver. A failing procedure fails the stage without
/// signaling completion.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use numflow::graph::stage::{self, Stage};
/// use numflow::graph::{Connect, Outlet, Port, SinkShape, PORT_DATA};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let actual = Arc::new(Mutex::new(Vec::<i32>::new()));
///
///     let fe_actual = actual.clone();
///     let mut foreach = stage::Foreach::new("collect", move |x: i32| {
///         fe_actual.lock().unwrap().push(x * 2);
///         Ok(())
///     });
///     let rx_done = foreach.take_completion_rx().unwrap();
///
///     let mut source = Outlet::new("source", PORT_DATA);
///     (&source, &foreach.inlet()).connect().await;
///
///     let sink_handle = tokio::spawn(async move { foreach.run().await });
///     for x in vec![1, 2, 3] {
///         source.send(x).await?;
///     }
///     source.close().await;
///
///     sink_handle.await??;
///     assert_eq!(rx_done.await?, 3);
///     assert_eq!(*actual.lock().unwrap(), vec![2, 4, 6]);
///     Ok(())
/// }
/// ```
pub struct Foreach<F, In> {
    name: SharedString,
    operation: F,
    inlet: Inlet<In>,
    tx_complete: Option<oneshot::Sender<usize>>,
    rx_complete: Option<oneshot::Receiver<usize>>,
}

impl<F, In> Foreach<F, In>
where
    F: FnMut(In) -> Result<(), PipelineError> + Send + Sync + 'static,
    In: AppData,
{
    pub fn new<S: Into<SharedString>>(name: S, operation: F) -> Self {
        let name = name.into();
        let inlet = Inlet::new(name.clone(), PORT_DATA);
        let (tx_complete, rx_complete) = oneshot::channel();
        Self {
            name,
            operation,
            inlet,
            tx_complete: Some(tx_complete),
            rx_complete: Some(rx_complete),
        }
    }

    #[inline]
    pub fn take_completion_rx(&mut self) -> Option<oneshot::Receiver<usize>> {
        self.rx_complete.take()
    }
}

impl<F, In> Shape for Foreach<F, In> {}

impl<F, In: AppData> SinkShape for Foreach<F, In> {
    type In = In;

    #[inline]
    fn inlet(&self) -> Inlet<Self::In> {
        self.inlet.clone()
    }
}

#[async_trait]
impl<F, In> Stage for Foreach<F, In>
where
    F: FnMut(In) -> Result<(), PipelineError> + Send + Sync + 'static,
    In: AppData,
{
    #[inline]
    fn name(&self) -> SharedString {
        self.name.clone()
    }

    #[tracing::instrument(level = "info", skip(self))]
    async fn check(&self) -> NumflowResult<()> {
        self.inlet.check_attachment().await?;
        Ok(())
    }

    #[tracing::instrument(level = "info", name = "run foreach sink", skip(self), fields(name=%self.name))]
    async fn run(&mut self) -> NumflowResult<()> {
        let mut processed = 0_usize;
        while let Some(input) = self.inlet.recv().await {
            (self.operation)(input).map_err(StageError::Pipeline)?;
            processed += 1;
        }

        if let Some(tx) = self.tx_complete.take() {
            tracing::debug!(%processed, "foreach sink completed.");
            if tx.send(processed).is_err() {
                tracing::trace!("foreach completion receiver dropped.");
            }
        }

        Ok(())
    }

    async fn close(mut self: Box<Self>) -> NumflowResult<()> {
        tracing::trace!("closing foreach-sink inlet.");
        self.inlet.close().await;
        Ok(())
    }
}

impl<F, In> fmt::Debug for Foreach<F, In> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Foreach")
            .field("name", &self.name)
            .field("inlet", &self.inlet)
            .finish()
    }
}
