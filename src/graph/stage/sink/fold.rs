use std::fmt::{self, Debug};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::StageError;
use crate::graph::shape::{Shape, SinkShape};
use crate::graph::{Inlet, Port, Stage, PORT_DATA};
use crate::{AppData, NumflowResult, SharedString};

/// A Sink that will invoke the given function for every received element, giving it its previous
/// output (or the given zero value) and the element as input.
///
/// The Fold sink is created along with a oneshot rx. The final accumulation is sent to the oneshot
/// rx once the inlet is depleted.
pub struct Fold<F, In, Acc> {
    name: SharedString,
    acc: Option<Acc>,
    operation: F,
    inlet: Inlet<In>,
    tx_final: Option<oneshot::Sender<Acc>>,
    rx_final: Option<oneshot::Receiver<Acc>>,
}

impl<F, In, Acc> Fold<F, In, Acc>
where
    F: FnMut(Acc, In) -> Acc + Send + Sync + 'static,
    In: AppData,
    Acc: AppData,
{
    pub fn new<S: Into<SharedString>>(name: S, initial: Acc, operation: F) -> Self {
        let name = name.into();
        let inlet = Inlet::new(name.clone(), PORT_DATA);
        let (tx_final, rx_final) = oneshot::channel();

        Self {
            name,
            acc: Some(initial),
            operation,
            inlet,
            tx_final: Some(tx_final),
            rx_final: Some(rx_final),
        }
    }

    #[inline]
    pub fn take_final_rx(&mut self) -> Option<oneshot::Receiver<Acc>> {
        self.rx_final.take()
    }

    #[tracing::instrument(level = "info", skip(self))]
    fn complete_fold(&mut self) -> Result<(), StageError> {
        if let (Some(tx_final), Some(acc)) = (self.tx_final.take(), self.acc.take()) {
            tx_final.send(acc).map_err(|acc| {
                StageError::Materialization(format!(
                    "Fold sink final receiver detached. Failed to send accumulation: {:?}",
                    acc
                ))
            })?;
        }

        Ok(())
    }
}

impl<F, In, Acc: Debug> Shape for Fold<F, In, Acc> {}

impl<F, In: AppData, Acc: Debug> SinkShape for Fold<F, In, Acc> {
    type In = In;

    #[inline]
    fn inlet(&self) -> Inlet<Self::In> {
        self.inlet.clone()
    }
}

#[async_trait]
impl<F, In, Acc> Stage for Fold<F, In, Acc>
where
    F: FnMut(Acc, In) -> Acc + Send + Sync + 'static,
    In: AppData,
    Acc: AppData,
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

    #[tracing::instrument(level = "info", name = "run fold sink", skip(self), fields(name=%self.name))]
    async fn run(&mut self) -> NumflowResult<()> {
        while let Some(input) = self.inlet.recv().await {
            if let Some(acc) = self.acc.take() {
                tracing::trace!(?input, before_acc=?acc, "folding input");
                self.acc = Some((self.operation)(acc, input));
            }
        }

        tracing::trace!(final_acc=?self.acc, "Fold inlet depleted -- completing.");
        self.complete_fold()?;
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> NumflowResult<()> {
        tracing::trace!("closing fold-sink inlet.");
        self.inlet.close().await;
        self.complete_fold()?;
        Ok(())
    }
}

impl<F, In, Acc: Debug> fmt::Debug for Fold<F, In, Acc> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fold")
            .field("name", &self.name)
            .field("acc", &self.acc)
            .field("inlet", &self.inlet)
            .finish()
    }
}
