use std::fmt;

use async_trait::async_trait;

use crate::graph::shape::{Shape, SinkShape, SourceShape, ThroughShape};
use crate::graph::{Inlet, Outlet, Port, Stage, PORT_DATA};
use crate::{AppData, NumflowResult, SharedString};

/// Filter the incoming elements using a predicate, passing matching items downstream in the order
/// they arrive.
///
/// # Examples
///
/// ```rust
/// use tokio::sync::mpsc;
/// use numflow::graph::{Connect, Outlet, PORT_DATA};
/// use numflow::graph::stage::{self, Stage};
/// use numflow::graph::{SinkShape, SourceShape};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut source = Outlet::new("source", PORT_DATA);
///     let mut filter = stage::Filter::new("even values", |x: &i32| x % 2 == 0);
///     let mut fold = stage::Fold::new("sum even values", 0, |acc, x: i32| acc + x);
///     let rx_sum = fold.take_final_rx().unwrap();
///
///     (&source, &filter.inlet()).connect().await;
///     (filter.outlet(), fold.inlet()).connect().await;
///
///     let filter_handle = tokio::spawn(async move { filter.run().await?; Box::new(filter).close().await });
///     let fold_handle = tokio::spawn(async move { fold.run().await });
///
///     for x in 1..=10 {
///         source.send(x).await?;
///     }
///     numflow::graph::Port::close(&mut source).await;
///
///     filter_handle.await??;
///     fold_handle.await??;
///     assert_eq!(rx_sum.await?, 30);
///     Ok(())
/// }
/// ```
pub struct Filter<P, T> {
    name: SharedString,
    predicate: P,
    inlet: Inlet<T>,
    outlet: Outlet<T>,
    log_blocks: bool,
}

impl<P, T> Filter<P, T>
where
    P: FnMut(&T) -> bool + Send + Sync + 'static,
    T: AppData,
{
    pub fn new<S: Into<SharedString>>(name: S, predicate: P) -> Self {
        let name = name.into();
        let inlet = Inlet::new(name.clone(), PORT_DATA);
        let outlet = Outlet::new(name.clone(), PORT_DATA);
        Self {
            name,
            predicate,
            inlet,
            outlet,
            log_blocks: false,
        }
    }

    pub fn with_block_logging(self) -> Self {
        Self { log_blocks: true, ..self }
    }
}

impl<P, T> Shape for Filter<P, T> {}

impl<P, T: AppData> ThroughShape for Filter<P, T> {}

impl<P, T: AppData> SourceShape for Filter<P, T> {
    type Out = T;

    #[inline]
    fn outlet(&self) -> Outlet<Self::Out> {
        self.outlet.clone()
    }
}

impl<P, T: AppData> SinkShape for Filter<P, T> {
    type In = T;

    #[inline]
    fn inlet(&self) -> Inlet<Self::In> {
        self.inlet.clone()
    }
}

#[async_trait]
impl<P, T> Stage for Filter<P, T>
where
    P: FnMut(&T) -> bool + Send + Sync + 'static,
    T: AppData,
{
    #[inline]
    fn name(&self) -> SharedString {
        self.name.clone()
    }

    #[tracing::instrument(level = "info", skip(self))]
    async fn check(&self) -> NumflowResult<()> {
        self.inlet.check_attachment().await?;
        self.outlet.check_attachment().await?;
        Ok(())
    }

    #[tracing::instrument(level = "info", name = "run filter through", skip(self), fields(name=%self.name))]
    async fn run(&mut self) -> NumflowResult<()> {
        let outlet = &self.outlet;
        while let Some(item) = self.inlet.recv().await {
            if (self.predicate)(&item) {
                tracing::trace!(?item, "filter passing item.");
                outlet.send(item).await?;
            } else if self.log_blocks {
                tracing::info!(?item, "filter blocking item.");
            }
        }

        Ok(())
    }

    async fn close(mut self: Box<Self>) -> NumflowResult<()> {
        tracing::trace!("closing filter-through ports.");
        self.inlet.close().await;
        self.outlet.close().await;
        Ok(())
    }
}

impl<P, T> fmt::Debug for Filter<P, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .field("inlet", &self.inlet)
            .field("outlet", &self.outlet)
            .finish()
    }
}

/////////////////////////////////////////////////////
// Unit Tests ///////////////////////////////////////
