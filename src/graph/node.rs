use tokio::task::JoinHandle;
use tracing::Instrument;

use super::stage::Stage;
use crate::{NumflowResult, SharedString};

#[derive(Debug)]
pub struct Node {
    pub name: SharedString,
    stage: Box<dyn Stage>,
}

impl Node {
    pub fn new(stage: Box<dyn Stage>) -> Self {
        let name = stage.name();
        Self { name, stage }
    }
}

impl Node {
    #[tracing::instrument(level = "info", skip(self), fields(node=%self.name))]
    pub async fn check(&self) -> NumflowResult<()> {
        self.stage.check().await
    }

    #[tracing::instrument(
        level="info",
        name="run node",
        skip(self),
        fields(node=%self.name),
    )]
    pub fn run(mut self) -> JoinHandle<NumflowResult<()>> {
        tokio::spawn(
            async move {
                let run_result = self.stage.run().instrument(tracing::info_span!("run graph node")).await;
                if let Err(err) = &run_result {
                    tracing::error!(error=?err, "node run failed.");
                    super::track_errors(self.name.as_ref(), err);
                }

                let close_result = self
                    .stage
                    .close()
                    .instrument(tracing::info_span!("close graph node"))
                    .await;
                if let Err(err) = &close_result {
                    tracing::error!(error=?err, "node close failed.");
                    super::track_errors(self.name.as_ref(), err);
                }

                run_result.and(close_result)
            }
            .instrument(tracing::info_span!("spawn-run-graph-node")),
        )
    }
}
