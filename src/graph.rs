mod node;
mod port;
mod shape;
pub mod stage;

use std::collections::VecDeque;
use std::fmt;

use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};
use tracing::Instrument;

use self::node::Node;
pub use self::port::{connect_out_to_in, Connect};
pub use self::port::{Inlet, Outlet, Port, PORT_DATA};
pub use self::port::{STAGE_EGRESS_COUNTS, STAGE_INGRESS_COUNTS};
pub use self::shape::*;
use self::stage::Stage;
use crate::error::{GraphError, MetricLabel, NumflowError};
use crate::NumflowResult;

pub static GRAPH_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("numflow_graph_errors", "Number of errors occurring in graph processing"),
        &["stage", "error_type"],
    )
    .expect("failed creating numflow_graph_errors metric")
});

#[inline]
pub fn track_errors(stage: &str, error: &NumflowError) {
    GRAPH_ERRORS.with_label_values(&[stage, error.label().as_ref()]).inc()
}

/// A Graph represents a runnable push-mode processing graph.
///
/// A Graph has one or more `Source` nodes, zero or more `Through` nodes and one or more `Sink`
/// nodes, each connected to the next via their `Outlet` and `Inlet` ports. Running the graph
/// spawns a task per node (via `tokio::spawn`); nodes run until their sources complete, and
/// completion flows downstream as each stage closes its outlet.
///
/// # Examples
///
/// ```
/// use futures::stream;
/// use numflow::error::GenerationError;
/// use numflow::graph::stage::{self, Stage};
/// use numflow::graph::{Connect, Graph, SinkShape, SourceShape};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let data = stream::iter((1..=5).map(Ok::<i32, GenerationError>));
///     let source = stage::StreamSource::new("my_data", data);
///     let odd = stage::Filter::new("odd values", |x: &i32| x % 2 == 1);
///     let mut sum = stage::Fold::new("sum", 0, |acc, x: i32| acc + x);
///     let rx_sum = sum.take_final_rx().unwrap();
///
///     (source.outlet(), odd.inlet()).connect().await;
///     (odd.outlet(), sum.inlet()).connect().await;
///
///     let mut g = Graph::default();
///     g.push_back(Box::new(source)).await;
///     g.push_back(Box::new(odd)).await;
///     g.push_back(Box::new(sum)).await;
///     g.run().await?;
///
///     assert_eq!(rx_sum.await?, 9);
///     Ok(())
/// }
/// ```
#[derive(Default, fmt::Debug)]
pub struct Graph {
    nodes: VecDeque<Node>,
}

impl Graph {
    pub async fn push_front(&mut self, stage: Box<dyn Stage>) {
        let node = Node::new(stage);
        self.nodes.push_front(node);
    }

    pub async fn push_back(&mut self, stage: Box<dyn Stage>) {
        let node = Node::new(stage);
        self.nodes.push_back(node);
    }

    fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_ref()).collect()
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn check(&self) -> NumflowResult<()> {
        tracing::info!(nodes=?self.node_names(), "checking graph nodes.");
        for node in self.nodes.iter() {
            node.check().await?;
        }
        Ok(())
    }

    #[tracing::instrument(level = "info", skip(self))]
    pub async fn run(self) -> NumflowResult<()> {
        self.check().await?;

        let tasks = self.nodes.into_iter().map(|node| node.run()).collect::<Vec<_>>();

        let results: Vec<NumflowResult<()>> = futures::future::try_join_all(tasks)
            .instrument(tracing::info_span!("graph_run_join_all"))
            .await
            .map_err(GraphError::Join)?;

        first_root_cause(results)
    }
}

/// Picks the error that caused the run to fail. A stage failing closes its inlet, so upstream
/// stages then fail on send; those disconnects are only reported when nothing else failed.
fn first_root_cause(results: Vec<NumflowResult<()>>) -> NumflowResult<()> {
    let mut disconnect = None;
    for result in results {
        match result {
            Ok(()) => (),
            Err(err) if err.is_port_disconnect() => {
                disconnect.get_or_insert(err);
            },
            Err(err) => return Err(err),
        }
    }

    match disconnect {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use claim::*;
    use pretty_assertions::assert_eq;
    use prometheus::Registry;

    use super::*;
    use crate::error::{GenerationError, GraphError, PipelineError, PortError, StageError};
    use crate::graph::stage::{Filter, Foreach, StreamSource};

    #[tokio::test]
    async fn test_failing_sink_reports_its_own_error() {
        let data = futures::stream::iter((0..50_u8).map(Ok::<u8, GenerationError>));
        let source = StreamSource::new("numbers", data);
        let all = Filter::new("all", |_: &u8| true);
        let sink = Foreach::new("failing_write", |_: u8| Err(PipelineError::Action(anyhow::anyhow!("write failed"))));

        (source.outlet(), all.inlet()).connect().await;
        (all.outlet(), sink.inlet()).connect().await;

        let mut g = Graph::default();
        g.push_back(Box::new(all)).await;
        g.push_back(Box::new(sink)).await;
        g.push_front(Box::new(source)).await;

        let err = assert_err!(g.run().await);
        assert!(!err.is_port_disconnect());
        assert!(matches!(
            err,
            NumflowError::Graph(GraphError::Stage(StageError::Pipeline(PipelineError::Action(_))))
        ));
        assert_eq!(err.label(), "numflow::graph::stage::pipeline::action");
    }

    #[test]
    fn test_root_cause_prefers_non_disconnect_errors() {
        let results: Vec<NumflowResult<()>> = vec![
            Err(PortError::Channel(anyhow::anyhow!("channel closed")).into()),
            Ok(()),
            Err(GenerationError::Exhausted { step: 3 }.into()),
        ];
        let err = assert_err!(first_root_cause(results));
        assert!(matches!(err, NumflowError::Generation(GenerationError::Exhausted { step: 3 })));

        let only_disconnect: Vec<NumflowResult<()>> =
            vec![Ok(()), Err(PortError::Channel(anyhow::anyhow!("channel closed")).into())];
        assert!(assert_err!(first_root_cause(only_disconnect)).is_port_disconnect());
        assert_ok!(first_root_cause(vec![Ok(()), Ok(())]));
    }

    #[test]
    fn test_track_error_metric() {
        let registry_name = "test_track_error_metric";
        let registry = assert_ok!(Registry::new_custom(Some(registry_name.to_string()), None));
        assert_ok!(registry.register(Box::new(GRAPH_ERRORS.clone())));
        track_errors("foo", &PortError::Detached("detached foo".to_string()).into());
        track_errors("foo", &GenerationError::Cancelled.into());
        track_errors("bar", &PipelineError::Action(anyhow::anyhow!("bad smell")).into());

        let metric_family = registry.gather();
        assert_eq!(metric_family.len(), 1);
        assert_eq!(
            metric_family[0].get_name(),
            &format!("{}_{}", registry_name, "numflow_graph_errors")
        );
        let metrics = metric_family[0].get_metric();
        assert_eq!(metrics.len(), 3);
        let mut error_types: Vec<&str> = metrics
            .iter()
            .flat_map(|m| {
                m.get_label()
                    .iter()
                    .filter(|l| l.get_name() == "error_type")
                    .map(|l| l.get_value())
            })
            .collect();
        error_types.sort_unstable();
        assert_eq!(
            error_types,
            vec![
                "numflow::generation::cancelled",
                "numflow::graph::port::detached",
                "numflow::pipeline::action",
            ]
        );
    }
}
