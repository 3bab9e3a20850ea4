use prometheus::Registry;

use crate::elements::SAMPLES_GENERATED;
use crate::error::NumflowError;
use crate::flow::SEQUENCES_CANCELLED;
use crate::graph;

#[tracing::instrument(level = "info", skip(registry))]
pub fn register_numflow_metrics(registry: &Registry) -> Result<(), NumflowError> {
    registry.register(Box::new(graph::GRAPH_ERRORS.clone()))?;
    registry.register(Box::new(graph::STAGE_INGRESS_COUNTS.clone()))?;
    registry.register(Box::new(graph::STAGE_EGRESS_COUNTS.clone()))?;
    registry.register(Box::new(SAMPLES_GENERATED.clone()))?;
    registry.register(Box::new(SEQUENCES_CANCELLED.clone()))?;
    Ok(())
}
