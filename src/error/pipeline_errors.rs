use either::{Either, Left, Right};
use thiserror::Error;

use super::{GenerationError, MetricLabel};
use crate::SharedString;

/// Failures raised while consuming a sequence. Any of these ends the whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("pipeline action failed: {0}")]
    Action(#[source] anyhow::Error),

    #[error("failed to write pipeline output: {0}")]
    Output(#[from] std::io::Error),

    #[error("pipeline output lock poisoned: {0}")]
    Poisoned(String),

    #[error("subscription task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl MetricLabel for PipelineError {
    fn slug(&self) -> SharedString {
        "pipeline".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::Generation(e) => Right(Box::new(e)),
            Self::Action(_) => Left("action".into()),
            Self::Output(_) => Left("output".into()),
            Self::Poisoned(_) => Left("poisoned".into()),
            Self::Join(_) => Left("join".into()),
        }
    }
}
