use either::{Either, Left, Right};
use thiserror::Error;

use super::{MetricLabel, PipelineError, PortError};
use crate::SharedString;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("failure while materializing graph stage value: {0}")]
    Materialization(String),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Port(#[from] PortError),
}

impl MetricLabel for StageError {
    fn slug(&self) -> SharedString {
        "stage".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::Materialization(_) => Left("materialization".into()),
            Self::Pipeline(e) => Right(Box::new(e)),
            Self::Port(e) => Right(Box::new(e)),
        }
    }
}
