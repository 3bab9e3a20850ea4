use std::fmt::Debug;

use either::{Either, Left, Right};
use thiserror::Error;

use crate::SharedString;

mod generation_errors;
mod graph_errors;
mod pipeline_errors;
mod port_errors;
mod settings_errors;
mod stage_errors;

pub use generation_errors::GenerationError;
pub use graph_errors::GraphError;
pub use pipeline_errors::PipelineError;
pub use port_errors::PortError;
pub use settings_errors::SettingsError;
pub use stage_errors::StageError;

pub trait MetricLabel {
    fn label(&self) -> SharedString {
        match self.next() {
            Either::Right(n) => format!("{}::{}", self.slug(), n.label()).into(),
            Either::Left(ls) => format!("{}::{}", self.slug(), ls).into(),
        }
    }

    fn slug(&self) -> SharedString;
    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>>;
}

#[derive(Debug, Error)]
pub enum NumflowError {
    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    Graph(#[from] GraphError),

    #[error("{0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Metrics(#[from] prometheus::Error),
}

impl MetricLabel for NumflowError {
    fn slug(&self) -> SharedString {
        "numflow".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::Generation(e) => Right(Box::new(e)),
            Self::Pipeline(e) => Right(Box::new(e)),
            Self::Graph(e) => Right(Box::new(e)),
            Self::Settings(e) => Right(Box::new(e)),
            Self::Metrics(_) => Left("prometheus".into()),
        }
    }
}

impl NumflowError {
    /// True when the error only reflects a downstream stage hanging up its inlet, which happens
    /// after that stage has already failed for its own reason.
    pub fn is_port_disconnect(&self) -> bool {
        matches!(
            self,
            Self::Graph(GraphError::Port(PortError::Channel(_)))
                | Self::Graph(GraphError::Stage(StageError::Port(PortError::Channel(_))))
        )
    }
}

impl From<PortError> for NumflowError {
    fn from(that: PortError) -> Self {
        Self::Graph(that.into())
    }
}

impl From<StageError> for NumflowError {
    fn from(that: StageError) -> Self {
        Self::Graph(that.into())
    }
}
