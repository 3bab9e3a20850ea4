use either::{Either, Left};
use thiserror::Error;

use super::MetricLabel;
use crate::SharedString;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Cancellation was observed before the step could produce a sample. Sequence drivers treat
    /// this as a normal early end rather than a failure.
    #[error("number generation cancelled")]
    Cancelled,

    #[error("invalid generation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("sample value {0} is outside of the [0, 10) sample range")]
    SampleOutOfRange(u8),

    #[error("random source exhausted at generation step {step}")]
    Exhausted { step: usize },
}

impl GenerationError {
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

impl MetricLabel for GenerationError {
    fn slug(&self) -> SharedString {
        "generation".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::Cancelled => Left("cancelled".into()),
            Self::InvalidConfiguration(_) => Left("invalid_configuration".into()),
            Self::SampleOutOfRange(_) => Left("sample_out_of_range".into()),
            Self::Exhausted { .. } => Left("exhausted".into()),
        }
    }
}
