use either::{Either, Left, Right};
use thiserror::Error;

use super::{GenerationError, MetricLabel};
use crate::SharedString;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] config::ConfigError),

    #[error("{0}")]
    Generation(#[from] GenerationError),

    #[error("unrecognized environment: {0}")]
    Environment(String),
}

impl MetricLabel for SettingsError {
    fn slug(&self) -> SharedString {
        "settings".into()
    }

    fn next(&self) -> Either<SharedString, Box<&dyn MetricLabel>> {
        match self {
            Self::Configuration(_) => Left("configuration".into()),
            Self::Generation(e) => Right(Box::new(e)),
            Self::Environment(_) => Left("environment".into()),
        }
    }
}
