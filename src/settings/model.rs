use std::convert::TryFrom;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::elements::GenerationRequest;
use crate::error::GenerationError;
use crate::flow::Variant;

pub const DEFAULT_COUNT: i64 = 10;
pub const DEFAULT_MIN_DELAY_MS: i64 = 50;
pub const DEFAULT_MAX_DELAY_MS: i64 = 200;
pub const SLOW_MIN_DELAY_MS: i64 = 300;
pub const SLOW_MAX_DELAY_MS: i64 = 1500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generation: GenerationSettings,

    pub variants: Vec<Variant>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            variants: Variant::all(),
            timeout_ms: None,
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Validates the generation settings; invalid settings are reported before any run starts.
    pub fn generation_request(&self) -> Result<GenerationRequest, GenerationError> {
        GenerationRequest::try_from(&self.generation)
    }
}

/// Raw generation settings. Values are signed so out-of-range configuration can be reported as
/// invalid rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub count: i64,
    pub min_delay_ms: i64,
    pub max_delay_ms: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            min_delay_ms: DEFAULT_MIN_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            seed: None,
        }
    }
}
