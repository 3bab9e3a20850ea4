#[cfg(test)]
#[macro_use]
extern crate static_assertions;

pub mod app_data;
pub mod elements;
pub mod error;
pub mod flow;
pub mod graph;
pub mod metrics;
pub mod settings;
pub mod tracing;

use std::borrow::Cow;

pub use app_data::AppData;
pub use elements::{CancellationSignal, DelayRange, GenerationRequest, NumberSample, NumberSource};
pub use flow::{bridge, consume, is_odd, NumberSequence, Pipeline, Subscriber, TextOutput, Variant};

pub type NumflowResult<T> = Result<T, error::NumflowError>;

pub type SharedString = Cow<'static, str>;
