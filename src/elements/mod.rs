mod cancellation;
mod delay;
mod generation;
mod number_source;
mod randomness;
mod sample;

pub use self::cancellation::CancellationSignal;
pub use self::delay::DelayRange;
pub use self::generation::GenerationRequest;
pub use self::number_source::{NumberSource, SAMPLES_GENERATED};
pub use self::randomness::{Randomness, ScriptedRandomness, SeededRandomness};
pub use self::sample::NumberSample;
