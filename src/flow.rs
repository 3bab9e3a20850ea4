mod bridge;
mod consumer;
mod output;
mod sequence;
mod subscriber;
mod variant;

pub use self::bridge::{bridge, Bridge};
pub use self::consumer::{consume, is_odd, Action, Outcome, Pipeline};
pub use self::output::{TextOutput, COMPLETED_MARKER, SAMPLE_SEPARATOR};
pub use self::sequence::{NumberSequence, SampleStream, SEQUENCES_CANCELLED};
pub use self::subscriber::Subscriber;
pub use self::variant::{run_variant, Variant};
