pub mod scale;
pub mod types;

pub use scale::{CategoryScale, ScaleTuning, ValueScale};
pub use types::{AxisKind, DataPoint, Viewport, datetime_to_unix_seconds};
