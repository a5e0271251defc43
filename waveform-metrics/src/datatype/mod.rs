pub(crate) mod batch;
pub(crate) mod time_axis;

pub use batch::{BASELINE_SAMPLES, WaveformBatch};
pub use time_axis::TimeAxis;
