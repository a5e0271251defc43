//! This crate extracts standard pulse metrics from batches of digitised
//! waveforms which share a single time axis.
//!
//! A batch is a two dimensional array of voltages, one row per captured pulse.
//! Typical usage looks like:
//! ```rust
//! # use pulsecal_waveform_metrics::*;
//! # fn main() -> Result<(), WaveformError> {
//! let axis = TimeAxis::from_step(5, 1e-9)?;
//! let batch = WaveformBatch::from_rows(
//!     vec![vec![0.0, 0.5, 1.0, 0.5, 0.0], vec![0.0, 0.4, 1.0, 0.6, 0.0]],
//!     &axis,
//! )?;
//! let settings = BatchSettings::detect(&batch, PolarityHeuristic::default())?;
//! let rise = calc_rise(&axis, &batch, &settings)?;
//! println!("{} +/- {}", rise.mean, rise.std);
//! # Ok(())
//! # }
//! ```

pub mod datatype;
pub mod error;
pub mod histogram;
pub mod measurements;
pub mod polarity;
pub mod statistics;
pub mod threshold;

#[cfg(test)]
pub(crate) mod test_utils;

pub use datatype::{BASELINE_SAMPLES, TimeAxis, WaveformBatch};
pub use error::{MalformedBatchError, WaveformError, WaveformResult};
pub use histogram::{Histogram, HistogramError};
pub use measurements::{
    BatchSettings, MeasurementKind, ParameterSummary, calc_area, calc_fall, calc_jitter,
    calc_params, calc_peak, calc_rise, calc_width,
};
pub use polarity::{Polarity, PolarityHeuristic, positive_check};
pub use statistics::{JitterMeasurement, Measurement};
pub use threshold::{Direction, Interpolation, Occurrence, ThresholdSearch, interpolate_threshold};

pub use pulsecal_common::Real;
