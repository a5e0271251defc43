use super::TimeAxis;
use crate::{MalformedBatchError, Real};
use ndarray::{Array2, ArrayView1, Axis, s};

/// Number of leading samples averaged to estimate a pulse's baseline.
pub const BASELINE_SAMPLES: usize = 20;

/// A collection of digitised pulses, one row per pulse, each row aligned to a shared [TimeAxis].
#[derive(Clone, Debug, PartialEq)]
pub struct WaveformBatch {
    samples: Array2<Real>,
}

impl WaveformBatch {
    /// Builds a batch from per-pulse sample vectors.
    /// Every row must have as many samples as `axis`.
    pub fn from_rows(rows: Vec<Vec<Real>>, axis: &TimeAxis) -> Result<Self, MalformedBatchError> {
        let expected = axis.len();
        if let Some((pulse, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            return Err(MalformedBatchError::RaggedPulse {
                pulse,
                len: row.len(),
                expected,
            });
        }
        let pulses = rows.len();
        let flat = rows.into_iter().flatten().collect();
        let samples = Array2::from_shape_vec((pulses, expected), flat).map_err(|_| {
            MalformedBatchError::PulseLength {
                len: pulses,
                expected,
            }
        })?;
        Ok(Self { samples })
    }

    /// Wraps an existing array of shape (pulse_count, sample_count).
    pub fn from_array(samples: Array2<Real>, axis: &TimeAxis) -> Result<Self, MalformedBatchError> {
        let batch = Self { samples };
        batch.check_axis(axis)?;
        Ok(batch)
    }

    /// Returns a copy of the batch with each pulse's baseline removed.
    /// The baseline is the mean of the first `baseline_samples` samples of the pulse.
    pub fn baseline_corrected(&self, baseline_samples: usize) -> Self {
        let window = baseline_samples.min(self.sample_count());
        let mut samples = self.samples.clone();
        if window > 0 {
            for mut pulse in samples.axis_iter_mut(Axis(0)) {
                let baseline = pulse.slice(s![..window]).mean().unwrap_or_default();
                pulse -= baseline;
            }
        }
        Self { samples }
    }

    /// Checks the batch is aligned to `axis`.
    pub fn check_axis(&self, axis: &TimeAxis) -> Result<(), MalformedBatchError> {
        if self.sample_count() == axis.len() {
            Ok(())
        } else {
            Err(MalformedBatchError::PulseLength {
                len: self.sample_count(),
                expected: axis.len(),
            })
        }
    }

    pub fn pulse_count(&self) -> usize {
        self.samples.nrows()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.ncols()
    }

    pub fn pulse(&self, index: usize) -> Option<ArrayView1<'_, Real>> {
        (index < self.pulse_count()).then(|| self.samples.row(index))
    }

    pub fn pulses(&self) -> impl ExactSizeIterator<Item = ArrayView1<'_, Real>> + '_ {
        self.samples.outer_iter()
    }

    /// Appends the pulses of `other`, used to merge the runs of a channel.
    pub fn append(&mut self, other: &WaveformBatch) -> Result<(), MalformedBatchError> {
        self.samples
            .append(Axis(0), other.samples.view())
            .map_err(|_| MalformedBatchError::PulseLength {
                len: other.sample_count(),
                expected: self.sample_count(),
            })
    }

    pub fn samples(&self) -> &Array2<Real> {
        &self.samples
    }
}
