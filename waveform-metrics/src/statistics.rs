use crate::{MalformedBatchError, Real, WaveformResult};
use ndarray::ArrayView1;
use serde::Serialize;

/// The mean and population standard deviation of a per-pulse quantity,
/// together with the values they were computed from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub mean: Real,
    pub std: Real,
    #[serde(skip)]
    pub values: Vec<Real>,
}

impl Measurement {
    pub fn from_values(values: Vec<Real>) -> WaveformResult<Self> {
        let (mean, std) = mean_and_std(&values)?;
        Ok(Self { mean, std, values })
    }

    pub fn as_pair(&self) -> (Real, Real) {
        (self.mean, self.std)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A [Measurement] of the time difference between two channels,
/// with the standard error assuming both channels contribute equal, independent noise.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JitterMeasurement {
    pub mean: Real,
    pub std: Real,
    pub stderr: Real,
    #[serde(skip)]
    pub values: Vec<Real>,
}

impl JitterMeasurement {
    pub fn from_values(values: Vec<Real>) -> WaveformResult<Self> {
        let (mean, std) = mean_and_std(&values)?;
        let stderr = std / (2.0 * values.len() as Real).sqrt();
        Ok(Self {
            mean,
            std,
            stderr,
            values,
        })
    }

    pub fn as_triple(&self) -> (Real, Real, Real) {
        (self.mean, self.std, self.stderr)
    }
}

fn mean_and_std(values: &[Real]) -> WaveformResult<(Real, Real)> {
    let view = ArrayView1::from(values);
    let mean = view.mean().ok_or(MalformedBatchError::TooFewPulses {
        pulses: 0,
        required: 1,
    })?;
    Ok((mean, view.std(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WaveformError;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn population_std() {
        let measurement = Measurement::from_values(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0])
            .unwrap();
        assert_approx_eq!(measurement.mean, 5.0);
        assert_approx_eq!(measurement.std, 2.0);
        assert_eq!(measurement.len(), 8);
    }

    #[test]
    fn single_value() {
        let measurement = Measurement::from_values(vec![3.5]).unwrap();
        assert_eq!(measurement.as_pair(), (3.5, 0.0));
    }

    #[test]
    fn empty() {
        assert!(matches!(
            Measurement::from_values(vec![]),
            Err(WaveformError::MalformedBatch(_))
        ));
        assert!(JitterMeasurement::from_values(vec![]).is_err());
    }

    #[test]
    fn jitter_standard_error() {
        let jitter = JitterMeasurement::from_values(vec![1.0, 3.0, 1.0, 3.0, 1.0, 3.0, 1.0, 3.0])
            .unwrap();
        assert_approx_eq!(jitter.mean, 2.0);
        assert_approx_eq!(jitter.std, 1.0);
        assert_approx_eq!(jitter.stderr, 0.25);
    }
}
