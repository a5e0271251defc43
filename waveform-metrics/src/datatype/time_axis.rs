use crate::{MalformedBatchError, Real};
use ndarray::{Array1, ArrayView1};

/// Relative deviation from the first step tolerated before an axis is rejected as non-uniform.
const UNIFORMITY_TOLERANCE: Real = 1e-6;

/// The sample times shared by every pulse of a batch, in seconds.
///
/// The axis is strictly increasing and uniformly spaced, and is immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeAxis {
    times: Array1<Real>,
    step: Real,
}

impl TimeAxis {
    pub fn new(times: Vec<Real>) -> Result<Self, MalformedBatchError> {
        let (first, second) = match times.as_slice() {
            [first, second, ..] => (*first, *second),
            _ => return Err(MalformedBatchError::TimeAxisTooShort(times.len())),
        };
        let step = second - first;
        for (index, pair) in times.windows(2).enumerate() {
            let this_step = pair[1] - pair[0];
            if this_step <= 0.0 || this_step.is_nan() {
                return Err(MalformedBatchError::TimeAxisNotIncreasing(index + 1));
            }
            if (this_step - step).abs() > UNIFORMITY_TOLERANCE * step {
                return Err(MalformedBatchError::TimeAxisNotUniform {
                    index: index + 1,
                    step: this_step,
                    expected: step,
                });
            }
        }
        Ok(Self {
            times: Array1::from_vec(times),
            step,
        })
    }

    /// Builds an axis of `len` samples starting at zero.
    pub fn from_step(len: usize, step: Real) -> Result<Self, MalformedBatchError> {
        Self::new((0..len).map(|i| i as Real * step).collect())
    }

    /// Returns a copy of this axis translated so that its first sample is at zero.
    /// This removes the trigger offset recorded by the scope.
    pub fn shifted_to_zero(&self) -> Self {
        Self {
            times: &self.times - self.start(),
            step: self.step,
        }
    }

    /// Returns a copy of this axis translated by `offset` seconds.
    pub fn shifted_by(&self, offset: Real) -> Self {
        Self {
            times: &self.times + offset,
            step: self.step,
        }
    }

    pub fn step(&self) -> Real {
        self.step
    }

    pub fn start(&self) -> Real {
        self.times.first().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Real> {
        self.times.get(index).copied()
    }

    pub fn view(&self) -> ArrayView1<'_, Real> {
        self.times.view()
    }

    pub fn to_vec(&self) -> Vec<Real> {
        self.times.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn too_short() {
        assert_eq!(
            TimeAxis::new(vec![0.0]),
            Err(MalformedBatchError::TimeAxisTooShort(1))
        );
        assert_eq!(
            TimeAxis::new(vec![]),
            Err(MalformedBatchError::TimeAxisTooShort(0))
        );
    }

    #[test]
    fn not_increasing() {
        assert_eq!(
            TimeAxis::new(vec![0.0, 1.0, 1.0, 2.0]),
            Err(MalformedBatchError::TimeAxisNotIncreasing(2))
        );
        assert_eq!(
            TimeAxis::new(vec![2.0, 1.0, 0.0]),
            Err(MalformedBatchError::TimeAxisNotIncreasing(1))
        );
    }

    #[test]
    fn not_uniform() {
        assert!(matches!(
            TimeAxis::new(vec![0.0, 1.0, 2.0, 4.0]),
            Err(MalformedBatchError::TimeAxisNotUniform { index: 3, .. })
        ));
    }

    #[test]
    fn scope_timeform() {
        // Trigger offset of -20ns with 0.4ns sampling, as recorded by the scope
        let times = (0..100).map(|i| -20e-9 + i as Real * 0.4e-9).collect();
        let axis = TimeAxis::new(times).unwrap();
        assert_approx_eq!(axis.step(), 0.4e-9, 1e-18);

        let shifted = axis.shifted_to_zero();
        assert_eq!(shifted.start(), 0.0);
        assert_approx_eq!(shifted.get(99).unwrap(), 99.0 * 0.4e-9, 1e-18);
        assert_eq!(shifted.len(), 100);
    }

    #[test]
    fn from_step() {
        let axis = TimeAxis::from_step(4, 0.5).unwrap();
        assert_eq!(axis.to_vec(), vec![0.0, 0.5, 1.0, 1.5]);
        assert_eq!(axis.shifted_by(1.0).to_vec(), vec![1.0, 1.5, 2.0, 2.5]);
    }
}
