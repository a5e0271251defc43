use crate::{
    MalformedBatchError, Real, WaveformBatch, WaveformResult, threshold::Direction,
};
use ndarray::ArrayView1;
use serde::Serialize;
use strum::{Display, EnumString};

/// Sign convention of a batch's pulses, chosen once per batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// The peak is the maximum sample.
    Positive,
    /// The peak is the minimum sample.
    Negative,
}

impl From<bool> for Polarity {
    fn from(is_positive: bool) -> Self {
        if is_positive {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }
}

impl Polarity {
    /// Classifies `batch` using `heuristic`.
    #[tracing::instrument(skip_all, fields(heuristic = ?heuristic, polarity))]
    pub fn detect(batch: &WaveformBatch, heuristic: PolarityHeuristic) -> WaveformResult<Self> {
        let polarity = match heuristic {
            PolarityHeuristic::RepresentativeRow { row } => {
                let pulse = batch
                    .pulse(row)
                    .ok_or(MalformedBatchError::TooFewPulses {
                        pulses: batch.pulse_count(),
                        required: row + 1,
                    })?;
                Polarity::from(pulse_mean(pulse) > 0.0)
            }
            PolarityHeuristic::MajorityVote { sample_size } => {
                let votes = sample_size.min(batch.pulse_count());
                if votes == 0 {
                    return Err(MalformedBatchError::TooFewPulses {
                        pulses: batch.pulse_count(),
                        required: 1,
                    }
                    .into());
                }
                let positive = batch
                    .pulses()
                    .take(votes)
                    .filter(|pulse| pulse_mean(pulse.view()) > 0.0)
                    .count();
                Polarity::from(2 * positive > votes)
            }
        };
        tracing::Span::current().record("polarity", tracing::field::display(polarity));
        Ok(polarity)
    }

    pub fn is_positive(self) -> bool {
        matches!(self, Polarity::Positive)
    }

    /// The comparison used on the pulse's leading edge, and for constant fraction timing.
    pub fn leading_edge(self) -> Direction {
        match self {
            Polarity::Positive => Direction::Rising,
            Polarity::Negative => Direction::Falling,
        }
    }

    /// The comparison used on the pulse's trailing edge, searching from the peak.
    pub fn trailing_edge(self) -> Direction {
        match self {
            Polarity::Positive => Direction::Falling,
            Polarity::Negative => Direction::Rising,
        }
    }

    /// The signed peak amplitude of `pulse`.
    pub fn peak(self, pulse: ArrayView1<'_, Real>) -> Real {
        match self {
            Polarity::Positive => pulse.iter().copied().fold(Real::NEG_INFINITY, Real::max),
            Polarity::Negative => pulse.iter().copied().fold(Real::INFINITY, Real::min),
        }
    }

    /// The index of the first sample equal to the peak.
    pub fn peak_index(self, pulse: ArrayView1<'_, Real>) -> Option<usize> {
        let peak = self.peak(pulse);
        pulse.iter().position(|value| *value == peak)
    }
}

/// How the polarity of a batch is decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolarityHeuristic {
    /// The sign of the mean of a single pulse.
    RepresentativeRow { row: usize },
    /// The majority sign of the pulse means over the first `sample_size` pulses.
    /// Ties are negative.
    MajorityVote { sample_size: usize },
}

/// Pulse 1 is the one the acquisition scripts have always inspected.
impl Default for PolarityHeuristic {
    fn default() -> Self {
        PolarityHeuristic::RepresentativeRow { row: 1 }
    }
}

/// Returns true when the mean of pulse 1 is strictly positive.
pub fn positive_check(batch: &WaveformBatch) -> WaveformResult<bool> {
    Polarity::detect(batch, PolarityHeuristic::default()).map(Polarity::is_positive)
}

fn pulse_mean(pulse: ArrayView1<'_, Real>) -> Real {
    pulse.mean().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TimeAxis, WaveformError};
    use ndarray::Array1;

    fn batch(rows: Vec<Vec<Real>>) -> WaveformBatch {
        let axis = TimeAxis::from_step(rows[0].len(), 1e-9).unwrap();
        WaveformBatch::from_rows(rows, &axis).unwrap()
    }

    #[test]
    fn uses_second_pulse() {
        let positive = vec![0.0, 1.0, 0.0];
        let negative = vec![0.0, -1.0, 0.0];
        assert!(positive_check(&batch(vec![negative.clone(), positive.clone()])).unwrap());
        assert!(!positive_check(&batch(vec![positive.clone(), negative.clone()])).unwrap());
        assert!(
            positive_check(&batch(vec![negative.clone(), positive.clone(), negative.clone()]))
                .unwrap()
        );
    }

    #[test]
    fn zero_mean_is_negative() {
        let flat = vec![0.0, 0.0, 0.0];
        assert!(!positive_check(&batch(vec![flat.clone(), flat])).unwrap());
    }

    #[test]
    fn needs_two_pulses() {
        let result = positive_check(&batch(vec![vec![0.0, 1.0, 0.0]]));
        assert!(matches!(
            result,
            Err(WaveformError::MalformedBatch(
                MalformedBatchError::TooFewPulses {
                    pulses: 1,
                    required: 2
                }
            ))
        ));
    }

    #[test]
    fn explicit_row() {
        let positive = vec![0.0, 1.0, 0.0];
        let negative = vec![0.0, -1.0, 0.0];
        let batch = batch(vec![positive, negative]);
        assert_eq!(
            Polarity::detect(&batch, PolarityHeuristic::RepresentativeRow { row: 0 }).unwrap(),
            Polarity::Positive
        );
        assert_eq!(
            Polarity::detect(&batch, PolarityHeuristic::RepresentativeRow { row: 1 }).unwrap(),
            Polarity::Negative
        );
    }

    #[test]
    fn majority_vote() {
        let positive = vec![0.0, 1.0, 0.0];
        let negative = vec![0.0, -1.0, 0.0];
        let batch = batch(vec![
            negative.clone(),
            positive.clone(),
            negative.clone(),
            negative.clone(),
            positive.clone(),
            positive.clone(),
            positive.clone(),
        ]);
        let vote = |sample_size| {
            Polarity::detect(&batch, PolarityHeuristic::MajorityVote { sample_size }).unwrap()
        };
        assert_eq!(vote(1), Polarity::Negative);
        assert_eq!(vote(3), Polarity::Negative);
        // Tie
        assert_eq!(vote(6), Polarity::Negative);
        assert_eq!(vote(7), Polarity::Positive);
        // Clamped to the batch size
        assert_eq!(vote(100), Polarity::Positive);
    }

    #[test]
    fn majority_vote_on_empty_batch() {
        let axis = TimeAxis::from_step(3, 1e-9).unwrap();
        let batch = WaveformBatch::from_rows(vec![], &axis).unwrap();
        assert!(
            Polarity::detect(&batch, PolarityHeuristic::MajorityVote { sample_size: 5 }).is_err()
        );
    }

    #[test]
    fn edges() {
        assert_eq!(Polarity::Positive.leading_edge(), Direction::Rising);
        assert_eq!(Polarity::Positive.trailing_edge(), Direction::Falling);
        assert_eq!(Polarity::Negative.leading_edge(), Direction::Falling);
        assert_eq!(Polarity::Negative.trailing_edge(), Direction::Rising);
    }

    #[test]
    fn peak() {
        let pulse = Array1::from_vec(vec![0.1, 0.8, -0.6, 0.8, -0.6, 0.0]);
        assert_eq!(Polarity::Positive.peak(pulse.view()), 0.8);
        assert_eq!(Polarity::Positive.peak_index(pulse.view()), Some(1));
        assert_eq!(Polarity::Negative.peak(pulse.view()), -0.6);
        assert_eq!(Polarity::Negative.peak_index(pulse.view()), Some(2));
    }

    #[test]
    fn parse() {
        assert_eq!("positive".parse::<Polarity>().unwrap(), Polarity::Positive);
        assert_eq!("negative".parse::<Polarity>().unwrap(), Polarity::Negative);
        assert_eq!(Polarity::Negative.to_string(), "negative");
    }
}
