use super::{BatchSettings, LOW_FRACTION, collect_pulses};
use crate::{
    Interpolation, JitterMeasurement, MalformedBatchError, PolarityHeuristic, Real,
    ThresholdSearch, TimeAxis, WaveformBatch, WaveformResult,
};
use ndarray::ArrayView1;

/// Constant fraction discriminator time: the leading edge crossing of 10% of the peak.
pub fn cfd_time(
    axis: &TimeAxis,
    pulse: ArrayView1<'_, Real>,
    settings: &BatchSettings,
) -> WaveformResult<Real> {
    ThresholdSearch::new(
        settings.polarity.peak(pulse) * LOW_FRACTION,
        settings.polarity.leading_edge(),
    )
    .interpolate(axis, pulse, settings.interpolation)
}

/// Measures the timing difference between corresponding pulses of two channels.
///
/// The polarity of each batch is detected independently, and each pulse is timed
/// at 10% of its own peak. Values are `time_a - time_b`.
#[tracing::instrument(skip_all, fields(num_pulses = batch_a.pulse_count()))]
pub fn calc_jitter(
    axis_a: &TimeAxis,
    batch_a: &WaveformBatch,
    axis_b: &TimeAxis,
    batch_b: &WaveformBatch,
    heuristic: PolarityHeuristic,
    interpolation: Interpolation,
) -> WaveformResult<JitterMeasurement> {
    if batch_a.pulse_count() != batch_b.pulse_count() {
        return Err(MalformedBatchError::PulseCountMismatch {
            first: batch_a.pulse_count(),
            second: batch_b.pulse_count(),
        }
        .into());
    }
    batch_a.check_axis(axis_a)?;
    batch_b.check_axis(axis_b)?;

    let settings_a = BatchSettings::detect(batch_a, heuristic)?.with_interpolation(interpolation);
    let settings_b = BatchSettings::detect(batch_b, heuristic)?.with_interpolation(interpolation);

    let times_a = collect_pulses(batch_a, |pulse| cfd_time(axis_a, pulse, &settings_a))?;
    let times_b = collect_pulses(batch_b, |pulse| cfd_time(axis_b, pulse, &settings_b))?;

    JitterMeasurement::from_values(
        times_a
            .into_iter()
            .zip(times_b)
            .map(|(a, b)| a - b)
            .collect(),
    )
}
