use crate::{Measurement, Real, TimeAxis, WaveformBatch, WaveformResult};
use itertools::Itertools;
use ndarray::ArrayView1;

/// Integrates `pulse` over `axis` with the trapezoidal rule, in volt-seconds.
pub fn pulse_area(axis: &TimeAxis, pulse: ArrayView1<'_, Real>) -> Real {
    axis.view()
        .iter()
        .zip(pulse.iter())
        .tuple_windows()
        .map(|((t0, v0), (t1, v1))| 0.5 * (v0 + v1) * (t1 - t0))
        .sum()
}

#[tracing::instrument(skip_all, fields(num_pulses = batch.pulse_count()))]
pub fn calc_area(axis: &TimeAxis, batch: &WaveformBatch) -> WaveformResult<Measurement> {
    batch.check_axis(axis)?;
    Measurement::from_values(batch.pulses().map(|pulse| pulse_area(axis, pulse)).collect())
}
