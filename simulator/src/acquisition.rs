use crate::{config::SimulationConfig, pulse::Pulse};
use pulsecal_common::{NANOSECONDS_PER_SECOND, Real, timeform_key};
use pulsecal_waveform_store::{WaveformFile, WaveformStoreResult};
use rand::{Rng, distr::Bernoulli};
use rand_distr::{Distribution, Normal};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Number of stored pulses between progress messages.
const PROGRESS_INTERVAL: usize = 100;

#[derive(Debug, Error)]
pub(crate) enum AcquisitionError {
    #[error("Acquisition of pulse {0} lost")]
    AcquisitionLoss(usize),
    #[error("Invalid Normal Distribution: {0}")]
    NormalDistribution(#[from] rand_distr::NormalError),
    #[error("Invalid Probability: {0}")]
    Bernoulli(#[from] rand::distr::BernoulliError),
}

/// Random sources of a run, built once from the configuration.
struct Sources {
    jitter: Normal<Real>,
    amplitude: Normal<Real>,
    noise: Normal<Real>,
    lost: Bernoulli,
}

impl Sources {
    fn new(config: &SimulationConfig) -> Result<Self, AcquisitionError> {
        Ok(Self {
            jitter: Normal::new(0.0, config.timing_jitter_ns)?,
            amplitude: Normal::new(1.0, config.amplitude_spread)?,
            noise: Normal::new(config.baseline_offset, config.noise_sd)?,
            lost: Bernoulli::new(config.lost_probability)?,
        })
    }
}

/// Summary of a completed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RunStatistics {
    pub(crate) fired: usize,
    pub(crate) stored: usize,
    pub(crate) lost: usize,
}

/// Fires `config.pulse_count` pulses and stores every pulse that is read out.
///
/// Lost pulses are logged and skipped, the run always completes.
#[tracing::instrument(skip_all, fields(pulse_count = config.pulse_count, channel = config.scope_channel))]
pub(crate) fn acquire<R: Rng>(
    config: &SimulationConfig,
    output: &Path,
    rng: &mut R,
) -> Result<(WaveformFile, RunStatistics), AcquisitionError> {
    let sources = Sources::new(config)?;
    let timeform = config.timeform();
    let times_ns = timeform
        .iter()
        .map(|t| t * NANOSECONDS_PER_SECOND)
        .collect::<Vec<_>>();

    let mut file = WaveformFile::new(output);
    let mut statistics = RunStatistics::default();

    for index in 0..config.pulse_count {
        statistics.fired += 1;
        match read_out(config, &sources, &times_ns, index, rng) {
            Ok(pulse) => {
                file.add_data(pulse, config.scope_channel);
                statistics.stored += 1;
                if statistics.stored % PROGRESS_INTERVAL == 0 {
                    info!(
                        "{} pulses stored, {} remaining",
                        statistics.stored,
                        config.pulse_count - index - 1
                    );
                }
            }
            Err(e) => {
                warn!("{e}");
                statistics.lost += 1;
            }
        }
    }
    Ok((file, statistics))
}

/// Samples one noisy pulse, or fails as a lost acquisition.
fn read_out<R: Rng>(
    config: &SimulationConfig,
    sources: &Sources,
    times_ns: &[Real],
    index: usize,
    rng: &mut R,
) -> Result<Vec<Real>, AcquisitionError> {
    let pulse = Pulse::new(
        &config.pulse,
        sources.jitter.sample(rng),
        sources.amplitude.sample(rng),
    );
    let samples = times_ns
        .iter()
        .map(|time| pulse.value_at(*time) + sources.noise.sample(rng))
        .collect();
    if sources.lost.sample(rng) {
        return Err(AcquisitionError::AcquisitionLoss(index));
    }
    Ok(samples)
}

/// Records the time axis and run description alongside the pulses.
pub(crate) fn write_metadata(
    file: &mut WaveformFile,
    config: &SimulationConfig,
    statistics: &RunStatistics,
) -> WaveformStoreResult<()> {
    file.add_meta_data(&timeform_key(config.scope_channel), config.timeform())?;
    for (key, value) in &config.metadata {
        file.add_meta_data(key, value)?;
    }
    file.add_meta_data("pulses_fired", statistics.fired)?;
    file.add_meta_data("pulses_stored", statistics.stored)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::triangular_config;
    use assert_approx_eq::assert_approx_eq;
    use pulsecal_waveform_metrics::{
        BatchSettings, Polarity, PolarityHeuristic, TimeAxis, WaveformBatch, calc_params,
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    #[test]
    fn noiseless_run() {
        let config = triangular_config();
        let (file, statistics) = acquire(&config, Path::new("noiseless"), &mut rng()).unwrap();
        assert_eq!(
            statistics,
            RunStatistics {
                fired: 250,
                stored: 250,
                lost: 0
            }
        );

        let pulses = file.get_data(config.scope_channel).unwrap();
        assert_eq!(pulses.len(), 250);
        assert!(pulses.iter().all(|pulse| pulse == &pulses[0]));
        // Peak of the triangle is 25ns after the first sample
        assert_approx_eq!(pulses[0][50], -0.5);
    }

    #[test]
    fn measured_parameters() {
        let config = triangular_config();
        let (file, _) = acquire(&config, Path::new("measured"), &mut rng()).unwrap();
        let axis = TimeAxis::new(config.timeform()).unwrap().shifted_to_zero();
        let batch = WaveformBatch::from_rows(
            file.get_data(config.scope_channel).unwrap().to_vec(),
            &axis,
        )
        .unwrap();
        let settings = BatchSettings::detect(&batch, PolarityHeuristic::default()).unwrap();
        assert_eq!(settings.polarity, Polarity::Negative);

        let params = calc_params(&axis, &batch, &settings).unwrap();
        assert_approx_eq!(params.rise.mean, 4e-9, 1e-15);
        assert_approx_eq!(params.fall.mean, 12e-9, 1e-15);
        assert_approx_eq!(params.width.mean, 10e-9, 1e-15);
        assert_approx_eq!(params.peak.mean, -0.5);
        assert_approx_eq!(params.rise.std, 0.0, 1e-15);
    }

    #[test]
    fn lost_pulses_are_skipped() {
        let mut config = triangular_config();
        config.lost_probability = 0.5;
        let (file, statistics) = acquire(&config, Path::new("lossy"), &mut rng()).unwrap();
        assert_eq!(statistics.fired, 250);
        assert_eq!(statistics.stored + statistics.lost, 250);
        assert!(statistics.lost > 0);
        assert!(statistics.stored > 0);
        assert_eq!(file.pulse_count(), statistics.stored);
    }

    #[test]
    fn everything_lost() {
        let mut config = triangular_config();
        config.lost_probability = 1.0;
        let (file, statistics) = acquire(&config, Path::new("lost"), &mut rng()).unwrap();
        assert_eq!(statistics.lost, 250);
        assert_eq!(file.pulse_count(), 0);
    }

    #[test]
    fn noise_and_jitter() {
        let mut config = triangular_config();
        config.noise_sd = 0.002;
        config.baseline_offset = 0.01;
        config.timing_jitter_ns = 0.5;
        let (file, _) = acquire(&config, Path::new("noisy"), &mut rng()).unwrap();
        let pulses = file.get_data(config.scope_channel).unwrap();
        assert_ne!(pulses[0], pulses[1]);
        let baseline = pulses.iter().map(|pulse| pulse[0]).sum::<Real>() / pulses.len() as Real;
        assert_approx_eq!(baseline, 0.01, 1e-3);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let mut config = triangular_config();
        config.noise_sd = 0.002;
        config.lost_probability = 0.1;
        let (first, _) = acquire(&config, Path::new("a"), &mut rng()).unwrap();
        let (second, _) = acquire(&config, Path::new("a"), &mut rng()).unwrap();
        assert_eq!(first.get_data(1), second.get_data(1));
    }

    #[test]
    fn metadata() {
        let config = triangular_config();
        let (mut file, statistics) = acquire(&config, Path::new("meta"), &mut rng()).unwrap();
        write_metadata(&mut file, &config, &statistics).unwrap();
        assert_eq!(file.get_meta_data::<u32>("tellie_channel").unwrap(), Some(13));
        assert_eq!(file.get_meta_data::<usize>("pulses_stored").unwrap(), Some(250));
        assert_eq!(
            file.get_meta_data::<Vec<Real>>("timeform_1").unwrap().map(|t| t.len()),
            Some(100)
        );
    }
}
