use crate::pulse::PulseShape;
use pulsecal_common::{Channel, NANOSECONDS_PER_SECOND, Real};
use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, fs::File, io::BufReader, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("IO Error: {0}")]
    IO(#[from] std::io::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid pulse: {0}")]
    InvalidPulse(&'static str),
    #[error("Invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: Real },
}

/// A simulated acquisition run.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct SimulationConfig {
    pub(crate) sample_count: usize,
    pub(crate) sample_time_ns: Real,
    /// Time of the first sample relative to the trigger.
    #[serde(default)]
    pub(crate) trigger_offset_ns: Real,
    #[serde(default = "default_scope_channel")]
    pub(crate) scope_channel: Channel,
    pub(crate) pulse_count: usize,
    pub(crate) pulse: PulseShape,
    /// Standard deviation of the pulse arrival time.
    #[serde(default)]
    pub(crate) timing_jitter_ns: Real,
    /// Relative standard deviation of the pulse amplitude.
    #[serde(default)]
    pub(crate) amplitude_spread: Real,
    #[serde(default)]
    pub(crate) baseline_offset: Real,
    #[serde(default)]
    pub(crate) noise_sd: Real,
    /// Probability that an individual pulse fails to be read out.
    #[serde(default)]
    pub(crate) lost_probability: Real,
    /// Copied verbatim into the metadata of the output file.
    #[serde(default)]
    pub(crate) metadata: BTreeMap<String, Value>,
}

fn default_scope_channel() -> Channel {
    1
}

impl SimulationConfig {
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reason) = self.pulse.validate() {
            return Err(ConfigError::InvalidPulse(reason));
        }
        let non_negative = [
            ("timing-jitter-ns", self.timing_jitter_ns),
            ("amplitude-spread", self.amplitude_spread),
            ("noise-sd", self.noise_sd),
        ];
        if let Some((name, value)) = non_negative
            .into_iter()
            .find(|(_, value)| !(value.is_finite() && *value >= 0.0))
        {
            return Err(ConfigError::InvalidParameter { name, value });
        }
        if !(self.sample_time_ns.is_finite() && self.sample_time_ns > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "sample-time-ns",
                value: self.sample_time_ns,
            });
        }
        if self.sample_count < 2 {
            return Err(ConfigError::InvalidParameter {
                name: "sample-count",
                value: self.sample_count as Real,
            });
        }
        if !(0.0..=1.0).contains(&self.lost_probability) {
            return Err(ConfigError::InvalidParameter {
                name: "lost-probability",
                value: self.lost_probability,
            });
        }
        Ok(())
    }

    /// Sample times in seconds, as recorded by the scope.
    pub(crate) fn timeform(&self) -> Vec<Real> {
        (0..self.sample_count)
            .map(|i| (self.trigger_offset_ns + i as Real * self.sample_time_ns) / NANOSECONDS_PER_SECOND)
            .collect()
    }
}
