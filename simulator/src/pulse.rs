use pulsecal_common::Real;
use serde::Deserialize;

/// The shape of the simulated photomultiplier response, with times in nanoseconds.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "pulse-type")]
pub(crate) enum PulseShape {
    #[serde(rename_all = "kebab-case")]
    Gaussian {
        peak_time_ns: Real,
        sd_ns: Real,
        amplitude: Real,
    },
    #[serde(rename_all = "kebab-case")]
    Triangular {
        start_ns: Real,
        peak_time_ns: Real,
        stop_ns: Real,
        amplitude: Real,
    },
    #[serde(rename_all = "kebab-case")]
    Biexp {
        start_ns: Real,
        rise_ns: Real,
        decay_ns: Real,
        amplitude: Real,
    },
}

/// A single pulse, placed in time and scaled, ready to be sampled.
#[derive(Debug)]
pub(crate) enum Pulse {
    Gaussian {
        mean: Real,
        sd: Real,
        peak_amplitude: Real,
    },
    Triangular {
        start: Real,
        peak_time: Real,
        stop: Real,
        amplitude: Real,
    },
    Biexp {
        start: Real,
        decay: Real,
        rise: Real,
        coef: Real,
    },
}

impl Pulse {
    /// Builds the pulse described by `shape`, delayed by `delay_ns` and scaled by `scale`.
    pub(crate) fn new(shape: &PulseShape, delay_ns: Real, scale: Real) -> Self {
        match *shape {
            PulseShape::Gaussian {
                peak_time_ns,
                sd_ns,
                amplitude,
            } => Self::Gaussian {
                mean: peak_time_ns + delay_ns,
                sd: sd_ns,
                peak_amplitude: amplitude * scale,
            },
            PulseShape::Triangular {
                start_ns,
                peak_time_ns,
                stop_ns,
                amplitude,
            } => Self::Triangular {
                start: start_ns + delay_ns,
                peak_time: peak_time_ns + delay_ns,
                stop: stop_ns + delay_ns,
                amplitude: amplitude * scale,
            },
            PulseShape::Biexp {
                start_ns,
                rise_ns,
                decay_ns,
                amplitude,
            } => {
                /*
                f(t) = A(e^{-t/d} - e^{-t/r})
                peak_time: t' = ln(d/r) dr/(d - r)
                */
                let peak_time = (decay_ns / rise_ns).ln() * decay_ns * rise_ns / (decay_ns - rise_ns);
                let height = (-peak_time / decay_ns).exp() - (-peak_time / rise_ns).exp();
                Self::Biexp {
                    start: start_ns + delay_ns,
                    decay: decay_ns,
                    rise: rise_ns,
                    coef: amplitude * scale / height,
                }
            }
        }
    }

    /// The voltage at `time` nanoseconds.
    pub(crate) fn value_at(&self, time: Real) -> Real {
        match *self {
            Self::Gaussian {
                mean,
                sd,
                peak_amplitude,
            } => peak_amplitude * (-0.5 * ((time - mean) / sd).powi(2)).exp(),
            Self::Triangular {
                start,
                peak_time,
                stop,
                amplitude,
            } => {
                if start <= time && time < peak_time {
                    amplitude * (time - start) / (peak_time - start)
                } else if peak_time <= time && time < stop {
                    amplitude * (stop - time) / (stop - peak_time)
                } else {
                    Real::default()
                }
            }
            Self::Biexp {
                start,
                decay,
                rise,
                coef,
            } => {
                if time < start {
                    Real::default()
                } else {
                    let time = time - start;
                    coef * ((-time / decay).exp() - (-time / rise).exp())
                }
            }
        }
    }
}

impl PulseShape {
    /// Returns a description of the first invalid parameter, if any.
    pub(crate) fn validate(&self) -> Option<&'static str> {
        match *self {
            PulseShape::Gaussian { sd_ns, .. } => (sd_ns <= 0.0).then_some("sd-ns must be positive"),
            PulseShape::Triangular {
                start_ns,
                peak_time_ns,
                stop_ns,
                ..
            } => (!(start_ns < peak_time_ns && peak_time_ns < stop_ns))
                .then_some("start-ns, peak-time-ns and stop-ns must be increasing"),
            PulseShape::Biexp {
                rise_ns, decay_ns, ..
            } => (!(0.0 < rise_ns && rise_ns < decay_ns))
                .then_some("rise-ns must be positive and less than decay-ns"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn gaussian() {
        let shape = PulseShape::Gaussian {
            peak_time_ns: 10.0,
            sd_ns: 2.0,
            amplitude: -1.0,
        };
        let pulse = Pulse::new(&shape, 1.0, 0.5);
        assert_approx_eq!(pulse.value_at(11.0), -0.5);
        assert_approx_eq!(pulse.value_at(13.0), -0.5 * (-0.5_f64).exp());
        assert!(shape.validate().is_none());
    }

    #[test]
    fn triangular() {
        let shape = PulseShape::Triangular {
            start_ns: 0.0,
            peak_time_ns: 2.0,
            stop_ns: 6.0,
            amplitude: 1.0,
        };
        let pulse = Pulse::new(&shape, 0.0, 1.0);
        assert_eq!(pulse.value_at(-1.0), 0.0);
        assert_approx_eq!(pulse.value_at(1.0), 0.5);
        assert_approx_eq!(pulse.value_at(2.0), 1.0);
        assert_approx_eq!(pulse.value_at(5.0), 0.25);
        assert_eq!(pulse.value_at(6.0), 0.0);
    }

    #[test]
    fn biexp_peak() {
        let shape = PulseShape::Biexp {
            start_ns: 5.0,
            rise_ns: 1.0,
            decay_ns: 4.0,
            amplitude: 2.0,
        };
        let pulse = Pulse::new(&shape, 0.0, 1.0);
        let peak_time = 4.0_f64.ln() * 4.0 / 3.0;
        assert_approx_eq!(pulse.value_at(5.0 + peak_time), 2.0);
        assert!(pulse.value_at(5.0 + peak_time + 0.1) < 2.0);
        assert!(pulse.value_at(5.0 + peak_time - 0.1) < 2.0);
        assert_eq!(pulse.value_at(4.0), 0.0);
    }

    #[test]
    fn invalid_shapes() {
        assert!(
            PulseShape::Biexp {
                start_ns: 0.0,
                rise_ns: 4.0,
                decay_ns: 1.0,
                amplitude: 1.0
            }
            .validate()
            .is_some()
        );
        assert!(
            PulseShape::Gaussian {
                peak_time_ns: 0.0,
                sd_ns: 0.0,
                amplitude: 1.0
            }
            .validate()
            .is_some()
        );
    }

    #[test]
    fn deserialize() {
        let shape: PulseShape = serde_json::from_str(
            r#"{"pulse-type": "triangular", "start-ns": 1, "peak-time-ns": 2, "stop-ns": 5, "amplitude": -0.3}"#,
        )
        .unwrap();
        assert!(matches!(shape, PulseShape::Triangular { stop_ns, .. } if stop_ns == 5.0));
    }
}
