pub mod tracer;

/// Scalar type used for times (seconds) and voltages (volts).
pub type Real = f64;

/// Oscilloscope channel number, as used to key stored waveforms.
pub type Channel = u32;

/// LED driver channel number, as used to name result directories.
pub type LedChannel = u32;

/// Metadata key under which the time axis of `channel` is stored.
pub fn timeform_key(channel: Channel) -> String {
    format!("timeform_{channel}")
}

pub const NANOSECONDS_PER_SECOND: Real = 1e9;
