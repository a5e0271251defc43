use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

pub struct TracerOptions {
    pub default_level: LevelFilter,
}

impl TracerOptions {
    pub fn new(default_level: LevelFilter) -> Self {
        Self { default_level }
    }
}

/// This object initialises the fmt tracer, given a TracerOptions struct.
pub struct TracerEngine {
    service_name: String,
}

impl TracerEngine {
    /// Initialises the fmt tracer for the binary.
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name of the binary, recorded in the start-up message.
    /// #Returns
    /// An instance of TracerEngine
    pub fn new(options: TracerOptions, service_name: &str) -> Self {
        let fmt_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);

        // This filter is applied to the fmt tracer, reports go to stdout so logs use stderr
        let log_filter = EnvFilter::builder()
            .with_default_directive(options.default_level.into())
            .from_env_lossy();

        let subscriber =
            tracing_subscriber::Registry::default().with(fmt_tracer.with_filter(log_filter));

        // A second call (e.g. from tests) keeps the first subscriber.
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            tracing::debug!("Global tracing subscriber already set");
        }
        tracing::debug!("Tracer initialised for {service_name}");

        Self {
            service_name: service_name.to_owned(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_does_not_panic() {
        let first = TracerEngine::new(TracerOptions::new(LevelFilter::INFO), "first");
        let second = TracerEngine::new(TracerOptions::new(LevelFilter::DEBUG), "second");
        assert_eq!(first.service_name(), "first");
        assert_eq!(second.service_name(), "second");
    }
}
