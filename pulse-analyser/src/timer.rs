use std::time::{Duration, Instant};

#[derive(Default)]
pub(crate) struct Timer {
    start: Option<Instant>,
    duration: Duration,
    cumulative_duration: Duration,
}

impl Timer {
    pub(crate) fn record(&mut self) -> Option<()> {
        if self.start.is_none() {
            self.start = Some(Instant::now());
            Some(())
        } else {
            None
        }
    }

    pub(crate) fn end(&mut self) -> Option<()> {
        self.duration = Instant::now().checked_duration_since(self.start?)?;
        self.start = None;
        Some(())
    }

    pub(crate) fn accumulate(&mut self) -> Option<()> {
        self.cumulative_duration = self.cumulative_duration.checked_add(self.duration)?;
        Some(())
    }

    pub(crate) fn add(&mut self, duration: Duration) -> Option<()> {
        self.cumulative_duration = self.cumulative_duration.checked_add(duration)?;
        Some(())
    }

    pub(crate) fn duration(&self) -> Duration {
        self.duration
    }

    pub(crate) fn cumulative_duration(&self) -> Duration {
        self.cumulative_duration
    }
}

/// Times the analysis of all the runs of one channel.
#[derive(Default)]
pub(crate) struct TimerSuite {
    pub(crate) full: Timer,
    pub(crate) processing: Timer,
    num_files: usize,
    num_pulses: usize,
}

impl TimerSuite {
    pub(crate) fn new() -> Self {
        let mut suite = Self::default();
        suite.full.record();
        suite
    }

    pub(crate) fn next_file(&mut self, num_pulses: usize, processing: Duration) {
        self.num_files += 1;
        self.num_pulses += num_pulses;
        self.processing.add(processing);
    }

    pub(crate) fn finish(&mut self) {
        self.full.end();
        self.full.accumulate();
    }

    pub(crate) fn summary(&self, location: &str) -> String {
        format!(
            "Reading {} pulses from {} files in {location}, took {:.2} s ({:.2} s measuring)",
            self.num_pulses,
            self.num_files,
            self.full.cumulative_duration().as_secs_f64(),
            self.processing.cumulative_duration().as_secs_f64(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_twice() {
        let mut timer = Timer::default();
        assert!(timer.record().is_some());
        assert!(timer.record().is_none());
        assert!(timer.end().is_some());
        assert!(timer.end().is_none());
    }

    #[test]
    fn accumulate() {
        let mut timer = Timer::default();
        timer.add(Duration::from_millis(3));
        timer.add(Duration::from_millis(4));
        assert_eq!(timer.cumulative_duration(), Duration::from_millis(7));
    }

    #[test]
    fn suite_summary() {
        let mut suite = TimerSuite::new();
        suite.next_file(100, Duration::from_millis(10));
        suite.next_file(50, Duration::from_millis(20));
        suite.finish();
        let summary = suite.summary("results/channel_13");
        assert!(summary.starts_with("Reading 150 pulses from 2 files in results/channel_13, took "));
        assert!(summary.ends_with("(0.03 s measuring)"));
    }
}
