use fxhash::FxHashMap;
use std::fmt::Display;
use std::time::Duration;
use std::time::Instant;

/// Records how long each part of a run takes, accumulated over all runs.
#[derive(Default)]
pub(crate) struct TimingCollector {
    enabled: bool,

    /// Categories in the order they were first reported. We print timings in this order.
    order: Vec<&'static str>,

    timings: FxHashMap<&'static str, Duration>,
}

impl TimingCollector {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    /// Adds the time since `start` to the category `timing`. Returns the time now, which can be
    /// used as the start of the next category.
    pub(crate) fn add_timing(&mut self, start: Instant, timing: &'static str) -> Instant {
        let now = Instant::now();
        if !self.enabled {
            return now;
        }
        let total = self.timings.entry(timing).or_insert_with(|| {
            self.order.push(timing);
            Duration::ZERO
        });
        *total += now - start;
        now
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Display for TimingCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for timing in &self.order {
            writeln!(f, "{timing}: {:0.3}s", self.timings[timing].as_secs_f32())?
        }
        Ok(())
    }
}

#[test]
fn test_timing_order() {
    let mut timings = TimingCollector::new(true);
    let start = Instant::now();
    let next = timings.add_timing(start, "Compiling");
    timings.add_timing(next, "Running cases");
    timings.add_timing(start, "Compiling");
    let text = timings.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Compiling: "));
    assert!(lines[1].starts_with("Running cases: "));

    let mut disabled = TimingCollector::new(false);
    disabled.add_timing(start, "Compiling");
    assert_eq!(disabled.to_string(), "");
}
