use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting observer for watch-session events.
///
/// Lets the session report progress, stage timings, metrics and event
/// counts without knowing whether anyone is listening.
pub trait PipelineLogger: Send {
    /// Report how many frames have been processed so far.
    fn progress(&mut self, frames: usize);

    /// Record how long a named stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces per frame, gallery size).
    fn metric(&mut self, name: &str, value: f64);

    /// Count one occurrence of a named event (idle tick, alert, ...).
    fn count(&mut self, event: &str);

    fn info(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards everything.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _frames: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn count(&mut self, _event: &str) {}
    fn info(&mut self, _message: &str) {}
}

/// Running mean without keeping every sample.
#[derive(Clone, Copy, Debug, Default)]
struct Series {
    samples: usize,
    total: f64,
    max: f64,
}

impl Series {
    fn push(&mut self, value: f64) {
        self.samples += 1;
        self.total += value;
        self.max = self.max.max(value);
    }

    fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.total / self.samples as f64
        }
    }
}

/// CLI logger: aggregates stage timings, metrics and event counts and
/// writes a report through `log` when the session ends.
///
/// Progress lines are throttled to one every `throttle_frames` frames.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    frames: usize,
    started: Instant,
    timings: BTreeMap<String, Series>,
    metrics: BTreeMap<String, Series>,
    counts: BTreeMap<String, usize>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            frames: 0,
            started: Instant::now(),
            timings: BTreeMap::new(),
            metrics: BTreeMap::new(),
            counts: BTreeMap::new(),
        }
    }

    /// Multi-line session report, or `None` before anything was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.frames == 0 && self.counts.is_empty() {
            return None;
        }
        let elapsed_s = self.started.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Session summary ({} frames in {elapsed_s:.1}s):",
            self.frames
        )];

        for (stage, series) in &self.timings {
            lines.push(format!(
                "  {stage:8} avg {:6.2}ms  max {:7.2}ms",
                series.mean(),
                series.max
            ));
        }
        for (name, series) in &self.metrics {
            lines.push(format!("  {name}: avg {:.1}, max {:.0}", series.mean(), series.max));
        }
        for (event, n) in &self.counts {
            lines.push(format!("  {event}: {n}"));
        }
        if self.frames > 0 && elapsed_s > 0.0 {
            lines.push(format!("  {:.1} frames/s", self.frames as f64 / elapsed_s));
        }
        Some(lines.join("\n"))
    }

    pub fn mean_timing(&self, stage: &str) -> Option<f64> {
        self.timings.get(stage).map(Series::mean)
    }

    pub fn mean_metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).map(Series::mean)
    }

    pub fn count_of(&self, event: &str) -> usize {
        self.counts.get(event).copied().unwrap_or(0)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(50)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, frames: usize) {
        self.frames = frames;
        if frames % self.throttle_frames == 0 {
            log::info!("Processed {frames} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings.entry(stage.to_string()).or_default().push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn count(&mut self, event: &str) {
        *self.counts.entry(event.to_string()).or_default() += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}
