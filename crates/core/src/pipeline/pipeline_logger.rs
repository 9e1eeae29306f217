use std::collections::HashMap;
use std::time::Instant;

/// Observer for detection-loop events.
///
/// Keeps the loop free of any particular output mechanism so tests and
/// other front ends can watch it without changing the orchestration.
pub trait PipelineLogger: Send {
    /// Record how long a named stage took for one iteration.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. faces found).
    fn metric(&mut self, name: &str, value: f64);

    /// Count a finished iteration.
    fn iteration(&mut self, succeeded: bool);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards every event.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn iteration(&mut self, _succeeded: bool) {}
}

/// Aggregates timings and metrics and writes a summary through `log`.
///
/// A progress line is logged every `throttle` iterations.
pub struct StatsPipelineLogger {
    throttle: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    iterations: usize,
    failures: usize,
}

impl StatsPipelineLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            iterations: 0,
            failures: 0,
        }
    }

    /// Formatted summary, or `None` before the first iteration.
    pub fn summary_string(&self) -> Option<String> {
        if self.iterations == 0 {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Detection summary ({} iterations, {} failed, {elapsed_s:.1}s total):",
            self.iterations, self.failures
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let (avg, total) = avg_and_total(&self.timings[stage]);
            lines.push(format!("  {stage:8}: avg {avg:6.1}ms  total {total:7.0}ms"));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let (avg, _) = avg_and_total(&self.metrics[name]);
            lines.push(format!("  {name}: avg {avg:.1}"));
        }

        if elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} images/s",
                self.iterations as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StatsPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StatsPipelineLogger {
    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn iteration(&mut self, succeeded: bool) {
        self.iterations += 1;
        if !succeeded {
            self.failures += 1;
        }
        if self.iterations % self.throttle == 0 {
            log::info!(
                "Processed {} images ({} failed)",
                self.iterations,
                self.failures
            );
        }
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

fn avg_and_total(values: &[f64]) -> (f64, f64) {
    let total: f64 = values.iter().sum();
    let avg = if values.is_empty() {
        0.0
    } else {
        total / values.len() as f64
    };
    (avg, total)
}
