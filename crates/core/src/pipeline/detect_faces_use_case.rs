use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::inference::domain::face_detector::FaceDetector;
use crate::inference::domain::inference_result::InferenceResult;
use crate::pipeline::image_source::ImageSource;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Counts from one run of the detection loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub iterations: usize,
    pub detections_ok: usize,
    pub read_failures: usize,
    pub detect_failures: usize,
    pub faces: usize,
}

/// Polling loop: read image → detect → report, until stopped.
///
/// Per-iteration failures are logged and the loop moves on; they never end
/// the run. The detector is borrowed, so whoever opened it also closes it.
pub struct DetectFacesUseCase<'a> {
    source: Box<dyn ImageSource>,
    detector: &'a dyn FaceDetector,
    logger: Box<dyn PipelineLogger>,
    poll_interval: Duration,
    max_iterations: Option<usize>,
    cancelled: Arc<AtomicBool>,
}

impl<'a> DetectFacesUseCase<'a> {
    pub fn new(
        source: Box<dyn ImageSource>,
        detector: &'a dyn FaceDetector,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            source,
            detector,
            logger,
            poll_interval: Duration::ZERO,
            max_iterations: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Flag that stops the loop before its next iteration once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn execute(&mut self) -> LoopSummary {
        let mut summary = LoopSummary::default();
        log::info!("Polling {} for faces", self.source.describe());

        while !self.finished(summary.iterations) {
            summary.iterations += 1;
            match self.step() {
                Step::ReadFailed => summary.read_failures += 1,
                Step::DetectFailed => summary.detect_failures += 1,
                Step::Detected(faces) => {
                    summary.detections_ok += 1;
                    summary.faces += faces;
                }
            }

            if !self.poll_interval.is_zero() && !self.finished(summary.iterations) {
                std::thread::sleep(self.poll_interval);
            }
        }

        self.logger.summary();
        summary
    }

    fn finished(&self, iterations: usize) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self.max_iterations.is_some_and(|max| iterations >= max)
    }

    fn step(&mut self) -> Step {
        let t0 = Instant::now();
        let image = match self.source.read() {
            Ok(image) => image,
            Err(e) => {
                log::warn!("Failed to read image {}: {e}", self.source.describe());
                self.logger.iteration(false);
                return Step::ReadFailed;
            }
        };
        self.logger.timing("read", elapsed_ms(t0));

        let t1 = Instant::now();
        let outcome = self.detector.find_faces(&image);
        self.logger.timing("infer", elapsed_ms(t1));

        match outcome {
            Ok(result) => {
                report(&result);
                self.logger.metric("faces", result.len() as f64);
                self.logger.iteration(true);
                Step::Detected(result.len())
            }
            Err(e) => {
                log::warn!("Failed to infer: {e}");
                self.logger.iteration(false);
                Step::DetectFailed
            }
        }
    }
}

enum Step {
    ReadFailed,
    DetectFailed,
    Detected(usize),
}

fn report(result: &InferenceResult) {
    log::info!("scores={:?} boxes={:?}", result.scores, result.boxes);
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
