//! Scripted in-memory engine that tracks every context it hands out.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ndarray::{ArrayD, IxDyn};

use crate::graph::domain::graph_artifact::GraphArtifact;
use crate::inference::domain::execution_engine::{ExecutionContext, ExecutionEngine, ImportedGraph};
use crate::inference::domain::tensor::Tensor;
use crate::inference::domain::tensor_handle::{TensorHandle, TensorRole};
use crate::shared::detector_error::DetectorError;

const HEADER: &[u8] = b"FAKEGRAPH\n";

/// What a fake context returns from `run`.
#[derive(Clone, Debug)]
pub(crate) enum FakeOutputs {
    Fixed { bboxes: Tensor, scores: Tensor },
    /// Returns the fed tensors unchanged.
    Echo,
    /// First run fails with an execution error, later runs use the defaults.
    FailOnce,
}

impl Default for FakeOutputs {
    fn default() -> Self {
        let [bboxes, scores] = single_detection();
        FakeOutputs::Fixed { bboxes, scores }
    }
}

fn single_detection() -> [Tensor; 2] {
    [
        Tensor::I32(ArrayD::from_shape_vec(IxDyn(&[1, 4]), vec![1, 2, 3, 4]).unwrap()),
        Tensor::F32(ArrayD::from_shape_vec(IxDyn(&[1]), vec![0.5]).unwrap()),
    ]
}

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    live: AtomicUsize,
    released: AtomicUsize,
    runs: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    failed_once: AtomicBool,
    last_feed: Mutex<Option<Tensor>>,
}

pub(crate) struct FakeEngine {
    counters: Arc<Counters>,
    outputs: FakeOutputs,
    fail_create: bool,
    fail_release: bool,
    run_delay: Duration,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            outputs: FakeOutputs::default(),
            fail_create: false,
            fail_release: false,
            run_delay: Duration::from_millis(2),
        }
    }

    /// Serialized fake graph declaring `nodes`.
    pub(crate) fn artifact(nodes: &[&str]) -> GraphArtifact {
        let mut bytes = HEADER.to_vec();
        bytes.extend_from_slice(nodes.join("\n").as_bytes());
        GraphArtifact::from_bytes(bytes)
    }

    pub(crate) fn with_outputs(mut self, outputs: FakeOutputs) -> Self {
        self.outputs = outputs;
        self
    }

    pub(crate) fn failing_context_creation(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub(crate) fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    /// How long each run blocks before answering.
    pub(crate) fn with_run_delay(mut self, delay: Duration) -> Self {
        self.run_delay = delay;
        self
    }

    pub(crate) fn created_contexts(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    pub(crate) fn live_contexts(&self) -> usize {
        self.counters.live.load(Ordering::SeqCst)
    }

    pub(crate) fn released_contexts(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    pub(crate) fn runs(&self) -> usize {
        self.counters.runs.load(Ordering::SeqCst)
    }

    pub(crate) fn max_concurrent_runs(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn last_feed(&self) -> Option<Tensor> {
        self.counters.last_feed.lock().unwrap().clone()
    }
}

pub(crate) struct FakeGraph {
    nodes: Vec<String>,
}

impl ImportedGraph for FakeGraph {
    fn resolve(&self, name: &str, role: TensorRole) -> Option<TensorHandle> {
        self.nodes
            .iter()
            .any(|n| n == name)
            .then(|| TensorHandle::new(name, role))
    }
}

impl ExecutionEngine for FakeEngine {
    type Graph = FakeGraph;
    type Context = FakeContext;

    fn import(&self, artifact: &GraphArtifact) -> Result<FakeGraph, DetectorError> {
        let body = artifact
            .as_bytes()
            .strip_prefix(HEADER)
            .ok_or_else(|| DetectorError::GraphParse("missing fake graph header".into()))?;
        let text = std::str::from_utf8(body).map_err(|e| DetectorError::GraphParse(e.into()))?;
        Ok(FakeGraph {
            nodes: text.lines().map(str::to_string).collect(),
        })
    }

    fn create_context(&self, _graph: FakeGraph) -> Result<FakeContext, DetectorError> {
        if self.fail_create {
            return Err(DetectorError::SessionInit("fake device unavailable".into()));
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(FakeContext {
            counters: Arc::clone(&self.counters),
            outputs: self.outputs.clone(),
            fail_release: self.fail_release,
            run_delay: self.run_delay,
        })
    }
}

pub(crate) struct FakeContext {
    counters: Arc<Counters>,
    outputs: FakeOutputs,
    fail_release: bool,
    run_delay: Duration,
}

impl ExecutionContext for FakeContext {
    fn run(
        &mut self,
        feeds: &[(&TensorHandle, Tensor)],
        _fetches: &[&TensorHandle],
    ) -> Result<Vec<Tensor>, DetectorError> {
        let counters = &self.counters;
        let in_flight = counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        counters.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        std::thread::sleep(self.run_delay);
        counters.runs.fetch_add(1, Ordering::SeqCst);
        *counters.last_feed.lock().unwrap() = feeds.first().map(|(_, t)| t.clone());

        let result = match &self.outputs {
            FakeOutputs::Fixed { bboxes, scores } => Ok(vec![bboxes.clone(), scores.clone()]),
            FakeOutputs::Echo => Ok(feeds.iter().map(|(_, t)| t.clone()).collect()),
            FakeOutputs::FailOnce => {
                if counters.failed_once.swap(true, Ordering::SeqCst) {
                    Ok(single_detection().to_vec())
                } else {
                    Err(DetectorError::Execution("fake evaluation failure".into()))
                }
            }
        };

        counters.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn release(self) -> Result<(), DetectorError> {
        self.counters.live.fetch_sub(1, Ordering::SeqCst);
        self.counters.released.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(DetectorError::SessionClose("fake release failure".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::domain::tensor_codec::TensorCodec;
    use rstest::rstest;

    #[rstest]
    #[case::empty(Vec::new())]
    #[case::all_byte_values((0..=255u8).collect())]
    #[case::nul_padded(vec![0, 0, 0, 1, 0])]
    #[case::large(vec![0xAB; 1 << 16])]
    fn test_echo_round_trip_reproduces_bytes(#[case] bytes: Vec<u8>) {
        let engine = FakeEngine::new().with_outputs(FakeOutputs::Echo);
        let graph = engine.import(&FakeEngine::artifact(&["input_image"])).unwrap();
        let input = graph.resolve("input_image", TensorRole::Feed).unwrap();
        let mut context = engine.create_context(graph).unwrap();

        let tensor = TensorCodec::default().encode_image(&bytes).unwrap();
        let echoed = context.run(&[(&input, tensor)], &[&input]).unwrap();

        assert_eq!(echoed, vec![Tensor::String(bytes)]);
        context.release().unwrap();
    }

    #[test]
    fn test_release_balances_live_count() {
        let engine = FakeEngine::new();
        let graph = engine.import(&FakeEngine::artifact(&[])).unwrap();
        let context = engine.create_context(graph).unwrap();
        assert_eq!(engine.live_contexts(), 1);

        context.release().unwrap();

        assert_eq!(engine.live_contexts(), 0);
        assert_eq!(engine.released_contexts(), 1);
    }
}
