use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::graph::infrastructure::graph_store::GraphStore;
use crate::inference::domain::execution_engine::{ExecutionContext, ExecutionEngine, ImportedGraph};
use crate::inference::domain::face_detector::FaceDetector;
use crate::inference::domain::inference_result::InferenceResult;
use crate::inference::domain::tensor_codec::TensorCodec;
use crate::inference::domain::tensor_handle::{TensorHandle, TensorRole};
use crate::shared::detector_error::DetectorError;
use crate::shared::tensor_names::TensorNames;

/// A loaded graph bound to its input and output tensors, ready to run.
///
/// Lifecycle is `open` → any number of `run` → `close`. The execution
/// context lives behind a mutex, so concurrent `run` calls are serialized;
/// `None` marks a closed session. Dropping an open session releases the
/// context as well.
pub struct InferenceSession<E: ExecutionEngine> {
    context: Mutex<Option<E::Context>>,
    input: TensorHandle,
    bboxes: TensorHandle,
    scores: TensorHandle,
    codec: TensorCodec,
}

impl<E: ExecutionEngine> InferenceSession<E> {
    /// Imports the stored graph, resolves the three named tensors and
    /// allocates the execution context, in that order.
    ///
    /// Names are checked before the context exists, so a missing tensor
    /// never leaves resources behind.
    pub fn open(engine: &E, store: &GraphStore, names: &TensorNames) -> Result<Self, DetectorError> {
        let graph = store.import(engine)?;

        let input = resolve(&graph, &names.input, TensorRole::Feed)?;
        let bboxes = resolve(&graph, &names.bboxes, TensorRole::Fetch)?;
        let scores = resolve(&graph, &names.scores, TensorRole::Fetch)?;

        let context = engine.create_context(graph)?;
        log::info!(
            "Inference session opened (input '{}', outputs '{}', '{}')",
            input.name(),
            bboxes.name(),
            scores.name()
        );

        Ok(Self {
            context: Mutex::new(Some(context)),
            input,
            bboxes,
            scores,
            codec: TensorCodec::default(),
        })
    }

    pub fn with_codec(mut self, codec: TensorCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Runs the graph on one encoded image.
    ///
    /// Per-call failures (`Encoding`, `Execution`, `Decoding`) leave the
    /// session usable. Fails with `SessionClosed` after [`close`](Self::close).
    pub fn run(&self, image: &[u8]) -> Result<InferenceResult, DetectorError> {
        let mut guard = self.lock_context();
        let context = guard.as_mut().ok_or(DetectorError::SessionClosed)?;

        let input = self.codec.encode_image(image)?;
        let outputs = context.run(&[(&self.input, input)], &[&self.bboxes, &self.scores])?;
        drop(guard);

        let count = outputs.len();
        let mut outputs = outputs.into_iter();
        let (Some(bboxes), Some(scores), None) = (outputs.next(), outputs.next(), outputs.next())
        else {
            return Err(DetectorError::decoding(
                self.bboxes.name(),
                format!("engine returned {count} outputs for 2 fetches"),
            ));
        };
        let boxes = TensorCodec::decode_boxes(self.bboxes.name(), bboxes)?;
        let scores = TensorCodec::decode_scores(self.scores.name(), scores)?;

        if scores.len() != boxes.len() {
            return Err(DetectorError::decoding(
                self.scores.name(),
                format!(
                    "{} scores do not align with {} boxes",
                    scores.len(),
                    boxes.len()
                ),
            ));
        }

        log::debug!("Inference produced {} detections", scores.len());
        Ok(InferenceResult::new(scores, boxes))
    }

    /// Releases the execution context.
    ///
    /// The session is unusable afterwards whether or not the release itself
    /// succeeded; a second call fails with `SessionClosed`.
    pub fn close(&self) -> Result<(), DetectorError> {
        let context = self
            .lock_context()
            .take()
            .ok_or(DetectorError::SessionClosed)?;
        context.release()?;
        log::info!("Inference session closed");
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.lock_context().is_none()
    }

    pub fn tensor_names(&self) -> TensorNames {
        TensorNames::new(self.input.name(), self.bboxes.name(), self.scores.name())
    }

    // A panic inside the engine poisons the lock; the context carries no
    // state between calls, so the guard is still safe to use.
    fn lock_context(&self) -> MutexGuard<'_, Option<E::Context>> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E: ExecutionEngine> Drop for InferenceSession<E> {
    fn drop(&mut self) {
        let context = self
            .context
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(context) = context {
            if let Err(e) = context.release() {
                log::warn!("Failed to release execution context on drop: {e}");
            }
        }
    }
}

impl<E: ExecutionEngine> FaceDetector for InferenceSession<E> {
    fn find_faces(&self, image: &[u8]) -> Result<InferenceResult, DetectorError> {
        self.run(image)
    }
}

fn resolve<G: ImportedGraph>(
    graph: &G,
    name: &str,
    role: TensorRole,
) -> Result<TensorHandle, DetectorError> {
    graph
        .resolve(name, role)
        .ok_or_else(|| DetectorError::TensorNotFound {
            name: name.to_string(),
        })
}
