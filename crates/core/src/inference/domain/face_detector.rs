use crate::inference::domain::inference_result::InferenceResult;
use crate::shared::detector_error::DetectorError;

/// Anything that turns encoded image bytes into scored face boxes.
///
/// Takes `&self`: implementations serialize access to their engine
/// internally, so one detector can be shared across threads.
pub trait FaceDetector: Send + Sync {
    fn find_faces(&self, image: &[u8]) -> Result<InferenceResult, DetectorError>;
}
