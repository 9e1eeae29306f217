/// Scores and boxes from one inference call.
///
/// The sequences are positionally aligned: `scores[i]` belongs to `boxes[i]`.
/// Order is whatever the graph produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InferenceResult {
    pub scores: Vec<f32>,
    pub boxes: Vec<[i32; 4]>,
}

impl InferenceResult {
    pub fn new(scores: Vec<f32>, boxes: Vec<[i32; 4]>) -> Self {
        debug_assert_eq!(scores.len(), boxes.len(), "scores and boxes must align");
        Self { scores, boxes }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// `(score, box)` pairs in graph order.
    pub fn detections(&self) -> impl Iterator<Item = (f32, [i32; 4])> + '_ {
        self.scores.iter().copied().zip(self.boxes.iter().copied())
    }
}
