use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_BBOXES_TENSOR, DEFAULT_INPUT_TENSOR, DEFAULT_SCORES_TENSOR};

/// Node names the session binds to.
///
/// Output names of an optimized graph depend on how it was exported, so they
/// are configuration rather than constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensorNames {
    pub input: String,
    pub bboxes: String,
    pub scores: String,
}

impl TensorNames {
    pub fn new(
        input: impl Into<String>,
        bboxes: impl Into<String>,
        scores: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            bboxes: bboxes.into(),
            scores: scores.into(),
        }
    }

    /// Checks that every name is non-empty and the two outputs differ.
    pub fn validate(&self) -> Result<(), String> {
        for (role, name) in [
            ("input", &self.input),
            ("bboxes", &self.bboxes),
            ("scores", &self.scores),
        ] {
            if name.trim().is_empty() {
                return Err(format!("{role} tensor name must not be empty"));
            }
        }
        if self.bboxes == self.scores {
            return Err(format!(
                "bboxes and scores must name different tensors, both are '{}'",
                self.bboxes
            ));
        }
        Ok(())
    }
}

impl Default for TensorNames {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_TENSOR, DEFAULT_BBOXES_TENSOR, DEFAULT_SCORES_TENSOR)
    }
}
