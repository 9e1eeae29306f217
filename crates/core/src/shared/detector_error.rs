use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Boxed diagnostic produced by an execution engine.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Every failure the graph store, inference session and codec can report.
///
/// Construction-time variants (`Io`, `GraphParse`, `TensorNotFound`,
/// `SessionInit`) are fatal: they mean a broken artifact or a contract
/// mismatch and are never retried. The remaining variants are per-call and
/// leave the session usable.
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("failed to read graph artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("graph artifact is not a well-formed serialized graph: {0}")]
    GraphParse(#[source] EngineError),
    #[error("tensor '{name}' not found in graph")]
    TensorNotFound { name: String },
    #[error("failed to initialize execution context: {0}")]
    SessionInit(#[source] EngineError),
    #[error("failed to encode image as tensor: {0}")]
    Encoding(String),
    #[error("graph evaluation failed: {0}")]
    Execution(#[source] EngineError),
    #[error("unexpected output for tensor '{tensor}': {reason}")]
    Decoding { tensor: String, reason: String },
    #[error("failed to release execution context: {0}")]
    SessionClose(#[source] EngineError),
    #[error("inference session is closed")]
    SessionClosed,
    #[error("inference did not complete within {0:?}")]
    Timeout(Duration),
}

impl DetectorError {
    pub(crate) fn decoding(tensor: &str, reason: impl Into<String>) -> Self {
        DetectorError::Decoding {
            tensor: tensor.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that should abort startup rather than be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DetectorError::Io { .. }
                | DetectorError::GraphParse(_)
                | DetectorError::TensorNotFound { .. }
                | DetectorError::SessionInit(_)
        )
    }
}
