use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Serialized, already-optimized computation graph.
///
/// The bytes are opaque here; structure is only checked when an execution
/// engine imports them. Cloning shares the same immutable buffer.
#[derive(Clone, Debug)]
pub struct GraphArtifact {
    bytes: Arc<[u8]>,
    source: Option<PathBuf>,
}

impl GraphArtifact {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, path: &Path) -> Self {
        self.source = Some(path.to_path_buf());
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File the artifact was read from, if it came from disk.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}
