use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::graph::domain::graph_artifact::GraphArtifact;
use crate::inference::domain::execution_engine::ExecutionEngine;
use crate::shared::detector_error::DetectorError;

/// Loads a graph artifact once and holds it for the life of the process.
pub struct GraphStore {
    artifact: GraphArtifact,
}

impl GraphStore {
    /// Reads the whole file at `path`. No structural validation happens here.
    pub fn load(path: &Path) -> Result<Self, DetectorError> {
        let bytes = fs::read(path).map_err(|e| DetectorError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Loaded graph artifact {} ({} bytes)", path.display(), bytes.len());
        Ok(Self {
            artifact: GraphArtifact::from_bytes(bytes).with_source(path),
        })
    }

    /// Reads an artifact from any byte source until EOF.
    ///
    /// `label` only appears in error messages.
    pub fn from_reader(mut reader: impl Read, label: &str) -> Result<Self, DetectorError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| DetectorError::Io {
                path: PathBuf::from(label),
                source: e,
            })?;
        Ok(Self::from_artifact(GraphArtifact::from_bytes(bytes)))
    }

    pub fn from_artifact(artifact: GraphArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &GraphArtifact {
        &self.artifact
    }

    /// Parses the held artifact into `engine`'s in-memory graph.
    pub fn import<E: ExecutionEngine>(&self, engine: &E) -> Result<E::Graph, DetectorError> {
        engine.import(&self.artifact)
    }
}
