use crate::graph::domain::graph_artifact::GraphArtifact;
use crate::inference::domain::tensor::Tensor;
use crate::inference::domain::tensor_handle::{TensorHandle, TensorRole};
use crate::shared::detector_error::DetectorError;

/// Port to a graph runtime.
///
/// Import and context allocation are separate steps so a session can check
/// its tensor names before any execution resources exist.
pub trait ExecutionEngine {
    type Graph: ImportedGraph;
    type Context: ExecutionContext;

    /// Parses serialized bytes. Fails with [`DetectorError::GraphParse`].
    fn import(&self, artifact: &GraphArtifact) -> Result<Self::Graph, DetectorError>;

    /// Binds execution resources to `graph`. Fails with
    /// [`DetectorError::SessionInit`]; on failure nothing stays allocated.
    fn create_context(&self, graph: Self::Graph) -> Result<Self::Context, DetectorError>;
}

/// A parsed graph, not yet executable.
pub trait ImportedGraph {
    /// Looks up a node slot by name. `None` if the graph has no such node.
    fn resolve(&self, name: &str, role: TensorRole) -> Option<TensorHandle>;
}

/// Runtime resources bound to exactly one graph.
pub trait ExecutionContext: Send {
    /// Evaluates `fetches` given `feeds`, returning one tensor per fetch in
    /// the same order. Fails with [`DetectorError::Execution`].
    fn run(
        &mut self,
        feeds: &[(&TensorHandle, Tensor)],
        fetches: &[&TensorHandle],
    ) -> Result<Vec<Tensor>, DetectorError>;

    /// Frees native resources. Fails with [`DetectorError::SessionClose`].
    fn release(self) -> Result<(), DetectorError>
    where
        Self: Sized;
}
