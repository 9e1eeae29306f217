/// Whether a handle is fed by the caller or fetched from the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorRole {
    Feed,
    Fetch,
}

/// Reference to a named node slot inside one imported graph.
///
/// Only produced by [`ImportedGraph::resolve`](super::execution_engine::ImportedGraph::resolve),
/// so holding one means the node existed at session construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorHandle {
    name: String,
    role: TensorRole,
}

impl TensorHandle {
    pub fn new(name: impl Into<String>, role: TensorRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> TensorRole {
        self.role
    }
}
