//! Frozen-graph face detection.
//!
//! [`graph`] loads the serialized model, [`inference`] binds it to named
//! tensors and runs it, [`pipeline`] drives the polling loop.

pub mod graph;
pub mod inference;
pub mod pipeline;
pub mod shared;
