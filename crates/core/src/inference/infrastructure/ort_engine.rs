//! ONNX Runtime implementation of the execution engine port.

use std::borrow::Cow;

use ndarray::{ArrayD, IxDyn};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::DynValue;

use crate::graph::domain::graph_artifact::GraphArtifact;
use crate::inference::domain::execution_engine::{ExecutionContext, ExecutionEngine, ImportedGraph};
use crate::inference::domain::tensor::Tensor;
use crate::inference::domain::tensor_handle::{TensorHandle, TensorRole};
use crate::inference::infrastructure::execution_provider::execution_providers;
use crate::shared::detector_config::ExecutionProviderKind;
use crate::shared::detector_error::{DetectorError, EngineError};

/// Runs ONNX graphs through `ort`.
///
/// Byte-string tensors are fed as a 1-D `uint8` tensor, the layout ONNX
/// models use for encoded images (see the `ImageDecoder` operator).
#[derive(Debug, Clone)]
pub struct OrtEngine {
    intra_threads: usize,
    provider: ExecutionProviderKind,
}

impl OrtEngine {
    pub fn new(intra_threads: usize, provider: ExecutionProviderKind) -> Self {
        Self {
            intra_threads,
            provider,
        }
    }
}

impl Default for OrtEngine {
    fn default() -> Self {
        Self::new(1, ExecutionProviderKind::Cpu)
    }
}

/// An ONNX model parsed into a runtime session that has not run yet.
pub struct OrtGraph {
    session: Session,
}

impl ImportedGraph for OrtGraph {
    fn resolve(&self, name: &str, role: TensorRole) -> Option<TensorHandle> {
        let declared = match role {
            TensorRole::Feed => self.session.inputs(),
            TensorRole::Fetch => self.session.outputs(),
        };
        declared
            .iter()
            .any(|outlet| outlet.name() == name)
            .then(|| TensorHandle::new(name, role))
    }
}

impl ExecutionEngine for OrtEngine {
    type Graph = OrtGraph;
    type Context = OrtContext;

    fn import(&self, artifact: &GraphArtifact) -> Result<OrtGraph, DetectorError> {
        let builder = Session::builder()
            .map_err(|e| DetectorError::SessionInit(engine_error(e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| DetectorError::SessionInit(engine_error(e)))?
            .with_intra_threads(self.intra_threads)
            .map_err(|e| DetectorError::SessionInit(engine_error(e)))?
            .with_execution_providers(execution_providers(self.provider))
            .map_err(|e| DetectorError::SessionInit(engine_error(e)))?;

        let session = builder
            .commit_from_memory(artifact.as_bytes())
            .map_err(|e| DetectorError::GraphParse(engine_error(e)))?;

        log::debug!(
            "Imported ONNX graph: {} inputs, {} outputs",
            session.inputs().len(),
            session.outputs().len()
        );
        Ok(OrtGraph { session })
    }

    fn create_context(&self, graph: OrtGraph) -> Result<OrtContext, DetectorError> {
        Ok(OrtContext {
            session: graph.session,
        })
    }
}

/// Owns the `ort` session; dropping it frees the native allocations.
pub struct OrtContext {
    session: Session,
}

impl ExecutionContext for OrtContext {
    fn run(
        &mut self,
        feeds: &[(&TensorHandle, Tensor)],
        fetches: &[&TensorHandle],
    ) -> Result<Vec<Tensor>, DetectorError> {
        let mut inputs = Vec::with_capacity(feeds.len());
        for (handle, tensor) in feeds {
            inputs.push((Cow::Owned(handle.name().to_string()), to_input_value(tensor)?));
        }

        let ort_inputs: SessionInputs<'_, '_, 0> = SessionInputs::ValueMap(inputs);
        let outputs = self
            .session
            .run(ort_inputs)
            .map_err(|e| DetectorError::Execution(engine_error(e)))?;

        fetches
            .iter()
            .map(|handle| from_output_value(handle.name(), &outputs[handle.name()]))
            .collect()
    }

    fn release(self) -> Result<(), DetectorError> {
        drop(self.session);
        Ok(())
    }
}

fn engine_error(e: impl std::fmt::Display) -> EngineError {
    e.to_string().into()
}

fn dims<T>(array: &ArrayD<T>) -> Vec<i64> {
    array.shape().iter().map(|&d| d as i64).collect()
}

fn encoding_error(e: impl std::fmt::Display) -> DetectorError {
    DetectorError::Encoding(e.to_string())
}

fn to_input_value(tensor: &Tensor) -> Result<SessionInputValue<'static>, DetectorError> {
    let value = match tensor {
        Tensor::String(bytes) => {
            ort::value::Tensor::from_array((vec![bytes.len() as i64], bytes.clone()))
                .map_err(encoding_error)?
                .into_dyn()
        }
        Tensor::I32(a) => {
            let data: Vec<i32> = a.iter().copied().collect();
            ort::value::Tensor::from_array((dims(a), data))
                .map_err(encoding_error)?
                .into_dyn()
        }
        Tensor::I64(a) => {
            let data: Vec<i64> = a.iter().copied().collect();
            ort::value::Tensor::from_array((dims(a), data))
                .map_err(encoding_error)?
                .into_dyn()
        }
        Tensor::F32(a) => {
            let data: Vec<f32> = a.iter().copied().collect();
            ort::value::Tensor::from_array((dims(a), data))
                .map_err(encoding_error)?
                .into_dyn()
        }
    };
    Ok(SessionInputValue::from(value))
}

/// Output data borrowed from an `ort` value, split by element type.
enum OutputData<'a> {
    F32(Vec<i64>, &'a [f32]),
    I32(Vec<i64>, &'a [i32]),
    I64(Vec<i64>, &'a [i64]),
    Unsupported(String),
}

fn extract_output(value: &DynValue) -> OutputData<'_> {
    if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
        return OutputData::F32(shape.iter().copied().collect(), data);
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<i32>() {
        return OutputData::I32(shape.iter().copied().collect(), data);
    }
    if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
        return OutputData::I64(shape.iter().copied().collect(), data);
    }
    OutputData::Unsupported(format!("{:?}", value.dtype()))
}

fn from_output_value(name: &str, value: &DynValue) -> Result<Tensor, DetectorError> {
    output_tensor(name, extract_output(value))
}

// Element types other than float32, int32 and int64 fail decoding.
fn output_tensor(name: &str, data: OutputData<'_>) -> Result<Tensor, DetectorError> {
    match data {
        OutputData::F32(shape, data) => to_array(name, shape.into_iter(), data).map(Tensor::F32),
        OutputData::I32(shape, data) => to_array(name, shape.into_iter(), data).map(Tensor::I32),
        OutputData::I64(shape, data) => to_array(name, shape.into_iter(), data).map(Tensor::I64),
        OutputData::Unsupported(dtype) => Err(DetectorError::decoding(
            name,
            format!("unsupported element type {dtype}; expected float32, int32 or int64"),
        )),
    }
}

fn to_array<T: Clone>(
    name: &str,
    shape: impl Iterator<Item = i64>,
    data: &[T],
) -> Result<ArrayD<T>, DetectorError> {
    let dims: Vec<usize> = shape.map(|d| d.max(0) as usize).collect();
    ArrayD::from_shape_vec(IxDyn(&dims), data.to_vec()).map_err(|e| {
        DetectorError::Execution(format!("output '{name}' does not match its shape: {e}").into())
    })
}
