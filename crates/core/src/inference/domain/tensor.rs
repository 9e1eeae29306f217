use ndarray::ArrayD;

/// Element type of a [`Tensor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    String,
    I32,
    I64,
    F32,
}

impl std::fmt::Display for TensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TensorType::String => write!(f, "string"),
            TensorType::I32 => write!(f, "int32"),
            TensorType::I64 => write!(f, "int64"),
            TensorType::F32 => write!(f, "float32"),
        }
    }
}

/// A value exchanged with an execution engine.
///
/// Engines translate to and from their own representation at the boundary;
/// nothing engine-specific leaks past this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    /// Scalar opaque byte string (e.g. an encoded image).
    String(Vec<u8>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
}

impl Tensor {
    pub fn dtype(&self) -> TensorType {
        match self {
            Tensor::String(_) => TensorType::String,
            Tensor::I32(_) => TensorType::I32,
            Tensor::I64(_) => TensorType::I64,
            Tensor::F32(_) => TensorType::F32,
        }
    }

    /// Dimensions; empty for the scalar string.
    pub fn shape(&self) -> &[usize] {
        match self {
            Tensor::String(_) => &[],
            Tensor::I32(a) => a.shape(),
            Tensor::I64(a) => a.shape(),
            Tensor::F32(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }
}
