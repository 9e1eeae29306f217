use ndarray::{Ix1, Ix2};

use crate::inference::domain::tensor::Tensor;
use crate::shared::constants::{BOX_ARITY, DEFAULT_MAX_IMAGE_BYTES};
use crate::shared::detector_error::DetectorError;

/// Marshals image bytes into the graph's input tensor and output tensors
/// back into typed scores and boxes.
///
/// No image decoding happens here; the graph interprets the encoded format.
#[derive(Debug, Clone, Copy)]
pub struct TensorCodec {
    max_image_bytes: usize,
}

impl TensorCodec {
    pub fn new(max_image_bytes: usize) -> Self {
        Self { max_image_bytes }
    }

    /// Wraps `bytes` as one opaque byte-string tensor.
    pub fn encode_image(&self, bytes: &[u8]) -> Result<Tensor, DetectorError> {
        if bytes.len() > self.max_image_bytes {
            return Err(DetectorError::Encoding(format!(
                "image is {} bytes, string tensors are limited to {} bytes",
                bytes.len(),
                self.max_image_bytes
            )));
        }
        Ok(Tensor::String(bytes.to_vec()))
    }

    /// Reads a `[N, 4]` int32 tensor as N boxes, rows in order.
    pub fn decode_boxes(name: &str, tensor: Tensor) -> Result<Vec<[i32; 4]>, DetectorError> {
        let array = match tensor {
            Tensor::I32(array) => array,
            other => {
                return Err(DetectorError::decoding(
                    name,
                    format!("expected int32 boxes, got {}", other.dtype()),
                ))
            }
        };
        let shape = array.shape().to_vec();
        let array = array.into_dimensionality::<Ix2>().map_err(|_| {
            DetectorError::decoding(name, format!("expected a 2-D tensor, got shape {shape:?}"))
        })?;
        if array.ncols() != BOX_ARITY {
            return Err(DetectorError::decoding(
                name,
                format!("expected {BOX_ARITY} values per box, got shape {shape:?}"),
            ));
        }
        Ok(array
            .rows()
            .into_iter()
            .map(|row| [row[0], row[1], row[2], row[3]])
            .collect())
    }

    /// Reads a 1-D float32 tensor as a score per detection.
    pub fn decode_scores(name: &str, tensor: Tensor) -> Result<Vec<f32>, DetectorError> {
        let array = match tensor {
            Tensor::F32(array) => array,
            other => {
                return Err(DetectorError::decoding(
                    name,
                    format!("expected float32 scores, got {}", other.dtype()),
                ))
            }
        };
        let shape = array.shape().to_vec();
        let array = array.into_dimensionality::<Ix1>().map_err(|_| {
            DetectorError::decoding(name, format!("expected a 1-D tensor, got shape {shape:?}"))
        })?;
        Ok(array.to_vec())
    }
}

impl Default for TensorCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IMAGE_BYTES)
    }
}
