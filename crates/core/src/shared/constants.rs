pub const DEFAULT_GRAPH_PATH: &str = "OptimizedGraph.onnx";
pub const DEFAULT_IMAGE_PATH: &str = "faces.jpg";

pub const DEFAULT_INPUT_TENSOR: &str = "input_image";
pub const DEFAULT_BBOXES_TENSOR: &str = "bboxes";
/// Name the exported graph gives its score output; tied to how the graph was
/// optimized, so it is only a default.
pub const DEFAULT_SCORES_TENSOR: &str = "scores_1/GatherV2";

/// Largest encoded image accepted as a single byte-string tensor (64 MiB).
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 64 * 1024 * 1024;

/// Every bounding box is `[x1, y1, x2, y2]`-style with four components.
pub const BOX_ARITY: usize = 4;

/// Queue depth of the inference worker thread.
pub const WORKER_QUEUE_CAPACITY: usize = 4;
