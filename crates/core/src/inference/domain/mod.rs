pub mod execution_engine;
pub mod face_detector;
pub mod inference_result;
pub mod inference_session;
pub mod tensor;
pub mod tensor_codec;
pub mod tensor_handle;
