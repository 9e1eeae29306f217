pub mod constants;
pub mod detector_config;
pub mod detector_error;
pub mod tensor_names;
