pub mod detect_faces_use_case;
pub mod image_source;
pub mod pipeline_logger;
