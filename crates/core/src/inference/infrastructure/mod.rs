pub mod execution_provider;
#[cfg(test)]
pub(crate) mod fake_engine;
pub mod inference_worker;
pub mod ort_engine;
