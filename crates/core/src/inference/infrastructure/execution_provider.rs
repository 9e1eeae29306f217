use crate::shared::detector_config::ExecutionProviderKind;

/// Execution providers to register for `kind`, in priority order.
///
/// ONNX Runtime always keeps CPU as the final fallback, so an empty list
/// means plain CPU execution.
pub fn execution_providers(
    kind: ExecutionProviderKind,
) -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    match kind {
        ExecutionProviderKind::Cpu => Vec::new(),
        ExecutionProviderKind::Platform => platform_execution_providers(),
    }
}

fn platform_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_registers_no_accelerator() {
        assert!(execution_providers(ExecutionProviderKind::Cpu).is_empty());
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    #[test]
    fn test_platform_falls_back_to_cpu_elsewhere() {
        assert!(execution_providers(ExecutionProviderKind::Platform).is_empty());
    }
}
