use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{DEFAULT_GRAPH_PATH, DEFAULT_IMAGE_PATH, DEFAULT_MAX_IMAGE_BYTES};
use crate::shared::tensor_names::TensorNames;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Hardware the execution engine should run the graph on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionProviderKind {
    #[default]
    Cpu,
    /// CoreML on macOS, DirectML on Windows, CPU elsewhere.
    Platform,
}

impl std::str::FromStr for ExecutionProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(ExecutionProviderKind::Cpu),
            "platform" => Ok(ExecutionProviderKind::Platform),
            other => Err(format!(
                "execution provider must be 'cpu' or 'platform', got '{other}'"
            )),
        }
    }
}

/// Everything needed to stand up a detector and drive the polling loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub graph_path: PathBuf,
    pub image_path: PathBuf,
    pub tensor_names: TensorNames,
    pub max_image_bytes: usize,
    /// Pause between loop iterations; 0 polls back to back.
    pub poll_interval_ms: u64,
    /// `None` runs until cancelled.
    pub max_iterations: Option<usize>,
    pub intra_threads: usize,
    /// Per-call deadline; enables the worker thread when set.
    pub timeout_ms: Option<u64>,
    pub execution_provider: ExecutionProviderKind,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::from(DEFAULT_GRAPH_PATH),
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            tensor_names: TensorNames::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            poll_interval_ms: 0,
            max_iterations: None,
            intra_threads: 1,
            timeout_ms: None,
            execution_provider: ExecutionProviderKind::default(),
        }
    }
}

impl DetectorConfig {
    /// Reads a JSON config file. Fields absent from the file keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tensor_names.validate().map_err(ConfigError::Invalid)?;
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_image_bytes must be greater than zero".into(),
            ));
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Invalid(
                "intra_threads must be greater than zero".into(),
            ));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_ms must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}
