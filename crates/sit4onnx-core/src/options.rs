//! Benchmark run options and their validation.

use std::path::{Path, PathBuf};

use sit4onnx_inference::ProviderKind;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};

/// File extension a model path must carry.
pub const MODEL_EXTENSION: &str = "onnx";

/// Settings for one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchOptions {
    pub model_path: PathBuf,
    pub batch_size: i64,
    pub test_loop_count: i64,
    pub provider: ProviderKind,
}

impl BenchOptions {
    /// Options for `model_path` with every other value taken from `config`.
    pub fn from_config(model_path: impl Into<PathBuf>, config: &BenchConfig) -> Self {
        Self {
            model_path: model_path.into(),
            batch_size: config.benchmark.batch_size,
            test_loop_count: config.benchmark.test_loop_count,
            provider: config.benchmark.provider,
        }
    }

    /// Check everything that can be checked before a session is created.
    pub fn validate(&self) -> Result<()> {
        validate_model_path(&self.model_path)?;
        validate_loop_count(self.test_loop_count)?;
        validate_batch_size(self.batch_size)?;
        Ok(())
    }
}

/// The path must name an existing regular file ending in `.onnx`.
pub fn validate_model_path(path: &Path) -> Result<()> {
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == MODEL_EXTENSION);

    if !has_extension || !path.is_file() {
        return Err(BenchError::ModelNotFound(path.to_path_buf()));
    }
    Ok(())
}

pub fn validate_loop_count(test_loop_count: i64) -> Result<usize> {
    if test_loop_count < 1 {
        return Err(BenchError::InvalidLoopCount(test_loop_count));
    }
    Ok(test_loop_count as usize)
}

pub fn validate_batch_size(batch_size: i64) -> Result<usize> {
    if batch_size < 1 {
        return Err(BenchError::InvalidBatchSize(batch_size));
    }
    Ok(batch_size as usize)
}
