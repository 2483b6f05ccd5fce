//! Configuration structures for a benchmark run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sit4onnx_inference::{ProviderDescriptor, ProviderKind, ProviderOptions};

use crate::error::{BenchError, Result};

/// Main configuration for sit4onnx.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Benchmark loop defaults.
    pub benchmark: BenchmarkConfig,

    /// Execution provider options.
    pub providers: ProviderConfig,

    /// Output file settings.
    pub output: OutputConfig,
}

/// Defaults for the values the command line can override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Value substituted for a dynamic batch dimension.
    pub batch_size: i64,

    /// Number of timed iterations.
    pub test_loop_count: i64,

    /// Execution provider.
    pub provider: ProviderKind,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            test_loop_count: 10,
            provider: ProviderKind::TensorRt,
        }
    }
}

/// Execution provider option overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub tensorrt: TensorRtConfig,
    pub openvino: OpenVinoConfig,
}

/// TensorRT provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TensorRtConfig {
    /// Cache built engines between runs.
    pub engine_cache_enable: bool,

    /// Build FP16 engines.
    pub fp16_enable: bool,

    /// Engine cache directory. `None` places the cache next to the model.
    pub engine_cache_path: Option<PathBuf>,
}

impl Default for TensorRtConfig {
    fn default() -> Self {
        Self {
            engine_cache_enable: true,
            fp16_enable: true,
            engine_cache_path: None,
        }
    }
}

/// OpenVINO device strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenVinoConfig {
    /// Device used by `openvino_cpu`.
    pub cpu_device: String,

    /// Device used by `openvino_gpu`.
    pub gpu_device: String,
}

impl Default for OpenVinoConfig {
    fn default() -> Self {
        Self {
            cpu_device: "CPU_FP32".to_string(),
            gpu_device: "GPU_FP16".to_string(),
        }
    }
}

/// Where `.npy` dumps go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for `.npy` files.
    pub numpy_dir: PathBuf,

    /// Prepended to every sanitized output name.
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            numpy_dir: PathBuf::from("."),
            file_prefix: "result_".to_string(),
        }
    }
}

impl BenchConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| BenchError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| BenchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ProviderConfig {
    /// Registry entry for `kind` with these overrides applied.
    pub fn descriptor(&self, kind: ProviderKind, model_path: &Path) -> ProviderDescriptor {
        let mut descriptor = ProviderDescriptor::for_model(kind, model_path);

        match &mut descriptor.options {
            ProviderOptions::TensorRt(trt) => {
                trt.engine_cache_enable = self.tensorrt.engine_cache_enable;
                trt.fp16_enable = self.tensorrt.fp16_enable;
                if let Some(path) = &self.tensorrt.engine_cache_path {
                    trt.engine_cache_path = path.clone();
                }
            }
            ProviderOptions::OpenVino(ov) => {
                ov.device_type = match kind {
                    ProviderKind::OpenVinoGpu => self.openvino.gpu_device.clone(),
                    _ => self.openvino.cpu_device.clone(),
                };
            }
            ProviderOptions::Cuda | ProviderOptions::Cpu => {}
        }

        descriptor
    }
}
