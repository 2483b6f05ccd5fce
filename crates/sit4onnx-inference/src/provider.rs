//! Execution provider registry.
//!
//! Maps the backend names accepted on the command line to the ONNX Runtime
//! execution provider and the options it is registered with.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// ONNX Runtime name of the default CPU provider.
pub const CPU_EXECUTION_PROVIDER: &str = "CPUExecutionProvider";

/// Backends a benchmark can run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    #[serde(rename = "tensorrt")]
    TensorRt,
    Cuda,
    #[serde(rename = "openvino_cpu")]
    OpenVinoCpu,
    #[serde(rename = "openvino_gpu")]
    OpenVinoGpu,
    Cpu,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::TensorRt,
        ProviderKind::Cuda,
        ProviderKind::OpenVinoCpu,
        ProviderKind::OpenVinoGpu,
        ProviderKind::Cpu,
    ];

    /// Backend name as given on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::TensorRt => "tensorrt",
            ProviderKind::Cuda => "cuda",
            ProviderKind::OpenVinoCpu => "openvino_cpu",
            ProviderKind::OpenVinoGpu => "openvino_gpu",
            ProviderKind::Cpu => "cpu",
        }
    }

    /// ONNX Runtime execution provider name.
    pub fn ep_name(&self) -> &'static str {
        match self {
            ProviderKind::TensorRt => "TensorrtExecutionProvider",
            ProviderKind::Cuda => "CUDAExecutionProvider",
            ProviderKind::OpenVinoCpu | ProviderKind::OpenVinoGpu => "OpenVINOExecutionProvider",
            ProviderKind::Cpu => CPU_EXECUTION_PROVIDER,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ProviderKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown execution provider '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// TensorRT engine options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorRtOptions {
    pub engine_cache_enable: bool,
    pub engine_cache_path: PathBuf,
    pub fp16_enable: bool,
}

/// OpenVINO device selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenVinoOptions {
    pub device_type: String,
}

/// Backend-specific provider options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOptions {
    TensorRt(TensorRtOptions),
    Cuda,
    OpenVino(OpenVinoOptions),
    Cpu,
}

/// A fully configured execution provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub options: ProviderOptions,
}

impl ProviderDescriptor {
    /// Registry entry for `kind` with its built-in options.
    ///
    /// The TensorRT engine cache points at the current directory until
    /// [`ProviderDescriptor::for_model`] places it next to a model.
    pub fn lookup(kind: ProviderKind) -> Self {
        let options = match kind {
            ProviderKind::TensorRt => ProviderOptions::TensorRt(TensorRtOptions {
                engine_cache_enable: true,
                engine_cache_path: PathBuf::from("."),
                fp16_enable: true,
            }),
            ProviderKind::Cuda => ProviderOptions::Cuda,
            ProviderKind::OpenVinoCpu => ProviderOptions::OpenVino(OpenVinoOptions {
                device_type: "CPU_FP32".to_string(),
            }),
            ProviderKind::OpenVinoGpu => ProviderOptions::OpenVino(OpenVinoOptions {
                device_type: "GPU_FP16".to_string(),
            }),
            ProviderKind::Cpu => ProviderOptions::Cpu,
        };

        Self { kind, options }
    }

    /// Registry entry for `kind`, with the TensorRT engine cache placed in the
    /// directory holding `model_path`.
    pub fn for_model(kind: ProviderKind, model_path: &Path) -> Self {
        let mut descriptor = Self::lookup(kind);
        if let ProviderOptions::TensorRt(trt) = &mut descriptor.options {
            trt.engine_cache_path = engine_cache_dir(model_path);
        }
        descriptor
    }

    /// ONNX Runtime execution provider name.
    pub fn ep_name(&self) -> &'static str {
        self.kind.ep_name()
    }

    /// OpenVINO providers run with graph optimization disabled.
    pub fn disables_graph_optimization(&self) -> bool {
        matches!(self.options, ProviderOptions::OpenVino(_))
    }

    /// Options as `(key, value)` pairs in ONNX Runtime's naming, for display.
    pub fn option_pairs(&self) -> Vec<(&'static str, String)> {
        match &self.options {
            ProviderOptions::TensorRt(trt) => vec![
                ("trt_engine_cache_enable", trt.engine_cache_enable.to_string()),
                ("trt_engine_cache_path", trt.engine_cache_path.display().to_string()),
                ("trt_fp16_enable", trt.fp16_enable.to_string()),
            ],
            ProviderOptions::OpenVino(ov) => vec![("device_type", ov.device_type.clone())],
            ProviderOptions::Cuda | ProviderOptions::Cpu => Vec::new(),
        }
    }
}

/// Directory component of `model_path`, or `.` when it has none.
fn engine_cache_dir(model_path: &Path) -> PathBuf {
    match model_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
