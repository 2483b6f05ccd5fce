//! ONNX Runtime session layer for sit4onnx.
//!
//! This crate owns everything that touches the inference engine:
//! - execution provider selection (`tensorrt`, `cuda`, `openvino_cpu`,
//!   `openvino_gpu`, `cpu`)
//! - declared input/output introspection
//! - conversion between `ndarray` tensors and ONNX Runtime values

mod backend;
mod error;
mod io;
mod provider;
mod tensor;

pub use backend::InferenceBackend;
pub use backend::ort::OrtBackend;
pub use error::InferenceError;
pub use io::{Dim, TensorInfo};
pub use provider::{
    OpenVinoOptions, ProviderDescriptor, ProviderKind, ProviderOptions, TensorRtOptions,
    CPU_EXECUTION_PROVIDER,
};
pub use tensor::{InputTensor, OutputTensor, TensorType};

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
