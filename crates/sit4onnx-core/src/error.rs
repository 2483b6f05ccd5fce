//! Error types for the sit4onnx-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the benchmark pipeline.
#[derive(Error, Debug)]
pub enum BenchError {
    /// The model path does not name an existing `.onnx` file.
    #[error("The specified file (.onnx) does not exist. or not an onnx file. File: {}", .0.display())]
    ModelNotFound(PathBuf),

    /// `test_loop_count` below one.
    #[error("test_loop_count must be 1 or greater.")]
    InvalidLoopCount(i64),

    /// `batch_size` below one.
    #[error("batch_size must be 1 or greater.")]
    InvalidBatchSize(i64),

    /// A non-batch dimension is still symbolic after shape resolution.
    #[error("input '{input}' has a dynamic dimension at axis {axis}; only the batch axis is resolved")]
    UnresolvedDimension { input: String, axis: usize },

    /// A non-batch dimension is negative.
    #[error("input '{input}' has an invalid extent {extent} at axis {axis}")]
    InvalidDimension { input: String, axis: usize, extent: i64 },

    /// A resolved input shape needs more memory than can be addressed.
    #[error("input '{input}' with shape {shape:?} is too large to allocate")]
    TensorTooLarge { input: String, shape: Vec<usize> },

    /// Writing an output tensor to `.npy` failed.
    #[error("failed to write {}: {reason}", .path.display())]
    Dump { path: PathBuf, reason: String },

    /// Inference error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] sit4onnx_inference::InferenceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the sit4onnx-core library.
pub type Result<T> = std::result::Result<T, BenchError>;
