//! Error types for the inference layer.

use thiserror::Error;

/// Errors that can occur while talking to ONNX Runtime.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// Failed to load the ONNX model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Failed to create an inference session.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// Invalid input tensor shape or type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Inference execution failed.
    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// Output tensor extraction failed.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    /// The model declares an element type that cannot be synthesized or read back.
    #[error("unsupported element type {ty} for '{name}'")]
    UnsupportedElementType { name: String, ty: String },
}
