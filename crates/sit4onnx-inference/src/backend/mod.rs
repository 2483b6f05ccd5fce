//! Inference backend implementations.

pub mod ort;

use crate::{InputTensor, OutputTensor, Result, TensorInfo};

/// Trait for inference backends.
///
/// A backend wraps one loaded model bound to one execution provider. The
/// benchmark pipeline only needs the declared interface and a way to run
/// the model, which keeps it testable without ONNX Runtime.
pub trait InferenceBackend: Send + Sync {
    /// Inputs converted into the engine's own value type.
    type Prepared;

    /// Convert named input tensors into engine values once, so repeated runs
    /// over the same inputs do not copy them again.
    ///
    /// # Arguments
    /// * `inputs` - Named input tensors, in declaration order
    fn prepare(&self, inputs: &[(String, InputTensor)]) -> Result<Self::Prepared>;

    /// Run inference over previously prepared inputs.
    ///
    /// # Returns
    /// Named output tensors from the model, in declaration order
    fn run(&self, inputs: &Self::Prepared) -> Result<Vec<(String, OutputTensor)>>;

    /// Declared model inputs.
    fn inputs(&self) -> &[TensorInfo];

    /// Declared model outputs.
    fn outputs(&self) -> &[TensorInfo];

    /// Execution providers the session runs on, highest priority first.
    fn providers(&self) -> &[String];
}
