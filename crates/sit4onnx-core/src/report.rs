//! Benchmark result model.

use std::path::PathBuf;

use serde::Serialize;
use sit4onnx_inference::{InferenceBackend, OutputTensor};

use crate::runner::RunOutcome;
use crate::synth::InputBank;

/// Name, concrete shape and element type of one tensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TensorSummary {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

impl TensorSummary {
    /// Summaries of the synthesized inputs.
    pub fn from_inputs(bank: &InputBank) -> Vec<Self> {
        bank.tensors()
            .iter()
            .map(|(name, tensor)| Self {
                name: name.clone(),
                shape: tensor.shape().to_vec(),
                dtype: tensor.dtype().to_string(),
            })
            .collect()
    }

    /// Summaries of output tensors.
    pub fn from_outputs(outputs: &[(String, OutputTensor)]) -> Vec<Self> {
        outputs
            .iter()
            .map(|(name, tensor)| Self {
                name: name.clone(),
                shape: tensor.shape().to_vec(),
                dtype: tensor.dtype().to_string(),
            })
            .collect()
    }
}

/// Everything a finished benchmark run reports.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    /// Execution providers the session ran on.
    pub providers: Vec<String>,
    pub inputs: Vec<TensorSummary>,
    pub outputs: Vec<TensorSummary>,
    /// Timed iterations, excluding warm-up.
    pub test_loop_count: usize,
    pub total_elapsed_ms: f64,
    pub avg_elapsed_ms: f64,
    /// `.npy` files written for the outputs, if any.
    pub saved_files: Vec<PathBuf>,
    /// Outputs of the last iteration.
    #[serde(skip)]
    pub results: Vec<(String, OutputTensor)>,
}

impl BenchReport {
    pub fn new<B: InferenceBackend + ?Sized>(
        backend: &B,
        bank: &InputBank,
        outcome: RunOutcome,
    ) -> Self {
        Self {
            providers: backend.providers().to_vec(),
            inputs: TensorSummary::from_inputs(bank),
            outputs: TensorSummary::from_outputs(&outcome.outputs),
            test_loop_count: outcome.timing.iterations,
            total_elapsed_ms: outcome.timing.total_ms(),
            avg_elapsed_ms: outcome.timing.average_ms(),
            saved_files: Vec::new(),
            results: outcome.outputs,
        }
    }
}
