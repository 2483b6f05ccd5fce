//! Core library for sit4onnx.
//!
//! This crate provides:
//! - model path and argument validation
//! - batch-axis shape resolution and all-ones input synthesis
//! - the warm-up plus timed inference loop
//! - `.npy` dumps of the last iteration's outputs
//! - JSON configuration and the serializable benchmark report

pub mod config;
pub mod dump;
pub mod error;
pub mod options;
pub mod report;
pub mod runner;
pub mod shape;
pub mod synth;

pub use config::BenchConfig;
pub use error::{BenchError, Result};
pub use options::BenchOptions;
pub use report::{BenchReport, TensorSummary};
pub use runner::{Phase, RunOutcome, Runner, Timing};
pub use synth::InputBank;

/// Re-export inference types.
pub use sit4onnx_inference::{
    Dim, InferenceBackend, InferenceError, OrtBackend, OutputTensor, ProviderDescriptor,
    ProviderKind, TensorInfo, TensorType,
};

use tracing::debug;

/// Resolve the backend's declared inputs against `batch_size` and build the
/// all-ones input bank.
pub fn prepare_inputs<B: InferenceBackend + ?Sized>(backend: &B, batch_size: i64) -> Result<InputBank> {
    let resolved = shape::resolve_inputs(backend.inputs(), batch_size)?;
    InputBank::synthesize(&resolved)
}

/// Benchmark an already loaded model.
///
/// Validates the loop count, synthesizes inputs, runs one warm-up and
/// `test_loop_count` timed iterations, and returns the report with the last
/// iteration's outputs. The model path in `options` is not read; the caller
/// has already loaded `backend` from it.
pub fn inference<B: InferenceBackend + ?Sized>(backend: &B, options: &BenchOptions) -> Result<BenchReport> {
    let test_loop_count = options::validate_loop_count(options.test_loop_count)?;
    let bank = prepare_inputs(backend, options.batch_size)?;
    debug!("Synthesized {} inputs", bank.tensors().len());

    let outcome = Runner::new(backend).run(&bank, test_loop_count)?;
    Ok(BenchReport::new(backend, &bank, outcome))
}
