//! The timed inference loop.

use std::time::{Duration, Instant};

use sit4onnx_inference::{InferenceBackend, OutputTensor};
use tracing::{debug, trace};

use crate::error::Result;
use crate::synth::InputBank;

/// Where a [`Runner`] is in its single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Backend loaded, nothing run yet.
    Loaded,
    /// Running the untimed warm-up iteration.
    Warming,
    /// Running timed iterations.
    Timed,
    /// All iterations finished.
    Done,
}

/// Accumulated time over the timed iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub iterations: usize,
    pub total: Duration,
}

impl Timing {
    /// Mean milliseconds per timed iteration.
    pub fn average_ms(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.total.as_secs_f64() * 1000.0 / self.iterations as f64
    }

    pub fn total_ms(&self) -> f64 {
        self.total.as_secs_f64() * 1000.0
    }
}

/// Timing plus the outputs of the last iteration.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub timing: Timing,
    pub outputs: Vec<(String, OutputTensor)>,
}

/// Runs one warm-up iteration followed by the timed iterations.
pub struct Runner<'a, B: InferenceBackend + ?Sized> {
    backend: &'a B,
    phase: Phase,
}

impl<'a, B: InferenceBackend + ?Sized> Runner<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            phase: Phase::Loaded,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run `1 + test_loop_count` iterations over the same inputs.
    ///
    /// Inputs are handed to the backend once, before the warm-up, so the
    /// timed region covers only the engine run. The first iteration absorbs
    /// one-time initialization and is not timed. Only the outputs of the
    /// final iteration are kept.
    pub fn run(&mut self, inputs: &InputBank, test_loop_count: usize) -> Result<RunOutcome> {
        let prepared = self.backend.prepare(inputs.tensors())?;

        self.phase = Phase::Warming;
        debug!("Warm-up iteration");
        let mut outputs = self.backend.run(&prepared)?;

        self.phase = Phase::Timed;
        let mut total = Duration::ZERO;
        for n in 0..test_loop_count {
            let start = Instant::now();
            outputs = self.backend.run(&prepared)?;
            let elapsed = start.elapsed();
            trace!("Iteration {}: {:?}", n + 1, elapsed);
            total += elapsed;
        }

        self.phase = Phase::Done;
        let timing = Timing {
            iterations: test_loop_count,
            total,
        };
        debug!(
            "{} timed iterations in {:?} ({:.3} ms avg)",
            timing.iterations,
            timing.total,
            timing.average_ms()
        );

        Ok(RunOutcome { timing, outputs })
    }
}
