//! `.npy` dumps of output tensors.

use std::path::{Path, PathBuf};

use ndarray_npy::write_npy;
use sit4onnx_inference::OutputTensor;
use tracing::info;

use crate::error::{BenchError, Result};

/// Replace characters that are unsafe in file names.
pub fn sanitize_name(name: &str) -> String {
    name.replace(['/', ';', ':'], "_")
}

/// File name for an output tensor, e.g. `result_model_argmax_0.npy`.
pub fn npy_file_name(prefix: &str, output_name: &str) -> String {
    format!("{}{}.npy", prefix, sanitize_name(output_name))
}

/// Write each output to `dir` as one `.npy` file and return the paths written.
pub fn dump_outputs(
    dir: &Path,
    prefix: &str,
    outputs: &[(String, OutputTensor)],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(outputs.len());
    for (name, tensor) in outputs {
        let path = dir.join(npy_file_name(prefix, name));
        let result = match tensor {
            OutputTensor::Float32(arr) => write_npy(&path, arr),
            OutputTensor::Float64(arr) => write_npy(&path, arr),
            OutputTensor::Int32(arr) => write_npy(&path, arr),
            OutputTensor::Int64(arr) => write_npy(&path, arr),
            OutputTensor::Uint8(arr) => write_npy(&path, arr),
        };
        result.map_err(|e| BenchError::Dump {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
