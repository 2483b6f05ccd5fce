//! Input shape resolution.
//!
//! Only the leading (batch) axis is ever rewritten. A symbolic or
//! non-positive batch extent becomes the requested batch size; every other
//! axis is kept exactly as declared.

use sit4onnx_inference::{Dim, TensorInfo};
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::options::validate_batch_size;

/// Resolve the batch axis of a single declared shape.
pub fn resolve_dims(dims: &[Dim], batch_size: i64) -> Result<Vec<Dim>> {
    let mut resolved = Vec::with_capacity(dims.len());

    for (axis, dim) in dims.iter().enumerate() {
        let needs_batch = axis == 0 && matches!(dim, Dim::Dynamic | Dim::Fixed(i64::MIN..=0));
        if needs_batch {
            validate_batch_size(batch_size)?;
            resolved.push(Dim::Fixed(batch_size));
        } else {
            resolved.push(*dim);
        }
    }

    Ok(resolved)
}

/// Resolve every declared input, keeping names and element types.
pub fn resolve_inputs(inputs: &[TensorInfo], batch_size: i64) -> Result<Vec<TensorInfo>> {
    inputs
        .iter()
        .map(|info| {
            let dims = resolve_dims(&info.dims, batch_size)?;
            debug!("Resolved input '{}': {:?} -> {:?}", info.name, info.dims, dims);
            Ok(TensorInfo {
                dims,
                ..info.clone()
            })
        })
        .collect()
}

/// Concrete extents of a resolved shape.
///
/// Fails on any axis that is still dynamic, which can only be a non-batch
/// axis after [`resolve_dims`].
pub fn concrete_shape(info: &TensorInfo) -> Result<Vec<usize>> {
    info.dims
        .iter()
        .enumerate()
        .map(|(axis, dim)| match dim {
            Dim::Fixed(n) if *n >= 0 => Ok(*n as usize),
            Dim::Fixed(n) => Err(BenchError::InvalidDimension {
                input: info.name.clone(),
                axis,
                extent: *n,
            }),
            Dim::Dynamic => Err(BenchError::UnresolvedDimension {
                input: info.name.clone(),
                axis,
            }),
        })
        .collect()
}
