//! Tensor types for inference input/output.

use std::fmt;

use ndarray::{ArrayD, IxDyn};

/// Supported tensor element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Float64,
    Int32,
    Int64,
    Uint8,
}

impl TensorType {
    /// NumPy-style name of the element type, as used in reports and `.npy` headers.
    pub fn name(&self) -> &'static str {
        match self {
            TensorType::Float32 => "float32",
            TensorType::Float64 => "float64",
            TensorType::Int32 => "int32",
            TensorType::Int64 => "int64",
            TensorType::Uint8 => "uint8",
        }
    }

    /// Size of one element in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            TensorType::Float32 | TensorType::Int32 => 4,
            TensorType::Float64 | TensorType::Int64 => 8,
            TensorType::Uint8 => 1,
        }
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Input tensor for inference.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Uint8(ArrayD<u8>),
}

impl InputTensor {
    /// Create a tensor of the given type and shape filled with ones.
    pub fn ones(dtype: TensorType, shape: &[usize]) -> Self {
        let dim = IxDyn(shape);
        match dtype {
            TensorType::Float32 => InputTensor::Float32(ArrayD::ones(dim)),
            TensorType::Float64 => InputTensor::Float64(ArrayD::ones(dim)),
            TensorType::Int32 => InputTensor::Int32(ArrayD::ones(dim)),
            TensorType::Int64 => InputTensor::Int64(ArrayD::ones(dim)),
            TensorType::Uint8 => InputTensor::Uint8(ArrayD::ones(dim)),
        }
    }

    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Float64(arr) => arr.shape(),
            InputTensor::Int32(arr) => arr.shape(),
            InputTensor::Int64(arr) => arr.shape(),
            InputTensor::Uint8(arr) => arr.shape(),
        }
    }

    /// Get the data type of the tensor.
    pub fn dtype(&self) -> TensorType {
        match self {
            InputTensor::Float32(_) => TensorType::Float32,
            InputTensor::Float64(_) => TensorType::Float64,
            InputTensor::Int32(_) => TensorType::Int32,
            InputTensor::Int64(_) => TensorType::Int64,
            InputTensor::Uint8(_) => TensorType::Uint8,
        }
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Uint8(ArrayD<u8>),
}

impl OutputTensor {
    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Float64(arr) => arr.shape(),
            OutputTensor::Int32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
            OutputTensor::Uint8(arr) => arr.shape(),
        }
    }

    /// Get the data type of the tensor.
    pub fn dtype(&self) -> TensorType {
        match self {
            OutputTensor::Float32(_) => TensorType::Float32,
            OutputTensor::Float64(_) => TensorType::Float64,
            OutputTensor::Int32(_) => TensorType::Int32,
            OutputTensor::Int64(_) => TensorType::Int64,
            OutputTensor::Uint8(_) => TensorType::Uint8,
        }
    }
}
