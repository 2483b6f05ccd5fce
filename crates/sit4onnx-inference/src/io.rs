//! Declared model inputs and outputs.

use std::fmt;

use crate::tensor::TensorType;

/// A single dimension of a declared tensor shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    /// A concrete extent as stored in the model. May be zero or negative in
    /// malformed models; the shape resolver decides what to do with those.
    Fixed(i64),
    /// A symbolic or unknown extent.
    Dynamic,
}

impl Dim {
    /// Convert an ONNX Runtime dimension, where `-1` marks a dynamic axis.
    pub fn from_declared(extent: i64) -> Self {
        if extent < 0 {
            Dim::Dynamic
        } else {
            Dim::Fixed(extent)
        }
    }

    /// The extent as a tensor size, if concrete and non-negative.
    pub fn size(&self) -> Option<usize> {
        match self {
            Dim::Fixed(n) if *n >= 0 => Some(*n as usize),
            _ => None,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{}", n),
            Dim::Dynamic => f.write_str("?"),
        }
    }
}

/// Name, shape and element type of a model input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorInfo {
    pub name: String,
    pub dims: Vec<Dim>,
    /// `None` when the element type has no `TensorType` counterpart.
    pub dtype: Option<TensorType>,
    /// Element type name as reported by the engine.
    pub type_name: String,
}

impl TensorInfo {
    pub fn new(name: impl Into<String>, dims: Vec<Dim>, dtype: TensorType) -> Self {
        Self {
            name: name.into(),
            dims,
            dtype: Some(dtype),
            type_name: dtype.name().to_string(),
        }
    }
}
