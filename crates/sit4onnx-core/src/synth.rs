//! Placeholder input construction.

use sit4onnx_inference::{InferenceError, InputTensor, TensorInfo, TensorType};

use crate::error::{BenchError, Result};
use crate::shape::concrete_shape;

/// All-ones tensors for every model input, built once and reused by every
/// iteration.
#[derive(Debug, Clone)]
pub struct InputBank {
    tensors: Vec<(String, InputTensor)>,
}

impl InputBank {
    /// Build one all-ones tensor per resolved input.
    pub fn synthesize(resolved: &[TensorInfo]) -> Result<Self> {
        let tensors = resolved
            .iter()
            .map(|info| -> Result<(String, InputTensor)> {
                let dtype = info.dtype.ok_or_else(|| InferenceError::UnsupportedElementType {
                    name: info.name.clone(),
                    ty: info.type_name.clone(),
                })?;
                let shape = concrete_shape(info)?;
                if !allocatable(&shape, dtype) {
                    return Err(BenchError::TensorTooLarge {
                        input: info.name.clone(),
                        shape,
                    });
                }
                Ok((info.name.clone(), InputTensor::ones(dtype, &shape)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { tensors })
    }

    /// Named tensors in model declaration order.
    pub fn tensors(&self) -> &[(String, InputTensor)] {
        &self.tensors
    }
}

/// Whether a tensor of `shape` fits in addressable memory. Zero-length axes
/// are skipped in the element count, as `ndarray` does before allocating.
fn allocatable(shape: &[usize], dtype: TensorType) -> bool {
    shape
        .iter()
        .filter(|&&n| n != 0)
        .try_fold(dtype.byte_size(), |bytes, &n| bytes.checked_mul(n))
        .is_some_and(|bytes| bytes <= isize::MAX as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sit4onnx_inference::Dim;

    fn tensor<'a>(bank: &'a InputBank, name: &str) -> &'a InputTensor {
        bank.tensors()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
            .unwrap()
    }

    #[test]
    fn test_synthesize_static_image_input() {
        let resolved = vec![TensorInfo::new(
            "input",
            vec![Dim::Fixed(1), Dim::Fixed(3), Dim::Fixed(224), Dim::Fixed(224)],
            TensorType::Float32,
        )];

        let bank = InputBank::synthesize(&resolved).unwrap();
        assert_eq!(bank.tensors().len(), 1);

        let tensor = tensor(&bank, "input");
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        assert_eq!(tensor.dtype(), TensorType::Float32);
        let InputTensor::Float32(arr) = tensor else {
            panic!("expected float32 tensor");
        };
        assert!(arr.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_synthesize_keeps_declaration_order_and_types() {
        let resolved = vec![
            TensorInfo::new("ids", vec![Dim::Fixed(2), Dim::Fixed(16)], TensorType::Int64),
            TensorInfo::new("scale", vec![Dim::Fixed(1)], TensorType::Float64),
            TensorInfo::new("flags", vec![Dim::Fixed(4)], TensorType::Int32),
        ];

        let bank = InputBank::synthesize(&resolved).unwrap();
        let names: Vec<&str> = bank.tensors().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["ids", "scale", "flags"]);
        assert_eq!(tensor(&bank, "ids").dtype(), TensorType::Int64);
        assert_eq!(tensor(&bank, "scale").dtype(), TensorType::Float64);
        assert_eq!(tensor(&bank, "flags").dtype(), TensorType::Int32);
    }

    #[test]
    fn test_unresolved_axis_fails() {
        let resolved = vec![TensorInfo::new(
            "tokens",
            vec![Dim::Fixed(1), Dim::Dynamic],
            TensorType::Int64,
        )];

        assert!(matches!(
            InputBank::synthesize(&resolved),
            Err(BenchError::UnresolvedDimension { axis: 1, .. })
        ));
    }

    #[test]
    fn test_unsupported_element_type_fails() {
        let resolved = vec![TensorInfo {
            name: "half".to_string(),
            dims: vec![Dim::Fixed(1)],
            dtype: None,
            type_name: "f16".to_string(),
        }];

        assert!(matches!(
            InputBank::synthesize(&resolved),
            Err(BenchError::Inference(InferenceError::UnsupportedElementType { .. }))
        ));
    }

    #[test]
    fn test_huge_batch_is_an_error() {
        let resolved = vec![TensorInfo::new(
            "input",
            vec![
                Dim::Fixed(i64::MAX / 2),
                Dim::Fixed(3),
                Dim::Fixed(224),
                Dim::Fixed(224),
            ],
            TensorType::Float32,
        )];

        let err = InputBank::synthesize(&resolved).unwrap_err();
        assert!(matches!(
            err,
            BenchError::TensorTooLarge { ref input, ref shape }
                if input == "input" && shape[0] == (i64::MAX / 2) as usize
        ));
    }

    #[test]
    fn test_allocatable() {
        assert!(allocatable(&[2, 3], TensorType::Float64));
        assert!(allocatable(&[1, 0, 5], TensorType::Int32));
        assert!(allocatable(&[], TensorType::Uint8));
        assert!(allocatable(&[isize::MAX as usize], TensorType::Uint8));
        assert!(!allocatable(&[isize::MAX as usize], TensorType::Int32));
        assert!(!allocatable(&[usize::MAX, 2], TensorType::Uint8));
        assert!(!allocatable(&[usize::MAX / 2 + 1], TensorType::Uint8));
    }
}
