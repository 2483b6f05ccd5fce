//! ONNX Runtime (ort) backend.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayD, IxDyn};
use ort::ep::{self, ExecutionProvider};
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::{Session, SessionInputValue};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};
use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::io::{Dim, TensorInfo};
use crate::provider::{ProviderDescriptor, ProviderOptions, CPU_EXECUTION_PROVIDER};
use crate::tensor::{InputTensor, OutputTensor, TensorType};
use crate::{InferenceBackend, Result};

/// Backend using ONNX Runtime with a single configured execution provider.
pub struct OrtBackend {
    session: Mutex<Session>,
    inputs: Vec<TensorInfo>,
    outputs: Vec<TensorInfo>,
    providers: Vec<String>,
}

impl OrtBackend {
    /// Load a model from a file path and bind it to the given provider.
    pub fn from_file<P: AsRef<Path>>(path: P, descriptor: &ProviderDescriptor) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ONNX model from: {}", path.display());

        let optimization = if descriptor.disables_graph_optimization() {
            GraphOptimizationLevel::Disable
        } else {
            GraphOptimizationLevel::Level3
        };

        let builder = Session::builder()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_optimization_level(optimization)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?;

        let (builder, available) = register_provider(builder, descriptor)?;

        let session = builder
            .commit_from_file(path)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let inputs: Vec<TensorInfo> = session
            .inputs()
            .iter()
            .map(|i| tensor_info(i.name(), i.dtype()))
            .collect();

        let outputs: Vec<TensorInfo> = session
            .outputs()
            .iter()
            .map(|o| tensor_info(o.name(), o.dtype()))
            .collect();

        debug!("Model inputs: {:?}", inputs);
        debug!("Model outputs: {:?}", outputs);

        let providers = active_providers(descriptor, available);
        debug!("Active providers: {:?}", providers);

        Ok(Self {
            session: Mutex::new(session),
            inputs,
            outputs,
            providers,
        })
    }
}

/// Copy an `ArrayD` into an owned ONNX Runtime tensor value.
macro_rules! input_value {
    ($arr:expr, $ty:ty) => {{
        let shape: Vec<i64> = $arr.shape().iter().map(|&s| s as i64).collect();
        let data: Vec<$ty> = $arr.iter().cloned().collect();
        Tensor::from_array((shape, data))
            .map(|tensor| tensor.into_dyn())
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }};
}

fn input_value(tensor: &InputTensor) -> Result<DynValue> {
    match tensor {
        InputTensor::Float32(arr) => input_value!(arr, f32),
        InputTensor::Float64(arr) => input_value!(arr, f64),
        InputTensor::Int32(arr) => input_value!(arr, i32),
        InputTensor::Int64(arr) => input_value!(arr, i64),
        InputTensor::Uint8(arr) => input_value!(arr, u8),
    }
}

/// Copy an output value of element type `$ty` into an `OutputTensor::$variant`.
macro_rules! extract_output {
    ($value:expr, $ty:ty, $variant:ident) => {{
        let (shape_ref, data) = $value
            .try_extract_tensor::<$ty>()
            .map_err(|e| InferenceError::OutputExtraction(e.to_string()))?;
        let shape: Vec<usize> = shape_ref.iter().map(|&s| s as usize).collect();
        let arr = ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec())
            .map_err(|e| InferenceError::OutputExtraction(e.to_string()))?;
        OutputTensor::$variant(arr)
    }};
}

impl InferenceBackend for OrtBackend {
    /// Owned session values, borrowed by every `run`.
    type Prepared = Vec<(String, DynValue)>;

    fn prepare(&self, inputs: &[(String, InputTensor)]) -> Result<Self::Prepared> {
        inputs
            .iter()
            .map(|(name, tensor)| Ok((name.clone(), input_value(tensor)?)))
            .collect()
    }

    fn run(&self, inputs: &Self::Prepared) -> Result<Vec<(String, OutputTensor)>> {
        let ort_inputs: Vec<(&str, SessionInputValue<'_>)> = inputs
            .iter()
            .map(|(name, value)| (name.as_str(), SessionInputValue::from(value.view())))
            .collect();

        let mut session = self.session.lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("Failed to lock session: {}", e)))?;

        let outputs = session
            .run(ort_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (name, value) in outputs.iter() {
            let ty = match value.dtype() {
                ValueType::Tensor { ty, .. } => *ty,
                other => {
                    return Err(InferenceError::UnsupportedElementType {
                        name: name.to_string(),
                        ty: other.to_string(),
                    });
                }
            };

            let tensor = match ty {
                TensorElementType::Float32 => extract_output!(value, f32, Float32),
                TensorElementType::Float64 => extract_output!(value, f64, Float64),
                TensorElementType::Int32 => extract_output!(value, i32, Int32),
                TensorElementType::Int64 => extract_output!(value, i64, Int64),
                TensorElementType::Uint8 => extract_output!(value, u8, Uint8),
                other => {
                    return Err(InferenceError::UnsupportedElementType {
                        name: name.to_string(),
                        ty: other.to_string(),
                    });
                }
            };

            results.push((name.to_string(), tensor));
        }

        Ok(results)
    }

    fn inputs(&self) -> &[TensorInfo] {
        &self.inputs
    }

    fn outputs(&self) -> &[TensorInfo] {
        &self.outputs
    }

    fn providers(&self) -> &[String] {
        &self.providers
    }
}

/// Register the descriptor's execution provider on the builder.
///
/// Returns whether the linked ONNX Runtime build ships the provider. When it
/// does not, ONNX Runtime runs the session on the CPU provider instead.
fn register_provider(
    builder: SessionBuilder,
    descriptor: &ProviderDescriptor,
) -> Result<(SessionBuilder, bool)> {
    let (builder, available) = match &descriptor.options {
        ProviderOptions::TensorRt(trt) => {
            let provider = ep::TensorRT::default()
                .with_engine_cache(trt.engine_cache_enable)
                .with_engine_cache_path(trt.engine_cache_path.display().to_string())
                .with_fp16(trt.fp16_enable);
            let available = provider.is_available().unwrap_or(false);
            (builder.with_execution_providers([provider.build()]), available)
        }
        ProviderOptions::Cuda => {
            let provider = ep::CUDA::default();
            let available = provider.is_available().unwrap_or(false);
            (builder.with_execution_providers([provider.build()]), available)
        }
        ProviderOptions::OpenVino(ov) => {
            let provider = ep::OpenVINO::default().with_device_type(&ov.device_type);
            let available = provider.is_available().unwrap_or(false);
            (builder.with_execution_providers([provider.build()]), available)
        }
        ProviderOptions::Cpu => return Ok((builder, true)),
    };

    let builder = builder.map_err(|e| InferenceError::SessionCreate(e.to_string()))?;
    if !available {
        warn!(
            "{} is not available in this ONNX Runtime build, falling back to {}",
            descriptor.ep_name(),
            CPU_EXECUTION_PROVIDER
        );
    }

    Ok((builder, available))
}

fn active_providers(descriptor: &ProviderDescriptor, available: bool) -> Vec<String> {
    let mut providers = Vec::with_capacity(2);
    if available && descriptor.ep_name() != CPU_EXECUTION_PROVIDER {
        providers.push(descriptor.ep_name().to_string());
    }
    providers.push(CPU_EXECUTION_PROVIDER.to_string());
    providers
}

fn tensor_info(name: &str, value_type: &ValueType) -> TensorInfo {
    let ValueType::Tensor { ty, shape, .. } = value_type else {
        return TensorInfo {
            name: name.to_string(),
            dims: Vec::new(),
            dtype: None,
            type_name: value_type.to_string(),
        };
    };

    let dims = shape.iter().map(|&d| Dim::from_declared(d)).collect();
    match tensor_type(*ty) {
        Some(dtype) => TensorInfo::new(name, dims, dtype),
        None => TensorInfo {
            name: name.to_string(),
            dims,
            dtype: None,
            type_name: ty.to_string(),
        },
    }
}

fn tensor_type(ty: TensorElementType) -> Option<TensorType> {
    match ty {
        TensorElementType::Float32 => Some(TensorType::Float32),
        TensorElementType::Float64 => Some(TensorType::Float64),
        TensorElementType::Int32 => Some(TensorType::Int32),
        TensorElementType::Int64 => Some(TensorType::Int64),
        TensorElementType::Uint8 => Some(TensorType::Uint8),
        _ => None,
    }
}
