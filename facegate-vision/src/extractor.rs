use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
#[cfg(any(feature = "openvino", feature = "cuda"))]
use ort::ep::{self, ExecutionProvider};
use ort::{
    session::{
        builder::{GraphOptimizationLevel, SessionBuilder},
        Session,
    },
    value::Value,
};

use crate::preprocess::preprocess;

pub fn session_builder() -> Result<SessionBuilder> {
    #[allow(unused_mut)]
    let mut builder = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(ort::Error::<()>::from)?;

    #[cfg(feature = "openvino")]
    {
        let ep = ep::OpenVINO::default();
        if ep.is_available()? {
            ep.register(&mut builder)?;
        } else {
            log::warn!("openvino feature is enabled, onnx runtime not compiled with openvino")
        }
    }

    #[cfg(feature = "cuda")]
    {
        let ep = ep::CUDA::default();
        if ep.is_available()? {
            ep.register(&mut builder);
        } else {
            log::warn!("cuda feature is enabled, onnx runtime not compiled with cuda")
        }
    }

    Ok(builder)
}

/// ONNX-backed embedding extractor: one inference session plus the input
/// resolution the model was trained for.
pub struct OnnxExtractor {
    session: Session,
    input_size: (u32, u32),
}

impl OnnxExtractor {
    /// Load the embedding model from disk. Model weights are deployment
    /// artifacts, not shipped with the binary.
    pub fn from_file(model_path: &Path, input_size: (u32, u32)) -> Result<Self> {
        let session = session_builder()?
            .commit_from_file(model_path)
            .with_context(|| format!("loading embedding model {}", model_path.display()))?;
        Ok(Self {
            session,
            input_size,
        })
    }

    /// Run the model on one image and return the raw embedding vector.
    ///
    /// The output is not normalized here; callers compute the full cosine
    /// quotient, so the vector's magnitude is irrelevant to matching.
    pub fn extract(&mut self, img: &DynamicImage) -> Result<Vec<f32>> {
        let input = preprocess(img, self.input_size).context("preprocessing image")?;
        let input_tensor = Value::from_array(input)?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<i64> = shape.iter().copied().collect();
        embedding_from_output(&dims, data)
    }
}

/// Pull the embedding row out of the model's output tensor. Expecting shape
/// [1, D]; any other rank falls back to the flat data length. A tensor with
/// no data is an error, never a panic.
fn embedding_from_output(shape: &[i64], data: &[f32]) -> Result<Vec<f32>> {
    let embedding_len = if shape.len() == 2 {
        shape[1] as usize
    } else {
        data.len()
    };
    match data.get(..embedding_len) {
        Some(row) if !row.is_empty() => Ok(row.to_vec()),
        _ => anyhow::bail!("model returned an empty embedding tensor (shape {shape:?})"),
    }
}
