//! ONNX Risk Model - ONNX Runtime Integration
//!
//! Graph takes one `[1, 6]` f32 row of raw features (scaling is part of
//! the exported graph). The last value of the first output is read as the
//! positive-class probability, which covers both `[1, 1]` and `[1, 2]`
//! probability outputs.
//!
//! The graph itself carries no layout stamp, so every artifact ships with a
//! `<model>.meta.json` sidecar declaring the layout it was exported against.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::inference::{ensure_probability, sha256_hex, ModelMetadata, RiskModel};
use crate::logic::errors::{RiskError, RiskResult};
use crate::logic::features::layout::validate_layout;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

/// Declared identity of an ONNX artifact (the sidecar contents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnnxArtifactInfo {
    pub name: String,
    pub version: String,
    pub feature_version: u8,
    pub layout_hash: u32,
}

impl OnnxArtifactInfo {
    /// `model.onnx` -> `model.meta.json`
    pub fn sidecar_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("meta.json")
    }

    pub fn load(model_path: &Path) -> RiskResult<Self> {
        let path = Self::sidecar_path(model_path);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            RiskError::model_unavailable(format!(
                "ONNX layout sidecar missing: {} ({})",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            RiskError::model_unavailable(format!(
                "malformed ONNX layout sidecar {}: {}",
                path.display(),
                e
            ))
        })
    }
}

pub struct OnnxRiskModel {
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxRiskModel {
    pub fn load(path: &Path) -> RiskResult<Self> {
        log::info!("Loading ONNX model from: {}", path.display());

        let info = OnnxArtifactInfo::load(path)?;
        let bytes = std::fs::read(path).map_err(|e| {
            RiskError::model_unavailable(format!("Model not found: {} ({})", path.display(), e))
        })?;

        Self::from_bytes(&bytes, &info)
    }

    /// Layout is checked before the graph is parsed
    pub fn from_bytes(model_bytes: &[u8], info: &OnnxArtifactInfo) -> RiskResult<Self> {
        validate_layout(info.feature_version, info.layout_hash)
            .map_err(|e| RiskError::model_unavailable(e.to_string()))?;

        let session = Session::builder()
            .map_err(|e| RiskError::model_unavailable(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| RiskError::model_unavailable(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| RiskError::model_unavailable(format!("Load from memory error: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| RiskError::model_unavailable("No output defined"))?;

        let metadata = ModelMetadata {
            model_name: info.name.clone(),
            model_version: info.version.clone(),
            engine: "onnx".to_string(),
            sha256: sha256_hex(model_bytes),
            feature_version: info.feature_version,
            layout_hash: info.layout_hash,
            loaded_at: chrono::Utc::now(),
        };

        log::info!("ONNX model loaded successfully ({})", metadata.qualified_version());

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata,
        })
    }
}

impl RiskModel for OnnxRiskModel {
    fn predict(&self, features: &FeatureVector) -> RiskResult<f64> {
        let row: Vec<f32> = features.as_slice().iter().map(|v| *v as f32).collect();
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), row)
            .map_err(|e| RiskError::model_unavailable(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| RiskError::model_unavailable(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| RiskError::model_unavailable(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| RiskError::model_unavailable("No output"))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| RiskError::model_unavailable(format!("Extract error: {}", e)))?;

        let data = output_tensor.1;
        let probability = data
            .last()
            .copied()
            .ok_or_else(|| RiskError::model_unavailable("Empty output tensor"))?;

        ensure_probability(probability as f64)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::errors::ErrorKind;
    use crate::logic::features::{layout_hash, FEATURE_VERSION};

    fn info(feature_version: u8, hash: u32) -> OnnxArtifactInfo {
        OnnxArtifactInfo {
            name: "risk".to_string(),
            version: "2.0.0".to_string(),
            feature_version,
            layout_hash: hash,
        }
    }

    #[test]
    fn test_mismatched_layout_rejected_before_parsing() {
        let stale = info(FEATURE_VERSION, layout_hash() ^ 1);
        let err = OnnxRiskModel::from_bytes(b"not an onnx graph", &stale).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
        assert!(err.to_string().contains("feature layout mismatch"));

        let older = info(FEATURE_VERSION.wrapping_add(1), layout_hash());
        let err = OnnxRiskModel::from_bytes(b"not an onnx graph", &older).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }

    #[test]
    fn test_missing_sidecar_is_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("risk.onnx");
        std::fs::write(&model, b"graph").unwrap();

        let err = OnnxRiskModel::load(&model).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
        assert!(err.to_string().contains("sidecar"));
    }

    #[test]
    fn test_sidecar_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("risk.onnx");
        let declared = info(FEATURE_VERSION, layout_hash());
        std::fs::write(
            OnnxArtifactInfo::sidecar_path(&model),
            serde_json::to_string(&declared).unwrap(),
        )
        .unwrap();

        assert_eq!(OnnxArtifactInfo::sidecar_path(&model), dir.path().join("risk.meta.json"));
        assert_eq!(OnnxArtifactInfo::load(&model).unwrap(), declared);
    }
}
