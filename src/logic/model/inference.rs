//! Inference - Risk model capability
//!
//! Mọi model (ensemble JSON, ONNX, cache) đều đi qua trait này.
//! Dễ dàng swap model mà không đụng tới pipeline.

use serde::{Deserialize, Serialize};

use crate::logic::errors::{RiskError, RiskResult};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Identity of a loaded model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_name: String,
    pub model_version: String,
    /// "ensemble" or "onnx"
    pub engine: String,
    /// SHA-256 of the artifact bytes (hex)
    pub sha256: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl ModelMetadata {
    /// `name@version+digest12`, what every result reports
    pub fn qualified_version(&self) -> String {
        let short = self.sha256.get(..12).unwrap_or(&self.sha256);
        format!("{}@{}+{}", self.model_name, self.model_version, short)
    }
}

/// Training-time statistics used to explain a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportances {
    /// Per-feature training mean
    pub reference: [f64; FEATURE_COUNT],
    /// Per-feature training standard deviation
    pub scale: [f64; FEATURE_COUNT],
    /// Relative importance, summing to ~1
    pub weights: [f64; FEATURE_COUNT],
}

// ============================================================================
// RISK MODEL TRAIT
// ============================================================================

/// Trait cho risk models (ensemble, ONNX, etc.)
///
/// Callers guarantee every feature of `features` is in range.
pub trait RiskModel: Send + Sync {
    /// Malaria-risk probability in [0, 1]
    fn predict(&self, features: &FeatureVector) -> RiskResult<f64>;

    fn metadata(&self) -> &ModelMetadata;

    fn model_version(&self) -> String {
        self.metadata().qualified_version()
    }

    fn feature_importances(&self) -> Option<&FeatureImportances> {
        None
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// A score the model produced is either a probability or a failure
pub fn ensure_probability(score: f64) -> RiskResult<f64> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(RiskError::model_unavailable(format!(
            "model produced {} which is not a probability",
            score
        )))
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
