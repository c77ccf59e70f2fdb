//! Ensemble Model - JSON artifact
//!
//! Standard scaler followed by a bag of logistic members whose
//! probabilities are averaged. The artifact is identified by name,
//! version and the SHA-256 of its bytes.

use std::path::Path;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::inference::{
    ensure_probability, sha256_hex, sigmoid, FeatureImportances, ModelMetadata, RiskModel,
};
use crate::logic::errors::{RiskError, RiskResult};
use crate::logic::features::{layout_hash, FeatureVector, FEATURE_COUNT, FEATURE_VERSION};
use crate::logic::features::layout::validate_layout;

/// Reference artifact shipped with the crate
const BUILTIN_ARTIFACT: &[u8] = include_bytes!("../../../models/risk_model.json");

// ============================================================================
// ARTIFACT FORMAT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleArtifact {
    pub name: String,
    pub version: String,
    pub feature_version: u8,
    #[serde(default)]
    pub layout_hash: Option<u32>,
    pub scaler: ScalerParams,
    pub members: Vec<MemberParams>,
    #[serde(default)]
    pub feature_importances: Option<Vec<f64>>,
}

fn to_fixed(name: &str, values: &[f64]) -> RiskResult<[f64; FEATURE_COUNT]> {
    let fixed: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
        RiskError::model_unavailable(format!(
            "{} has {} values, expected {}",
            name,
            values.len(),
            FEATURE_COUNT
        ))
    })?;
    if fixed.iter().any(|v| !v.is_finite()) {
        return Err(RiskError::model_unavailable(format!("{} contains non-finite values", name)));
    }
    Ok(fixed)
}

impl EnsembleArtifact {
    /// Artifact must have been trained on the current feature layout
    fn check_layout(&self) -> RiskResult<u32> {
        match self.layout_hash {
            Some(hash) => validate_layout(self.feature_version, hash)
                .map_err(|e| RiskError::model_unavailable(e.to_string()))?,
            None if self.feature_version != FEATURE_VERSION => {
                return Err(RiskError::model_unavailable(format!(
                    "artifact built for feature layout v{}, current is v{}",
                    self.feature_version, FEATURE_VERSION
                )));
            }
            None => {}
        }
        Ok(layout_hash())
    }
}

// ============================================================================
// ENSEMBLE MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct EnsembleModel {
    mean: Array1<f64>,
    scale: Array1<f64>,
    /// One row per member
    weights: Array2<f64>,
    biases: Array1<f64>,
    importances: Option<FeatureImportances>,
    metadata: ModelMetadata,
}

impl EnsembleModel {
    pub fn from_bytes(bytes: &[u8]) -> RiskResult<Self> {
        let artifact: EnsembleArtifact = serde_json::from_slice(bytes)
            .map_err(|e| RiskError::model_unavailable(format!("malformed ensemble artifact: {}", e)))?;
        Self::from_artifact(artifact, sha256_hex(bytes))
    }

    pub fn load(path: &Path) -> RiskResult<Self> {
        log::info!("Loading ensemble model from: {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| {
            RiskError::model_unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let model = Self::from_bytes(&bytes)?;
        log::info!("Ensemble model loaded: {}", model.model_version());
        Ok(model)
    }

    /// Reference model bundled with the crate
    pub fn builtin() -> RiskResult<Self> {
        Self::from_bytes(BUILTIN_ARTIFACT)
    }

    fn from_artifact(artifact: EnsembleArtifact, sha256: String) -> RiskResult<Self> {
        let layout_hash = artifact.check_layout()?;

        let mean = to_fixed("scaler.mean", &artifact.scaler.mean)?;
        let scale = to_fixed("scaler.scale", &artifact.scaler.scale)?;
        if scale.iter().any(|s| *s <= 0.0) {
            return Err(RiskError::model_unavailable("scaler.scale must be positive"));
        }

        if artifact.members.is_empty() {
            return Err(RiskError::model_unavailable("ensemble has no members"));
        }

        let mut flat = Vec::with_capacity(artifact.members.len() * FEATURE_COUNT);
        let mut biases = Vec::with_capacity(artifact.members.len());
        for (i, member) in artifact.members.iter().enumerate() {
            flat.extend_from_slice(&to_fixed(&format!("members[{}].weights", i), &member.weights)?);
            if !member.bias.is_finite() {
                return Err(RiskError::model_unavailable(format!("members[{}].bias is not finite", i)));
            }
            biases.push(member.bias);
        }
        let weights = Array2::from_shape_vec((artifact.members.len(), FEATURE_COUNT), flat)
            .map_err(|e| RiskError::model_unavailable(format!("member matrix error: {}", e)))?;

        let importances = match &artifact.feature_importances {
            Some(values) => Some(FeatureImportances {
                reference: mean,
                scale,
                weights: to_fixed("feature_importances", values)?,
            }),
            None => None,
        };

        let metadata = ModelMetadata {
            model_name: artifact.name,
            model_version: artifact.version,
            engine: "ensemble".to_string(),
            sha256,
            feature_version: artifact.feature_version,
            layout_hash,
            loaded_at: chrono::Utc::now(),
        };

        Ok(Self {
            mean: Array1::from(mean.to_vec()),
            scale: Array1::from(scale.to_vec()),
            weights,
            biases: Array1::from(biases),
            importances,
            metadata,
        })
    }

    pub fn member_count(&self) -> usize {
        self.biases.len()
    }
}

impl RiskModel for EnsembleModel {
    fn predict(&self, features: &FeatureVector) -> RiskResult<f64> {
        let x = Array1::from(features.as_slice().to_vec());
        let standardized = (&x - &self.mean) / &self.scale;
        let logits = self.weights.dot(&standardized) + &self.biases;
        let probability = logits
            .mapv(sigmoid)
            .mean()
            .ok_or_else(|| RiskError::model_unavailable("ensemble has no members"))?;
        ensure_probability(probability)
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn feature_importances(&self) -> Option<&FeatureImportances> {
        self.importances.as_ref()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::errors::ErrorKind;
    use crate::logic::features::{FeatureId, RawFeaturesBuilder};
    use std::io::Write;

    fn artifact() -> EnsembleArtifact {
        EnsembleArtifact {
            name: "test-ensemble".into(),
            version: "0.1.0".into(),
            feature_version: FEATURE_VERSION,
            layout_hash: Some(layout_hash()),
            scaler: ScalerParams {
                mean: vec![0.0; FEATURE_COUNT],
                scale: vec![1.0; FEATURE_COUNT],
            },
            members: vec![MemberParams {
                weights: vec![0.0; FEATURE_COUNT],
                bias: 0.0,
            }],
            feature_importances: None,
        }
    }

    fn bytes(artifact: &EnsembleArtifact) -> Vec<u8> {
        serde_json::to_vec(artifact).unwrap()
    }

    fn high_risk() -> FeatureVector {
        FeatureVector::from_raw(
            &RawFeaturesBuilder::new()
                .rainfall_12mo(1200.0)
                .temp_mean_c(28.0)
                .ndvi_mean(0.6)
                .pop_density(150.0)
                .elevation(200.0)
                .water_coverage(15.0)
                .build(),
        )
        .unwrap()
    }

    fn low_risk() -> FeatureVector {
        FeatureVector::from_raw(
            &RawFeaturesBuilder::new()
                .rainfall_12mo(800.0)
                .temp_mean_c(18.0)
                .ndvi_mean(0.3)
                .pop_density(10.0)
                .elevation(1500.0)
                .water_coverage(2.0)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn test_zero_weights_give_half() {
        let model = EnsembleModel::from_bytes(&bytes(&artifact())).unwrap();
        assert_eq!(model.predict(&high_risk()).unwrap(), 0.5);
    }

    #[test]
    fn test_members_are_averaged() {
        let mut a = artifact();
        a.members = vec![
            MemberParams { weights: vec![0.0; FEATURE_COUNT], bias: 50.0 },
            MemberParams { weights: vec![0.0; FEATURE_COUNT], bias: -50.0 },
        ];
        let model = EnsembleModel::from_bytes(&bytes(&a)).unwrap();
        assert_eq!(model.member_count(), 2);
        assert!((model.predict(&high_risk()).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_standardization_applied() {
        let mut a = artifact();
        a.scaler.mean = vec![1000.0, 25.0, 0.5, 100.0, 500.0, 10.0];
        a.scaler.scale = vec![100.0, 1.0, 0.1, 50.0, 100.0, 5.0];
        a.members[0].weights = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let model = EnsembleModel::from_bytes(&bytes(&a)).unwrap();

        let mut v = high_risk();
        v.set(FeatureId::Rainfall12mo, 1000.0);
        assert!((model.predict(&v).unwrap() - 0.5).abs() < 1e-12);
        v.set(FeatureId::Rainfall12mo, 1100.0);
        assert!((model.predict(&v).unwrap() - sigmoid(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_builtin_artifact_ranks_examples() {
        let model = EnsembleModel::builtin().unwrap();
        let high = model.predict(&high_risk()).unwrap();
        let low = model.predict(&low_risk()).unwrap();
        assert!(high > low, "high={} low={}", high, low);
        assert!(model.feature_importances().is_some());
        assert_eq!(model.metadata().engine, "ensemble");
    }

    #[test]
    fn test_version_includes_digest() {
        let raw = bytes(&artifact());
        let model = EnsembleModel::from_bytes(&raw).unwrap();
        let digest = sha256_hex(&raw);
        assert_eq!(model.metadata().sha256, digest);
        assert_eq!(model.model_version(), format!("test-ensemble@0.1.0+{}", &digest[..12]));
    }

    #[test]
    fn test_deterministic() {
        let model = EnsembleModel::builtin().unwrap();
        let v = high_risk();
        let first = model.predict(&v).unwrap();
        for _ in 0..10 {
            assert_eq!(model.predict(&v).unwrap().to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_rejects_layout_mismatch() {
        let mut a = artifact();
        a.feature_version = FEATURE_VERSION + 1;
        a.layout_hash = None;
        let err = EnsembleModel::from_bytes(&bytes(&a)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);

        let mut b = artifact();
        b.layout_hash = Some(layout_hash().wrapping_add(1));
        assert!(EnsembleModel::from_bytes(&bytes(&b)).is_err());
    }

    #[test]
    fn test_rejects_malformed_artifacts() {
        assert!(EnsembleModel::from_bytes(b"not json").is_err());

        let mut short = artifact();
        short.scaler.mean = vec![0.0; 5];
        assert!(EnsembleModel::from_bytes(&bytes(&short)).is_err());

        let mut zero_scale = artifact();
        zero_scale.scaler.scale[2] = 0.0;
        assert!(EnsembleModel::from_bytes(&bytes(&zero_scale)).is_err());

        let mut empty = artifact();
        empty.members.clear();
        assert!(EnsembleModel::from_bytes(&bytes(&empty)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes(&artifact())).unwrap();
        assert!(EnsembleModel::load(file.path()).is_ok());

        let err = EnsembleModel::load(&file.path().with_extension("missing")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }
}
