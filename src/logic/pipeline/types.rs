//! Pipeline Types
//!
//! Request in, immutable result out.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::confidence::{Caveat, ConfidenceBreakdown};
use crate::logic::explain::FeatureContribution;
use crate::logic::features::{FeatureVector, RawFeatures};
use crate::logic::imputation::ImputationRecord;
use crate::logic::risk::RiskLevel;

// ============================================================================
// REQUEST
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssessmentRequest {
    pub features: RawFeatures,
    #[serde(default)]
    pub ecological_zone: Option<String>,
    /// Provider-reported quality in [0, 1]
    #[serde(default)]
    pub data_quality: Option<f64>,
    /// Recency of the measurements in [0, 1]
    #[serde(default)]
    pub freshness: Option<f64>,
    /// Free-form provenance label, e.g. "Earth Engine"
    #[serde(default)]
    pub data_source: Option<String>,
}

impl AssessmentRequest {
    pub fn new(features: RawFeatures) -> Self {
        Self {
            features,
            ..Self::default()
        }
    }

    pub fn zone(mut self, zone: impl Into<String>) -> Self {
        self.ecological_zone = Some(zone.into());
        self
    }

    pub fn data_quality(mut self, quality: f64) -> Self {
        self.data_quality = Some(quality);
        self
    }

    pub fn freshness(mut self, freshness: f64) -> Self {
        self.freshness = Some(freshness);
        self
    }

    pub fn data_source(mut self, source: impl Into<String>) -> Self {
        self.data_source = Some(source.into());
        self
    }
}

// ============================================================================
// RESULT
// ============================================================================

/// Produced once per accepted request; read-only afterwards.
/// Serialize-only: a result can only come out of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    assessment_id: Uuid,
    risk_score: f64,
    risk_level: RiskLevel,
    confidence: f64,
    confidence_breakdown: ConfidenceBreakdown,
    imputation_record: ImputationRecord,
    model_version: String,
    features: FeatureVector,
    caveats: Vec<Caveat>,
    contributions: Vec<FeatureContribution>,
    data_source: Option<String>,
    assessed_at: chrono::DateTime<chrono::Utc>,
}

/// Field bag for building a `PredictionResult` inside the crate
pub(crate) struct ResultParts {
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub confidence_breakdown: ConfidenceBreakdown,
    pub imputation_record: ImputationRecord,
    pub model_version: String,
    pub features: FeatureVector,
    pub caveats: Vec<Caveat>,
    pub contributions: Vec<FeatureContribution>,
    pub data_source: Option<String>,
}

impl PredictionResult {
    pub(crate) fn from_parts(parts: ResultParts) -> Self {
        Self {
            assessment_id: Uuid::new_v4(),
            risk_score: parts.risk_score,
            risk_level: parts.risk_level,
            confidence: parts.confidence_breakdown.confidence,
            confidence_breakdown: parts.confidence_breakdown,
            imputation_record: parts.imputation_record,
            model_version: parts.model_version,
            features: parts.features,
            caveats: parts.caveats,
            contributions: parts.contributions,
            data_source: parts.data_source,
            assessed_at: chrono::Utc::now(),
        }
    }

    pub fn assessment_id(&self) -> Uuid {
        self.assessment_id
    }

    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.risk_level
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn confidence_breakdown(&self) -> &ConfidenceBreakdown {
        &self.confidence_breakdown
    }

    pub fn imputation_record(&self) -> &ImputationRecord {
        &self.imputation_record
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Corrected vector the model actually scored
    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn caveats(&self) -> &[Caveat] {
        &self.caveats
    }

    pub fn contributions(&self) -> &[FeatureContribution] {
        &self.contributions
    }

    pub fn data_source(&self) -> Option<&str> {
        self.data_source.as_deref()
    }

    pub fn assessed_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.assessed_at
    }

    pub fn guidance(&self) -> &'static [&'static str] {
        self.risk_level.guidance()
    }
}
