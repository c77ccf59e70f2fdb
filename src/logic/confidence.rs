//! Confidence Scorer
//!
//! Confidence = weighted average of completeness, data quality and
//! freshness, clamped to [0, 1].

use serde::{Deserialize, Serialize};

use super::config::ConfidenceWeights;
use super::features::FEATURE_COUNT;
use super::imputation::ImputationRecord;

/// Notes attached to a result when the inputs were not fully trustworthy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Caveat {
    /// No data quality signal supplied; 1.0 assumed
    DataQualityDefaulted,
    /// No freshness signal supplied; 1.0 assumed
    FreshnessDefaulted,
    /// Zone table had no value for a feature; global default used
    ZoneFallback { feature: String },
    /// Geographical imputation requested without an ecological zone
    ZoneMissing,
}

impl std::fmt::Display for Caveat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caveat::DataQualityDefaulted => write!(f, "data quality not supplied, assumed 1.0"),
            Caveat::FreshnessDefaulted => write!(f, "freshness not supplied, assumed 1.0"),
            Caveat::ZoneFallback { feature } => {
                write!(f, "no zone default for {}, global default used", feature)
            }
            Caveat::ZoneMissing => write!(f, "no ecological zone supplied, global defaults used"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBreakdown {
    pub completeness: f64,
    pub data_quality: f64,
    pub freshness: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceAssessment {
    pub breakdown: ConfidenceBreakdown,
    pub caveats: Vec<Caveat>,
}

impl ConfidenceAssessment {
    pub fn confidence(&self) -> f64 {
        self.breakdown.confidence
    }
}

/// Share of features that were measured rather than imputed
pub fn completeness(record: &ImputationRecord) -> f64 {
    let imputed = record.len().min(FEATURE_COUNT);
    1.0 - imputed as f64 / FEATURE_COUNT as f64
}

pub fn score(
    record: &ImputationRecord,
    data_quality: Option<f64>,
    freshness: Option<f64>,
    weights: &ConfidenceWeights,
) -> ConfidenceAssessment {
    let mut caveats = Vec::new();

    let data_quality = data_quality.unwrap_or_else(|| {
        caveats.push(Caveat::DataQualityDefaulted);
        1.0
    });
    let freshness = freshness.unwrap_or_else(|| {
        caveats.push(Caveat::FreshnessDefaulted);
        1.0
    });
    let completeness = completeness(record);

    let w = weights.normalized();
    let raw = w.completeness * completeness + w.data_quality * data_quality + w.freshness * freshness;

    ConfidenceAssessment {
        breakdown: ConfidenceBreakdown {
            completeness,
            data_quality,
            freshness,
            confidence: raw.clamp(0.0, 1.0),
        },
        caveats,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::ImputationStrategy;
    use crate::logic::features::FeatureId;
    use crate::logic::imputation::ImputationEntry;

    fn record_with(features: &[FeatureId]) -> ImputationRecord {
        let mut record = ImputationRecord::new();
        for &feature in features {
            record.push(ImputationEntry {
                feature,
                original_value: 0.0,
                imputed_value: 1.0,
                strategy_used: ImputationStrategy::GlobalDefault,
                zone: None,
            });
        }
        record
    }

    #[test]
    fn test_full_inputs_full_confidence() {
        let result = score(&ImputationRecord::new(), Some(1.0), Some(1.0), &ConfidenceWeights::default());
        assert!((result.confidence() - 1.0).abs() < 1e-12);
        assert!(result.caveats.is_empty());
    }

    #[test]
    fn test_completeness_drops_per_imputation() {
        let one = record_with(&[FeatureId::TempMeanC]);
        assert!((completeness(&one) - 5.0 / 6.0).abs() < 1e-12);

        let clean = score(&ImputationRecord::new(), Some(0.9), Some(0.9), &ConfidenceWeights::default());
        let imputed = score(&one, Some(0.9), Some(0.9), &ConfidenceWeights::default());
        assert!(imputed.confidence() < clean.confidence());
    }

    #[test]
    fn test_absent_signals_default_with_caveats() {
        let result = score(&ImputationRecord::new(), None, None, &ConfidenceWeights::default());
        assert_eq!(result.breakdown.data_quality, 1.0);
        assert_eq!(result.breakdown.freshness, 1.0);
        assert_eq!(
            result.caveats,
            vec![Caveat::DataQualityDefaulted, Caveat::FreshnessDefaulted]
        );
    }

    #[test]
    fn test_weighted_average() {
        let weights = ConfidenceWeights {
            completeness: 1.0,
            data_quality: 0.0,
            freshness: 0.0,
        };
        let result = score(&record_with(&[FeatureId::NdviMean, FeatureId::PopDensity]), Some(0.1), Some(0.1), &weights);
        assert!((result.confidence() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounded_for_every_record_size() {
        for n in 0..=FEATURE_COUNT {
            let features: Vec<FeatureId> = FeatureId::ALL[..n].to_vec();
            let result = score(&record_with(&features), Some(0.0), Some(0.0), &ConfidenceWeights::default());
            assert!((0.0..=1.0).contains(&result.confidence()));
        }
    }

    #[test]
    fn test_caveat_serialization() {
        let json = serde_json::to_string(&Caveat::ZoneFallback { feature: "ndvi_mean".into() }).unwrap();
        assert_eq!(json, r#"{"kind":"zone_fallback","feature":"ndvi_mean"}"#);
    }
}
