//! Commands - API cho caller bên ngoài (CLI, service wrapper)
//!
//! Mọi lỗi được chuyển thành `ErrorResponse` có cấu trúc:
//! kind + message + tên feature + giá trị vi phạm.

use serde::{Deserialize, Serialize};

use super::engine_status::EngineStatus;
use crate::logic::errors::{ErrorKind, RangeViolation, RiskError};
use crate::logic::features::LayoutInfo;
use crate::logic::pipeline::{AssessmentRequest, PredictionResult, RiskPipeline};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Rejection as seen by API callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<RangeViolation>,
}

impl From<RiskError> for ErrorResponse {
    fn from(err: RiskError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            features: err.features(),
            violations: err.violations().to_vec(),
        }
    }
}

/// One entry of a batch response, in request order
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchItem {
    Accepted { result: PredictionResult },
    Rejected { error: ErrorResponse },
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub accepted: usize,
    pub rejected: usize,
    pub items: Vec<BatchItem>,
}

// ============================================================================
// COMMANDS
// ============================================================================

pub fn assess_location(
    pipeline: &RiskPipeline,
    request: &AssessmentRequest,
) -> Result<PredictionResult, ErrorResponse> {
    pipeline.assess(request).map_err(ErrorResponse::from)
}

pub fn assess_batch(pipeline: &RiskPipeline, requests: &[AssessmentRequest]) -> BatchResponse {
    let items: Vec<BatchItem> = pipeline
        .assess_batch(requests)
        .into_iter()
        .map(|outcome| match outcome {
            Ok(result) => BatchItem::Accepted { result },
            Err(err) => BatchItem::Rejected { error: err.into() },
        })
        .collect();

    let accepted = items
        .iter()
        .filter(|i| matches!(i, BatchItem::Accepted { .. }))
        .count();

    BatchResponse {
        accepted,
        rejected: items.len() - accepted,
        items,
    }
}

pub fn get_feature_schema() -> LayoutInfo {
    LayoutInfo::current()
}

pub fn get_engine_status(pipeline: &RiskPipeline) -> EngineStatus {
    EngineStatus::collect(pipeline)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::config::Configuration;
    use crate::logic::features::RawFeaturesBuilder;
    use crate::logic::model::EnsembleModel;
    use std::sync::Arc;

    fn pipeline() -> RiskPipeline {
        let model = EnsembleModel::builtin().unwrap();
        RiskPipeline::new(Configuration::default(), Arc::new(model)).unwrap()
    }

    fn raw() -> RawFeaturesBuilder {
        RawFeaturesBuilder::new()
            .rainfall_12mo(1200.0)
            .temp_mean_c(28.0)
            .ndvi_mean(0.6)
            .pop_density(150.0)
            .elevation(200.0)
            .water_coverage(15.0)
    }

    #[test]
    fn test_error_response_from_range_error() {
        let p = pipeline();
        let request = AssessmentRequest::new(raw().pop_density(-5.0).build());
        let err = assess_location(&p, &request).unwrap_err();

        assert_eq!(err.kind, ErrorKind::Range);
        assert_eq!(err.features, vec!["pop_density".to_string()]);
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].value, -5.0);

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "range");
    }

    #[test]
    fn test_batch_counts() {
        let p = pipeline();
        let requests = vec![
            AssessmentRequest::new(raw().build()),
            AssessmentRequest::new(raw().rainfall_12mo(0.0).build()),
            AssessmentRequest::new(raw().set("humidity", 0.4).build()),
        ];
        let response = assess_batch(&p, &requests);
        assert_eq!(response.accepted, 1);
        assert_eq!(response.rejected, 2);
        assert!(matches!(response.items[0], BatchItem::Accepted { .. }));
        match &response.items[1] {
            BatchItem::Rejected { error } => assert_eq!(error.kind, ErrorKind::ImputationExhausted),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_engine_status_reflects_counters() {
        let p = pipeline();
        let _ = assess_location(&p, &AssessmentRequest::new(raw().build()));
        let _ = assess_location(&p, &AssessmentRequest::new(raw().ndvi_mean(9.0).build()));

        let status = get_engine_status(&p);
        assert_eq!(status.pipeline.accepted, 1);
        assert_eq!(status.pipeline.rejected, 1);
        assert_eq!(status.model.engine, "ensemble");
        assert!(status.model.explainable);
        assert_eq!(status.feature_count, 6);
    }

    #[test]
    fn test_schema_listing() {
        let schema = get_feature_schema();
        let names: Vec<&str> = schema.features.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            vec!["rainfall_12mo", "temp_mean_c", "ndvi_mean", "pop_density", "elevation", "water_coverage"]
        );
    }
}
