//! Pipeline Orchestrator
//!
//! Validating → Imputing → Scoring → Classifying → Done, or Rejected.
//! Holds only read-only shared state (config, model) plus counters, so one
//! pipeline serves any number of threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::state::PipelineState;
use super::types::{AssessmentRequest, PredictionResult, ResultParts};
use crate::constants::BATCH_CHUNK_SIZE;
use crate::logic::config::{Configuration, ImputationStrategy};
use crate::logic::confidence::{self, Caveat};
use crate::logic::errors::{RangeViolation, RiskError, RiskResult};
use crate::logic::explain;
use crate::logic::features::validator::{inspect_vector, range_violations};
use crate::logic::features::{
    inspect, layout_hash, FeatureVector, FEATURE_SCHEMA, FEATURE_VERSION,
};
use crate::logic::imputation::{impute, ImputationRecord};
use crate::logic::model::{ensure_probability, RiskModel};
use crate::logic::risk::classify;

/// Outcome of one request plus the states it passed through
#[derive(Debug, Clone)]
pub struct Assessment {
    pub trace: Vec<PipelineState>,
    pub outcome: RiskResult<PredictionResult>,
}

impl Assessment {
    pub fn final_state(&self) -> PipelineState {
        self.trace.last().copied().unwrap_or(PipelineState::Validating)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCounters {
    pub accepted: u64,
    pub rejected: u64,
}

pub struct RiskPipeline {
    config: Arc<Configuration>,
    model: Arc<dyn RiskModel>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

/// Request signal must be a finite value in [0, 1]
fn check_signal(name: &str, value: Option<f64>) -> RiskResult<()> {
    match value {
        Some(v) if !(v.is_finite() && (0.0..=1.0).contains(&v)) => {
            Err(RiskError::range(name, v, 0.0, 1.0))
        }
        _ => Ok(()),
    }
}

/// Caveats about how geographical imputation actually went
fn zone_caveats(
    strategy: ImputationStrategy,
    zone: Option<&str>,
    record: &ImputationRecord,
) -> Vec<Caveat> {
    if strategy != ImputationStrategy::GeographicalContext || record.is_empty() {
        return Vec::new();
    }
    if zone.is_none() {
        return vec![Caveat::ZoneMissing];
    }
    record
        .iter()
        .filter(|e| e.strategy_used == ImputationStrategy::GlobalDefault)
        .map(|e| Caveat::ZoneFallback {
            feature: e.feature.name().to_string(),
        })
        .collect()
}

impl RiskPipeline {
    /// Validates the configuration and the model's feature layout once.
    pub fn new(config: Configuration, model: Arc<dyn RiskModel>) -> RiskResult<Self> {
        config.validate()?;

        let meta = model.metadata();
        if meta.feature_version != FEATURE_VERSION || meta.layout_hash != layout_hash() {
            return Err(RiskError::model_unavailable(format!(
                "model {} expects feature layout v{} ({:08x}), current is v{} ({:08x})",
                meta.qualified_version(),
                meta.feature_version,
                meta.layout_hash,
                FEATURE_VERSION,
                layout_hash()
            )));
        }

        log::info!(
            "Risk pipeline ready: model={}, strategy={}, min_quality={}",
            model.model_version(),
            config.imputation_strategy,
            config.minimum_data_quality
        );

        Ok(Self {
            config: Arc::new(config),
            model,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    pub fn counters(&self) -> PipelineCounters {
        PipelineCounters {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }

    /// Run one request and keep the state trace
    pub fn run(&self, request: &AssessmentRequest) -> Assessment {
        let mut trace = Vec::with_capacity(6);
        let outcome = self.execute(request, &mut trace);

        match &outcome {
            Ok(result) => {
                trace.push(PipelineState::Done);
                self.accepted.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "Assessment {} accepted: score={:.3} level={} confidence={:.3} imputed={}",
                    result.assessment_id(),
                    result.risk_score(),
                    result.risk_level(),
                    result.confidence(),
                    result.imputation_record().len()
                );
            }
            Err(err) => {
                let stage = trace.last().copied().unwrap_or(PipelineState::Validating);
                trace.push(PipelineState::Rejected(err.kind()));
                self.rejected.fetch_add(1, Ordering::Relaxed);
                log::warn!("Assessment rejected during {}: {}", stage, err);
            }
        }

        Assessment { trace, outcome }
    }

    pub fn assess(&self, request: &AssessmentRequest) -> RiskResult<PredictionResult> {
        self.run(request).outcome
    }

    /// Independent requests in parallel; output order matches input order
    pub fn assess_batch(&self, requests: &[AssessmentRequest]) -> Vec<RiskResult<PredictionResult>> {
        requests
            .par_iter()
            .with_min_len(BATCH_CHUNK_SIZE)
            .map(|request| self.assess(request))
            .collect()
    }

    fn execute(
        &self,
        request: &AssessmentRequest,
        trace: &mut Vec<PipelineState>,
    ) -> RiskResult<PredictionResult> {
        let config = self.config.as_ref();

        // ---- Validating ----
        trace.push(PipelineState::Validating);

        check_signal("data_quality", request.data_quality)?;
        check_signal("freshness", request.freshness)?;

        if let Some(quality) = request.data_quality {
            if quality < config.minimum_data_quality {
                return Err(RiskError::InsufficientDataQuality {
                    data_quality: quality,
                    minimum: config.minimum_data_quality,
                });
            }
        }

        let report = inspect(&request.features, &FEATURE_SCHEMA);
        if let Some(err) = report.schema_error() {
            return Err(err);
        }
        let vector = FeatureVector::from_raw(&request.features)?;

        let violations = range_violations(&vector, &report, &FEATURE_SCHEMA);
        if !violations.is_empty() {
            return Err(RiskError::Range { violations });
        }

        // ---- Imputing ----
        trace.push(PipelineState::Imputing);

        let zone = request.ecological_zone.as_deref();
        let imputed = impute(&vector, &report, config, zone);
        if !imputed.is_complete() {
            return Err(RiskError::ImputationExhausted {
                features: imputed.unresolved.iter().map(|id| id.name().to_string()).collect(),
                strategy: config.imputation_strategy,
            });
        }

        // Defaults are validated at start-up, so this only fires on a broken invariant
        let corrected = inspect_vector(&imputed.vector, &FEATURE_SCHEMA);
        if !corrected.is_clean() {
            let violations: Vec<RangeViolation> = imputed
                .vector
                .iter()
                .filter(|(id, _)| !corrected.status(*id).is_ok())
                .map(|(id, value)| RangeViolation {
                    field: id.name().to_string(),
                    value,
                    min: id.spec().min,
                    max: id.spec().max,
                })
                .collect();
            return Err(RiskError::Range { violations });
        }

        // ---- Scoring ----
        trace.push(PipelineState::Scoring);

        let risk_score = ensure_probability(self.model.predict(&imputed.vector)?)?;
        let model_version = self.model.model_version();

        // ---- Classifying ----
        trace.push(PipelineState::Classifying);

        let risk_level = classify(risk_score, &config.risk_thresholds)?;

        let assessment = confidence::score(
            &imputed.record,
            request.data_quality,
            request.freshness,
            &config.confidence_weights,
        );
        let mut caveats = assessment.caveats;
        caveats.extend(zone_caveats(config.imputation_strategy, zone, &imputed.record));

        let contributions = self
            .model
            .feature_importances()
            .and_then(|importances| explain::explain(&imputed.vector, importances))
            .map(|result| result.contributions)
            .unwrap_or_default();

        Ok(PredictionResult::from_parts(ResultParts {
            risk_score,
            risk_level,
            confidence_breakdown: assessment.breakdown,
            imputation_record: imputed.record,
            model_version,
            features: imputed.vector,
            caveats,
            contributions,
            data_source: request.data_source.clone(),
        }))
    }
}
