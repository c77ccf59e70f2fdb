use serde::{Deserialize, Serialize};

use crate::logic::config::ImputationStrategy;
use crate::logic::features::{layout_hash, FEATURE_COUNT, FEATURE_VERSION};
use crate::logic::pipeline::RiskPipeline;
use crate::logic::risk::RiskThresholds;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub feature_version: u8,
    pub layout_hash: u32,
    pub feature_count: usize,

    pub model: ModelStatus,
    pub pipeline: PipelineStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub engine: String, // "ensemble" | "onnx"
    pub model_version: String,
    pub sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    pub explainable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub imputation_strategy: ImputationStrategy,
    pub minimum_data_quality: f64,
    pub risk_thresholds: RiskThresholds,
    pub zones: Vec<String>,
    pub accepted: u64,
    pub rejected: u64,
}

impl EngineStatus {
    pub fn collect(pipeline: &RiskPipeline) -> Self {
        let model = pipeline.model();
        let meta = model.metadata();
        let config = pipeline.config();
        let counters = pipeline.counters();

        Self {
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            model: ModelStatus {
                engine: meta.engine.clone(),
                model_version: model.model_version(),
                sha256: meta.sha256.clone(),
                loaded_at: meta.loaded_at,
                explainable: model.feature_importances().is_some(),
            },
            pipeline: PipelineStatus {
                imputation_strategy: config.imputation_strategy,
                minimum_data_quality: config.minimum_data_quality,
                risk_thresholds: config.risk_thresholds,
                zones: config.zone_defaults.keys().cloned().collect(),
                accepted: counters.accepted,
                rejected: counters.rejected,
            },
        }
    }
}
