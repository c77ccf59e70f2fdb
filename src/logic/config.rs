//! Pipeline Configuration
//!
//! Loaded once at start-up, validated once, then shared read-only.
//! Precedence: environment overrides > JSON file > built-in defaults.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{RiskError, RiskResult};
use super::features::{FeatureId, FeatureSpec};
use super::risk::RiskThresholds;
use crate::constants;

// ============================================================================
// IMPUTATION STRATEGY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    /// Per-zone value, falling back to the global table
    GeographicalContext,
    /// Global per-feature default
    #[default]
    GlobalDefault,
    /// Leave missing values in place
    Skip,
}

impl ImputationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImputationStrategy::GeographicalContext => "geographical_context",
            ImputationStrategy::GlobalDefault => "global_default",
            ImputationStrategy::Skip => "skip",
        }
    }
}

impl std::fmt::Display for ImputationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImputationStrategy {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geographical_context" => Ok(ImputationStrategy::GeographicalContext),
            "global_default" => Ok(ImputationStrategy::GlobalDefault),
            "skip" => Ok(ImputationStrategy::Skip),
            other => Err(RiskError::configuration(format!(
                "unknown imputation strategy '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// CONFIDENCE WEIGHTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfidenceWeights {
    pub completeness: f64,
    pub data_quality: f64,
    pub freshness: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            completeness: 1.0 / 3.0,
            data_quality: 1.0 / 3.0,
            freshness: 1.0 / 3.0,
        }
    }
}

impl ConfidenceWeights {
    pub fn sum(&self) -> f64 {
        self.completeness + self.data_quality + self.freshness
    }

    pub fn validate(&self) -> RiskResult<()> {
        for (name, weight) in [
            ("completeness", self.completeness),
            ("data_quality", self.data_quality),
            ("freshness", self.freshness),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RiskError::configuration(format!(
                    "confidence weight '{}' must be a finite non-negative number (got {})",
                    name, weight
                )));
            }
        }
        if self.sum() <= 0.0 {
            return Err(RiskError::configuration(
                "confidence weights must not all be zero",
            ));
        }
        Ok(())
    }

    /// Weights scaled to sum to 1
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        Self {
            completeness: self.completeness / total,
            data_quality: self.data_quality / total,
            freshness: self.freshness / total,
        }
    }
}

// ============================================================================
// DEFAULT TABLES
// ============================================================================

/// Per-feature replacement values
pub type DefaultTable = BTreeMap<FeatureId, f64>;

/// Shipped global defaults. No rainfall entry (a zero rainfall has no
/// defensible stand-in) and no elevation entry (zero elevation is valid).
pub fn builtin_global_defaults() -> DefaultTable {
    BTreeMap::from([
        (FeatureId::TempMeanC, 25.0),
        (FeatureId::NdviMean, 0.5),
        (FeatureId::PopDensity, 40.0),
        (FeatureId::WaterCoverage, 5.0),
    ])
}

fn check_default(table: &str, id: FeatureId, value: f64) -> RiskResult<()> {
    let spec: &FeatureSpec = id.spec();
    if !value.is_finite() || !spec.contains(value) {
        return Err(RiskError::configuration(format!(
            "{} default for '{}' is {} but must lie in {}..={}",
            table, id, value, spec.min, spec.max
        )));
    }
    if !spec.zero_is_valid && value == 0.0 {
        return Err(RiskError::configuration(format!(
            "{} default for '{}' is 0, which reads as missing",
            table, id
        )));
    }
    Ok(())
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    pub risk_thresholds: RiskThresholds,
    pub imputation_strategy: ImputationStrategy,
    pub minimum_data_quality: f64,
    pub global_defaults: DefaultTable,
    /// Ecological zone id → per-feature defaults
    pub zone_defaults: BTreeMap<String, DefaultTable>,
    pub confidence_weights: ConfidenceWeights,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            risk_thresholds: RiskThresholds::default(),
            imputation_strategy: ImputationStrategy::default(),
            minimum_data_quality: constants::DEFAULT_MIN_DATA_QUALITY,
            global_defaults: builtin_global_defaults(),
            zone_defaults: BTreeMap::new(),
            confidence_weights: ConfidenceWeights::default(),
        }
    }
}

impl Configuration {
    /// Strict preset - refuses low-quality inputs and never imputes
    pub fn strict() -> Self {
        Self {
            imputation_strategy: ImputationStrategy::Skip,
            minimum_data_quality: 0.8,
            ..Self::default()
        }
    }

    /// Lenient preset - accepts any data quality
    pub fn lenient() -> Self {
        Self {
            minimum_data_quality: 0.0,
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: ImputationStrategy) -> Self {
        self.imputation_strategy = strategy;
        self
    }

    pub fn with_minimum_data_quality(mut self, minimum: f64) -> Self {
        self.minimum_data_quality = minimum;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RiskThresholds) -> Self {
        self.risk_thresholds = thresholds;
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>, table: DefaultTable) -> Self {
        self.zone_defaults.insert(zone.into(), table);
        self
    }

    /// Check every invariant. Run once before the configuration is shared.
    pub fn validate(&self) -> RiskResult<()> {
        self.risk_thresholds.validate()?;

        if !self.minimum_data_quality.is_finite()
            || !(0.0..=1.0).contains(&self.minimum_data_quality)
        {
            return Err(RiskError::configuration(format!(
                "minimum_data_quality must lie in 0..=1 (got {})",
                self.minimum_data_quality
            )));
        }

        self.confidence_weights.validate()?;

        for (&id, &value) in &self.global_defaults {
            check_default("global", id, value)?;
        }

        for (zone, table) in &self.zone_defaults {
            if zone.trim().is_empty() {
                return Err(RiskError::configuration("zone ids must not be empty"));
            }
            for (&id, &value) in table {
                check_default(&format!("zone '{}'", zone), id, value)?;
            }
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> RiskResult<Self> {
        let config: Configuration = serde_json::from_str(json)
            .map_err(|e| RiskError::configuration(format!("malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file and validate
    pub fn load(path: &Path) -> RiskResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RiskError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Apply textual overrides (as they arrive from the environment)
    pub fn apply_overrides(
        mut self,
        strategy: Option<&str>,
        minimum_data_quality: Option<&str>,
    ) -> RiskResult<Self> {
        if let Some(raw) = strategy {
            self.imputation_strategy = raw.parse()?;
            log::info!("Imputation strategy overridden: {}", self.imputation_strategy);
        }
        if let Some(raw) = minimum_data_quality {
            self.minimum_data_quality = raw.parse::<f64>().map_err(|_| {
                RiskError::configuration(format!("minimum data quality '{}' is not a number", raw))
            })?;
            log::info!("Minimum data quality overridden: {}", self.minimum_data_quality);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn apply_env_overrides(self) -> RiskResult<Self> {
        let strategy = constants::get_imputation_strategy();
        let minimum = constants::get_min_data_quality();
        self.apply_overrides(strategy.as_deref(), minimum.as_deref())
    }

    /// File at `path` (or defaults when none exists), then environment overrides
    pub fn resolve(path: Option<&Path>) -> RiskResult<Self> {
        let base = match path {
            Some(p) if p.exists() => Self::load(p)?,
            Some(p) => {
                log::debug!("No configuration at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };
        base.apply_env_overrides()
    }

    /// Default for one feature in one zone, if configured
    pub fn zone_default(&self, zone: &str, id: FeatureId) -> Option<f64> {
        self.zone_defaults.get(zone).and_then(|t| t.get(&id)).copied()
    }

    pub fn global_default(&self, id: FeatureId) -> Option<f64> {
        self.global_defaults.get(&id).copied()
    }
}

// ============================================================================
// TESTS
// ============================================================================
