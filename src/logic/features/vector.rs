//! Feature Vector - Core data structure for model input
//!
//! Fixed-arity vector in `FeatureId` order. Raw provider output arrives as
//! an open name → value mapping (`RawFeatures`) and is only turned into a
//! `FeatureVector` once its key set has been checked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{FeatureId, FEATURE_COUNT};
use crate::logic::errors::{RiskError, RiskResult};

/// Feature mapping as delivered by the data-extraction collaborator
pub type RawFeatures = BTreeMap<String, f64>;

/// Named form used on the wire
pub type NamedFeatures = BTreeMap<FeatureId, f64>;

// ============================================================================
// FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "NamedFeatures", try_from = "NamedFeatures")]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Build from a raw mapping. Every schema key must be present exactly once;
    /// extra keys are rejected.
    pub fn from_raw(raw: &RawFeatures) -> RiskResult<Self> {
        let mut values = [0.0f64; FEATURE_COUNT];
        let mut seen = [false; FEATURE_COUNT];
        let mut unknown = Vec::new();

        for (key, &value) in raw {
            match FeatureId::from_name(key) {
                Some(id) if !seen[id.index()] => {
                    seen[id.index()] = true;
                    values[id.index()] = value;
                }
                _ => unknown.push(key.clone()),
            }
        }

        let missing: Vec<String> = FeatureId::ALL
            .iter()
            .filter(|id| !seen[id.index()])
            .map(|id| id.name().to_string())
            .collect();

        if !unknown.is_empty() || !missing.is_empty() {
            return Err(RiskError::Schema { unknown, missing });
        }

        Ok(Self { values })
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, id: FeatureId) -> f64 {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: FeatureId, value: f64) {
        self.values[id.index()] = value;
    }

    /// Iterate `(feature, value)` in layout order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, f64)> + '_ {
        FeatureId::ALL.iter().map(move |id| (*id, self.values[id.index()]))
    }

    /// Bit patterns of every value, usable as an exact hash key
    pub fn to_bits(&self) -> [u64; FEATURE_COUNT] {
        let mut bits = [0u64; FEATURE_COUNT];
        for (slot, value) in bits.iter_mut().zip(self.values.iter()) {
            *slot = value.to_bits();
        }
        bits
    }

    pub fn to_named(&self) -> NamedFeatures {
        self.iter().collect()
    }

    pub fn to_raw(&self) -> RawFeatures {
        self.iter().map(|(id, v)| (id.name().to_string(), v)).collect()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

impl From<FeatureVector> for NamedFeatures {
    fn from(vector: FeatureVector) -> Self {
        vector.to_named()
    }
}

impl TryFrom<NamedFeatures> for FeatureVector {
    type Error = RiskError;

    fn try_from(named: NamedFeatures) -> Result<Self, Self::Error> {
        let missing: Vec<String> = FeatureId::ALL
            .iter()
            .filter(|id| !named.contains_key(id))
            .map(|id| id.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RiskError::Schema {
                unknown: Vec::new(),
                missing,
            });
        }

        let mut values = [0.0f64; FEATURE_COUNT];
        for (id, value) in named {
            values[id.index()] = value;
        }
        Ok(Self { values })
    }
}

// ============================================================================
// BUILDER PATTERN
// ============================================================================

/// Builder for raw provider mappings with named setters
#[derive(Debug, Clone, Default)]
pub struct RawFeaturesBuilder {
    raw: RawFeatures,
}

impl RawFeaturesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rainfall_12mo(self, value: f64) -> Self {
        self.set(FeatureId::Rainfall12mo.name(), value)
    }

    pub fn temp_mean_c(self, value: f64) -> Self {
        self.set(FeatureId::TempMeanC.name(), value)
    }

    pub fn ndvi_mean(self, value: f64) -> Self {
        self.set(FeatureId::NdviMean.name(), value)
    }

    pub fn pop_density(self, value: f64) -> Self {
        self.set(FeatureId::PopDensity.name(), value)
    }

    pub fn elevation(self, value: f64) -> Self {
        self.set(FeatureId::Elevation.name(), value)
    }

    pub fn water_coverage(self, value: f64) -> Self {
        self.set(FeatureId::WaterCoverage.name(), value)
    }

    /// Set any key, including ones outside the schema
    pub fn set(mut self, key: &str, value: f64) -> Self {
        self.raw.insert(key.to_string(), value);
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.raw.remove(key);
        self
    }

    pub fn build(self) -> RawFeatures {
        self.raw
    }
}

impl From<RawFeatures> for RawFeaturesBuilder {
    fn from(raw: RawFeatures) -> Self {
        Self { raw }
    }
}

// ============================================================================
// TESTS
// ============================================================================
