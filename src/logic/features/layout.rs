//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Change a unit or bound → increment FEATURE_VERSION
//!
//! Model artifacts declare the layout they were trained on; a mismatch
//! means the model would read columns in the wrong order.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

/// Total number of features
pub const FEATURE_COUNT: usize = 6;

// ============================================================================
// FEATURE IDENTIFIERS
// ============================================================================

/// One identifier per schema feature, declared in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureId {
    #[serde(rename = "rainfall_12mo")]
    Rainfall12mo,
    #[serde(rename = "temp_mean_c")]
    TempMeanC,
    #[serde(rename = "ndvi_mean", alias = "ndvl_mean")]
    NdviMean,
    #[serde(rename = "pop_density")]
    PopDensity,
    #[serde(rename = "elevation")]
    Elevation,
    #[serde(rename = "water_coverage")]
    WaterCoverage,
}

impl FeatureId {
    /// All features in layout order
    pub const ALL: [FeatureId; FEATURE_COUNT] = [
        FeatureId::Rainfall12mo,
        FeatureId::TempMeanC,
        FeatureId::NdviMean,
        FeatureId::PopDensity,
        FeatureId::Elevation,
        FeatureId::WaterCoverage,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            FeatureId::Rainfall12mo => "rainfall_12mo",
            FeatureId::TempMeanC => "temp_mean_c",
            FeatureId::NdviMean => "ndvi_mean",
            FeatureId::PopDensity => "pop_density",
            FeatureId::Elevation => "elevation",
            FeatureId::WaterCoverage => "water_coverage",
        }
    }

    /// Resolve an input key. `ndvl_mean` is a known upstream misspelling.
    pub fn from_name(name: &str) -> Option<FeatureId> {
        match name {
            "ndvl_mean" => Some(FeatureId::NdviMean),
            _ => FeatureId::ALL.iter().copied().find(|id| id.name() == name),
        }
    }

    pub fn from_index(index: usize) -> Option<FeatureId> {
        FeatureId::ALL.get(index).copied()
    }

    /// Spec of this feature in the process-wide schema
    pub fn spec(&self) -> &'static FeatureSpec {
        &FEATURE_SCHEMA[self.index()]
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// FEATURE SCHEMA (Authoritative source)
// ============================================================================

/// Static description of one feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureSpec {
    pub id: FeatureId,
    pub name: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    /// When false, an exact zero is read as "missing"
    pub zero_is_valid: bool,
}

impl FeatureSpec {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Schema indexed by `FeatureId::index()`
pub type FeatureSchema = [FeatureSpec; FEATURE_COUNT];

/// Bounds are physical plausibility limits, not training ranges.
/// Every range contains zero so the zero check never shadows a range check.
pub static FEATURE_SCHEMA: FeatureSchema = [
    FeatureSpec {
        id: FeatureId::Rainfall12mo,
        name: "rainfall_12mo",
        unit: "mm/year",
        min: 0.0,
        max: 12_000.0,
        zero_is_valid: false,
    },
    FeatureSpec {
        id: FeatureId::TempMeanC,
        name: "temp_mean_c",
        unit: "°C",
        min: -30.0,
        max: 50.0,
        zero_is_valid: false,
    },
    FeatureSpec {
        id: FeatureId::NdviMean,
        name: "ndvi_mean",
        unit: "index",
        min: -1.0,
        max: 1.0,
        zero_is_valid: false,
    },
    FeatureSpec {
        id: FeatureId::PopDensity,
        name: "pop_density",
        unit: "people/km²",
        min: 0.0,
        max: 100_000.0,
        zero_is_valid: false,
    },
    // Sea level is a real measurement
    FeatureSpec {
        id: FeatureId::Elevation,
        name: "elevation",
        unit: "m",
        min: -500.0,
        max: 9_000.0,
        zero_is_valid: true,
    },
    // Zero water is plausible but upstream reports failures as zero too
    FeatureSpec {
        id: FeatureId::WaterCoverage,
        name: "water_coverage",
        unit: "%",
        min: 0.0,
        max: 100.0,
        zero_is_valid: false,
    },
];

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + ordered feature names + units
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for spec in FEATURE_SCHEMA.iter() {
        hasher.update(spec.name.as_bytes());
        hasher.update(&[0]);
        hasher.update(spec.unit.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub features: Vec<FeatureSpec>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            features: FEATURE_SCHEMA.to_vec(),
        }
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that a model artifact was built for the current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_matches_ids() {
        for (i, spec) in FEATURE_SCHEMA.iter().enumerate() {
            assert_eq!(spec.id.index(), i);
            assert_eq!(spec.id.name(), spec.name);
        }
    }

    #[test]
    fn test_every_range_contains_zero() {
        for spec in FEATURE_SCHEMA.iter() {
            assert!(spec.contains(0.0), "{} range must contain zero", spec.name);
            assert!(spec.min < spec.max);
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(FeatureId::from_name("temp_mean_c"), Some(FeatureId::TempMeanC));
        assert_eq!(FeatureId::from_name("ndvl_mean"), Some(FeatureId::NdviMean));
        assert_eq!(FeatureId::from_name("water_coverage"), Some(FeatureId::WaterCoverage));
        assert_eq!(FeatureId::from_name("humidity"), None);
        assert_eq!(FeatureId::from_index(4), Some(FeatureId::Elevation));
        assert_eq!(FeatureId::from_index(FEATURE_COUNT), None);
    }

    #[test]
    fn test_feature_id_serde_names() {
        let json = serde_json::to_string(&FeatureId::Rainfall12mo).unwrap();
        assert_eq!(json, "\"rainfall_12mo\"");
        let alias: FeatureId = serde_json::from_str("\"ndvl_mean\"").unwrap();
        assert_eq!(alias, FeatureId::NdviMean);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.features.len(), FEATURE_COUNT);
    }
}
