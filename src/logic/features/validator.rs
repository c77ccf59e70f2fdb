//! Feature Validator
//!
//! Checks a raw feature mapping against the schema and reports one
//! `FeatureStatus` per feature. Pure: no logging, no side effects.
//!
//! Order of checks per present key:
//! 1. `zero_is_valid == false && value == 0` → `MissingOrZero`
//! 2. value outside `[min, max]` (NaN and infinities included) → `OutOfRange`
//! 3. otherwise → `Ok`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{FeatureId, FeatureSchema, FeatureSpec};
use super::vector::{FeatureVector, RawFeatures};
use crate::logic::errors::{RangeViolation, RiskError, RiskResult};

// ============================================================================
// STATUS TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureStatus {
    Ok,
    OutOfRange,
    MissingOrZero,
}

impl FeatureStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, FeatureStatus::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub statuses: BTreeMap<FeatureId, FeatureStatus>,
    /// False only when a key is unknown or a schema key is absent
    pub schema_ok: bool,
    pub unknown_keys: Vec<String>,
    pub missing_keys: Vec<FeatureId>,
}

impl ValidationReport {
    pub fn status(&self, id: FeatureId) -> FeatureStatus {
        self.statuses
            .get(&id)
            .copied()
            .unwrap_or(FeatureStatus::MissingOrZero)
    }

    pub fn features_with(&self, status: FeatureStatus) -> Vec<FeatureId> {
        self.statuses
            .iter()
            .filter(|(_, s)| **s == status)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn out_of_range(&self) -> Vec<FeatureId> {
        self.features_with(FeatureStatus::OutOfRange)
    }

    pub fn missing_or_zero(&self) -> Vec<FeatureId> {
        self.features_with(FeatureStatus::MissingOrZero)
    }

    /// Schema intact and every feature `Ok`
    pub fn is_clean(&self) -> bool {
        self.schema_ok && self.statuses.values().all(FeatureStatus::is_ok)
    }

    pub fn schema_error(&self) -> Option<RiskError> {
        if self.schema_ok {
            return None;
        }
        Some(RiskError::Schema {
            unknown: self.unknown_keys.clone(),
            missing: self.missing_keys.iter().map(|id| id.name().to_string()).collect(),
        })
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Status of a single value against its spec
pub fn check_value(spec: &FeatureSpec, value: f64) -> FeatureStatus {
    if !spec.zero_is_valid && value == 0.0 {
        FeatureStatus::MissingOrZero
    } else if !spec.contains(value) {
        FeatureStatus::OutOfRange
    } else {
        FeatureStatus::Ok
    }
}

/// Non-failing form: always returns a report, with `schema_ok` set accordingly
pub fn inspect(raw: &RawFeatures, schema: &FeatureSchema) -> ValidationReport {
    let mut statuses = BTreeMap::new();
    let mut unknown_keys = Vec::new();

    for (key, &value) in raw {
        match FeatureId::from_name(key) {
            Some(id) if !statuses.contains_key(&id) => {
                statuses.insert(id, check_value(&schema[id.index()], value));
            }
            _ => unknown_keys.push(key.clone()),
        }
    }

    let mut missing_keys = Vec::new();
    for id in FeatureId::ALL {
        if !statuses.contains_key(&id) {
            statuses.insert(id, FeatureStatus::MissingOrZero);
            missing_keys.push(id);
        }
    }

    ValidationReport {
        statuses,
        schema_ok: unknown_keys.is_empty() && missing_keys.is_empty(),
        unknown_keys,
        missing_keys,
    }
}

/// Fails with `SchemaError` on malformed keys; otherwise returns the report
pub fn validate(raw: &RawFeatures, schema: &FeatureSchema) -> RiskResult<ValidationReport> {
    let report = inspect(raw, schema);
    match report.schema_error() {
        Some(err) => Err(err),
        None => Ok(report),
    }
}

/// Validate an already-structured vector (used after imputation)
pub fn inspect_vector(vector: &FeatureVector, schema: &FeatureSchema) -> ValidationReport {
    let statuses = vector
        .iter()
        .map(|(id, value)| (id, check_value(&schema[id.index()], value)))
        .collect();

    ValidationReport {
        statuses,
        schema_ok: true,
        unknown_keys: Vec::new(),
        missing_keys: Vec::new(),
    }
}

/// Range violations for every `OutOfRange` feature in the report
pub fn range_violations(
    vector: &FeatureVector,
    report: &ValidationReport,
    schema: &FeatureSchema,
) -> Vec<RangeViolation> {
    report
        .out_of_range()
        .into_iter()
        .map(|id| {
            let spec = &schema[id.index()];
            RangeViolation {
                field: id.name().to_string(),
                value: vector.get(id),
                min: spec.min,
                max: spec.max,
            }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
