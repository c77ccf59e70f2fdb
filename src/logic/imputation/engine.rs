//! Imputation Engine
//!
//! Repairs `MissingOrZero` features from the configured default tables.
//! `Ok` and `OutOfRange` values pass through bit-for-bit.

use super::types::{ImputationEntry, ImputationOutcome, ImputationRecord};
use crate::logic::config::{Configuration, ImputationStrategy};
use crate::logic::features::{FeatureId, FeatureStatus, FeatureVector, ValidationReport};

/// Resolve a replacement value and the strategy that produced it
fn lookup(
    id: FeatureId,
    config: &Configuration,
    zone: Option<&str>,
) -> Option<(f64, ImputationStrategy, Option<String>)> {
    match config.imputation_strategy {
        ImputationStrategy::Skip => None,
        ImputationStrategy::GlobalDefault => config
            .global_default(id)
            .map(|v| (v, ImputationStrategy::GlobalDefault, None)),
        ImputationStrategy::GeographicalContext => {
            let zoned = zone.and_then(|z| {
                config
                    .zone_default(z, id)
                    .map(|v| (v, ImputationStrategy::GeographicalContext, Some(z.to_string())))
            });
            zoned.or_else(|| {
                config
                    .global_default(id)
                    .map(|v| (v, ImputationStrategy::GlobalDefault, None))
            })
        }
    }
}

pub fn impute(
    vector: &FeatureVector,
    report: &ValidationReport,
    config: &Configuration,
    zone: Option<&str>,
) -> ImputationOutcome {
    let mut corrected = *vector;
    let mut record = ImputationRecord::new();
    let mut unresolved = Vec::new();

    for id in FeatureId::ALL {
        if report.status(id) != FeatureStatus::MissingOrZero {
            continue;
        }

        match lookup(id, config, zone) {
            Some((value, strategy_used, zone)) => {
                corrected.set(id, value);
                record.push(ImputationEntry {
                    feature: id,
                    original_value: vector.get(id),
                    imputed_value: value,
                    strategy_used,
                    zone,
                });
            }
            None => unresolved.push(id),
        }
    }

    if !record.is_empty() {
        log::debug!(
            "Imputed {} feature(s) using {}",
            record.len(),
            config.imputation_strategy
        );
    }

    ImputationOutcome {
        vector: corrected,
        record,
        unresolved,
    }
}

// ============================================================================
// TESTS
// ============================================================================
