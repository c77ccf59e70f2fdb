//! Risk Classifier
//!
//! CHỈ chứa logic classify - không có types, không có policy.
//! Input: probability score + thresholds
//! Output: RiskLevel
//!
//! Boundary values belong to the upper category.

use super::rules::{RiskThresholds, SCORE_UPPER_BOUND};
use super::types::RiskLevel;
use crate::logic::errors::{RiskError, RiskResult};

/// Map a probability in [0, 1] to a risk level
pub fn classify(score: f64, thresholds: &RiskThresholds) -> RiskResult<RiskLevel> {
    thresholds.check_cut_points()?;

    if !(0.0..=SCORE_UPPER_BOUND).contains(&score) {
        return Err(RiskError::range("risk_score", score, 0.0, SCORE_UPPER_BOUND));
    }

    let level = if score < thresholds.low {
        RiskLevel::Low
    } else if score < thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    Ok(level)
}

/// Classify with the default cut points
pub fn classify_simple(score: f64) -> RiskResult<RiskLevel> {
    classify(score, &RiskThresholds::default())
}

// ============================================================================
// TESTS
// ============================================================================
