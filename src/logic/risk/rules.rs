//! Risk Classification Rules & Thresholds
//!
//! Cut points on the probability scale. No classify logic here.

use serde::{Deserialize, Serialize};

use crate::logic::errors::{RiskError, RiskResult};

// ============================================================================
// THRESHOLDS (Constants)
// ============================================================================

/// Below this score = Low
pub const LOW_THRESHOLD: f64 = 0.3;

/// At or above this score = High
pub const MEDIUM_THRESHOLD: f64 = 0.7;

/// Closed upper bound of the score domain
pub const SCORE_UPPER_BOUND: f64 = 1.0;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

/// `low` and `medium` are the two cut points; `high` is always the domain's
/// closed upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskThresholds {
    pub low: f64,
    pub medium: f64,
    #[serde(default = "default_high")]
    pub high: f64,
}

fn default_high() -> f64 {
    SCORE_UPPER_BOUND
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: LOW_THRESHOLD,
            medium: MEDIUM_THRESHOLD,
            high: SCORE_UPPER_BOUND,
        }
    }
}

impl RiskThresholds {
    pub fn new(low: f64, medium: f64) -> Self {
        Self {
            low,
            medium,
            high: SCORE_UPPER_BOUND,
        }
    }

    /// High sensitivity - more areas flagged
    pub fn high_sensitivity() -> Self {
        Self::new(0.2, 0.5)
    }

    /// Low sensitivity - fewer areas flagged
    pub fn low_sensitivity() -> Self {
        Self::new(0.4, 0.8)
    }

    /// Cut points are strictly increasing (what the classifier needs)
    pub fn check_cut_points(&self) -> RiskResult<()> {
        if !(self.low.is_finite() && self.medium.is_finite() && self.low < self.medium) {
            return Err(RiskError::configuration(format!(
                "risk thresholds must satisfy low < medium (low={}, medium={})",
                self.low, self.medium
            )));
        }
        Ok(())
    }

    /// Full partition check: 0 ≤ low < medium < high = 1.0
    pub fn validate(&self) -> RiskResult<()> {
        self.check_cut_points()?;
        if self.low < 0.0 {
            return Err(RiskError::configuration(format!(
                "risk threshold low must be >= 0 (low={})",
                self.low
            )));
        }
        if self.high != SCORE_UPPER_BOUND {
            return Err(RiskError::configuration(format!(
                "risk threshold high must equal {} (high={})",
                SCORE_UPPER_BOUND, self.high
            )));
        }
        if self.medium >= self.high {
            return Err(RiskError::configuration(format!(
                "risk threshold medium must be < high (medium={}, high={})",
                self.medium, self.high
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = RiskThresholds::default();
        assert_eq!(thresholds.low, 0.3);
        assert_eq!(thresholds.medium, 0.7);
        assert_eq!(thresholds.high, 1.0);
        assert!(thresholds.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(RiskThresholds::high_sensitivity().validate().is_ok());
        assert!(RiskThresholds::low_sensitivity().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_partitions() {
        assert!(RiskThresholds::new(0.7, 0.3).validate().is_err());
        assert!(RiskThresholds::new(0.5, 0.5).validate().is_err());
        assert!(RiskThresholds::new(-0.1, 0.5).validate().is_err());
        assert!(RiskThresholds::new(0.3, 1.0).validate().is_err());
        assert!(RiskThresholds::new(f64::NAN, 0.5).validate().is_err());
        assert!(RiskThresholds { low: 0.3, medium: 0.7, high: 0.9 }.validate().is_err());
    }

    #[test]
    fn test_high_defaults_when_omitted() {
        let thresholds: RiskThresholds = serde_json::from_str(r#"{"low": 0.25, "medium": 0.6}"#).unwrap();
        assert_eq!(thresholds.high, 1.0);
    }
}
