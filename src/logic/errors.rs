//! Risk Errors
//!
//! One taxonomy for every way a request (or the process) can be refused.
//! Each variant carries enough structure for the caller to see which
//! feature or setting was at fault.

use serde::{Deserialize, Serialize};

use super::config::ImputationStrategy;

pub type RiskResult<T> = Result<T, RiskError>;

// ============================================================================
// ERROR KIND
// ============================================================================

/// Stable, serializable error category exposed to API callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Schema,
    Range,
    ImputationExhausted,
    InsufficientDataQuality,
    ModelUnavailable,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Schema => "schema",
            ErrorKind::Range => "range",
            ErrorKind::ImputationExhausted => "imputation_exhausted",
            ErrorKind::InsufficientDataQuality => "insufficient_data_quality",
            ErrorKind::ModelUnavailable => "model_unavailable",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RANGE VIOLATION
// ============================================================================

/// A present value outside its documented bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeViolation {
    pub field: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={} (allowed {}..={})", self.field, self.value, self.min, self.max)
    }
}

fn join_violations(violations: &[RangeViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// RISK ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("malformed feature keys: unknown {unknown:?}, missing {missing:?}")]
    Schema {
        unknown: Vec<String>,
        missing: Vec<String>,
    },

    #[error("values out of range: {}", join_violations(.violations))]
    Range { violations: Vec<RangeViolation> },

    #[error("no imputation default for {features:?} under strategy '{strategy}'")]
    ImputationExhausted {
        features: Vec<String>,
        strategy: ImputationStrategy,
    },

    #[error("data quality {data_quality:.3} is below the configured minimum {minimum:.3}")]
    InsufficientDataQuality { data_quality: f64, minimum: f64 },

    #[error("risk model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
}

impl RiskError {
    pub fn model_unavailable(reason: impl Into<String>) -> Self {
        RiskError::ModelUnavailable { reason: reason.into() }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        RiskError::Configuration { reason: reason.into() }
    }

    pub fn range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        RiskError::Range {
            violations: vec![RangeViolation {
                field: field.into(),
                value,
                min,
                max,
            }],
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::Schema { .. } => ErrorKind::Schema,
            RiskError::Range { .. } => ErrorKind::Range,
            RiskError::ImputationExhausted { .. } => ErrorKind::ImputationExhausted,
            RiskError::InsufficientDataQuality { .. } => ErrorKind::InsufficientDataQuality,
            RiskError::ModelUnavailable { .. } => ErrorKind::ModelUnavailable,
            RiskError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Names of the offending features (or request fields), if any
    pub fn features(&self) -> Vec<String> {
        match self {
            RiskError::Schema { unknown, missing } => {
                unknown.iter().chain(missing.iter()).cloned().collect()
            }
            RiskError::Range { violations } => violations.iter().map(|v| v.field.clone()).collect(),
            RiskError::ImputationExhausted { features, .. } => features.clone(),
            RiskError::InsufficientDataQuality { .. }
            | RiskError::ModelUnavailable { .. }
            | RiskError::Configuration { .. } => Vec::new(),
        }
    }

    /// Range violations carried by a `Range` error
    pub fn violations(&self) -> &[RangeViolation] {
        match self {
            RiskError::Range { violations } => violations,
            _ => &[],
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(RiskError::model_unavailable("gone").kind(), ErrorKind::ModelUnavailable);
        assert_eq!(RiskError::configuration("bad").kind(), ErrorKind::Configuration);
        assert_eq!(RiskError::range("pop_density", -5.0, 0.0, 1.0).kind(), ErrorKind::Range);
    }

    #[test]
    fn test_range_error_names_field_and_value() {
        let err = RiskError::range("pop_density", -5.0, 0.0, 100000.0);
        assert_eq!(err.features(), vec!["pop_density".to_string()]);
        let message = err.to_string();
        assert!(message.contains("pop_density"));
        assert!(message.contains("-5"));
    }

    #[test]
    fn test_schema_error_lists_unknown_then_missing() {
        let err = RiskError::Schema {
            unknown: vec!["humidity".to_string()],
            missing: vec!["elevation".to_string()],
        };
        assert_eq!(err.features(), vec!["humidity".to_string(), "elevation".to_string()]);
        assert!(err.violations().is_empty());
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InsufficientDataQuality).unwrap();
        assert_eq!(json, "\"insufficient_data_quality\"");
    }

    #[test]
    fn test_display_matches_wire_name() {
        for kind in [
            ErrorKind::Schema,
            ErrorKind::Range,
            ErrorKind::ImputationExhausted,
            ErrorKind::InsufficientDataQuality,
            ErrorKind::ModelUnavailable,
            ErrorKind::Configuration,
        ] {
            let wire = serde_json::to_value(kind).unwrap();
            assert_eq!(wire, kind.to_string());
            assert_eq!(serde_json::from_value::<ErrorKind>(wire).unwrap(), kind);
        }
    }
}
