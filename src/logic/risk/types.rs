//! Risk Types
//!
//! Discrete risk categories. No classification logic here.

use serde::{Deserialize, Serialize};

/// Risk classification levels, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Below the low cut point
    Low,
    /// Between the low and medium cut points
    Medium,
    /// At or above the medium cut point
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }

    /// Public-health actions suggested for an area at this level
    pub fn guidance(&self) -> &'static [&'static str] {
        match self {
            RiskLevel::High => &[
                "Implement mosquito control measures",
                "Run public health awareness campaigns",
                "Keep up regular monitoring and surveillance",
                "Recommend preventive medication for travellers",
            ],
            RiskLevel::Medium => &[
                "Monitor seasonally",
                "Apply basic preventive measures",
                "Support community awareness programs",
            ],
            RiskLevel::Low => &[
                "Maintain basic surveillance",
                "Stay prepared for climate shifts",
                "Sustain public health infrastructure",
            ],
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
