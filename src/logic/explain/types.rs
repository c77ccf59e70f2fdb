use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContribution {
    pub name: String,
    /// Standardised deviation from the training mean (signed)
    pub delta: f64,
    pub weight: f64,
    pub importance: f64, // |delta| * weight
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainResult {
    pub contributions: Vec<FeatureContribution>,
}
