use serde::{Deserialize, Serialize};

use crate::logic::config::ImputationStrategy;
use crate::logic::features::{FeatureId, FeatureVector};

/// One replaced value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationEntry {
    pub feature: FeatureId,
    pub original_value: f64,
    pub imputed_value: f64,
    /// Strategy that actually produced the value
    pub strategy_used: ImputationStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// Ordered audit trail of every substitution, in layout order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImputationRecord {
    entries: Vec<ImputationEntry>,
}

impl ImputationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: ImputationEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImputationEntry> {
        self.entries.iter()
    }

    pub fn contains(&self, feature: FeatureId) -> bool {
        self.entries.iter().any(|e| e.feature == feature)
    }

    pub fn get(&self, feature: FeatureId) -> Option<&ImputationEntry> {
        self.entries.iter().find(|e| e.feature == feature)
    }

    pub fn entries(&self) -> &[ImputationEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImputationOutcome {
    pub vector: FeatureVector,
    pub record: ImputationRecord,
    /// `MissingOrZero` features no table could repair (or that `skip` left alone)
    pub unresolved: Vec<FeatureId>,
}

impl ImputationOutcome {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}
