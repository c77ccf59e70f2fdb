//! Result cache for any `RiskModel`
//!
//! Keyed on model version + the exact bit pattern of the corrected vector.
//! No eviction: the key space is bounded by the caller's workload.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;

use super::inference::{FeatureImportances, ModelMetadata, RiskModel};
use crate::logic::errors::RiskResult;
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

type CacheKey = (String, [u64; FEATURE_COUNT]);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

pub struct CachedModel<M: RiskModel> {
    inner: M,
    version: String,
    entries: RwLock<HashMap<CacheKey, f64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<M: RiskModel> CachedModel<M> {
    pub fn new(inner: M) -> Self {
        let version = inner.model_version();
        Self {
            inner,
            version,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.read().len(),
        }
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: RiskModel> RiskModel for CachedModel<M> {
    fn predict(&self, features: &FeatureVector) -> RiskResult<f64> {
        let key = (self.version.clone(), features.to_bits());

        if let Some(score) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(*score);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // Errors are not cached
        let score = self.inner.predict(features)?;
        self.entries.write().insert(key, score);
        Ok(score)
    }

    fn metadata(&self) -> &ModelMetadata {
        self.inner.metadata()
    }

    fn model_version(&self) -> String {
        self.version.clone()
    }

    fn feature_importances(&self) -> Option<&FeatureImportances> {
        self.inner.feature_importances()
    }
}
