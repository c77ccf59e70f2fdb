//! Model Module - Risk scoring
//!
//! Tách logic inference khỏi validation/imputation.
//! Dễ dàng swap model, cache, ensemble.

pub mod cache;
pub mod ensemble;
pub mod inference;
#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export common types
pub use cache::{CacheStats, CachedModel};
pub use ensemble::{EnsembleArtifact, EnsembleModel};
pub use inference::{ensure_probability, FeatureImportances, ModelMetadata, RiskModel};
#[cfg(feature = "onnx")]
pub use onnx::{OnnxArtifactInfo, OnnxRiskModel};
