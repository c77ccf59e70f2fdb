//! Explain Module
//!
//! Feature nào đẩy risk score lên/xuống nhiều nhất.

pub mod engine;
pub mod types;

pub use engine::explain;
pub use types::{ExplainResult, FeatureContribution};
