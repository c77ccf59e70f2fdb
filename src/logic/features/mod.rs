//! Features Module - Schema, Vector and Validation
//!
//! The six environmental measurements a risk assessment is made from.
//! `layout` is the single source of truth for order, units and bounds.

pub mod layout;
pub mod validator;
pub mod vector;


// Re-export common types
pub use layout::{
    layout_hash, FeatureId, FeatureSchema, FeatureSpec, LayoutInfo, FEATURE_COUNT,
    FEATURE_SCHEMA, FEATURE_VERSION,
};
pub use validator::{inspect, validate, FeatureStatus, ValidationReport};
pub use vector::{FeatureVector, RawFeatures, RawFeaturesBuilder};
