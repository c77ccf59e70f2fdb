//! Malaria Risk Core
//!
//! Validates six environmental measurements for a location, repairs
//! missing values, scores them with an ensemble model and classifies the
//! result as Low/Medium/High risk with a confidence estimate.

pub mod api;
pub mod constants;
pub mod logic;

pub use logic::config::{Configuration, ImputationStrategy};
pub use logic::errors::{ErrorKind, RiskError, RiskResult};
pub use logic::features::{FeatureId, FeatureVector, RawFeatures, RawFeaturesBuilder};
pub use logic::model::{CachedModel, EnsembleModel, RiskModel};
pub use logic::pipeline::{AssessmentRequest, PredictionResult, RiskPipeline};
pub use logic::risk::{RiskLevel, RiskThresholds};
