//! Logic Module - Business Logic & Engines
//!
//! Chứa các engines xử lý: Validator, Imputation, Model, Classifier, Confidence.
//!
//! ## Architecture
//! - `features/` - Schema, vector, validation
//! - `imputation/` - Default-table repair of missing values
//! - `model/` - Risk scoring (ensemble, ONNX, cache)
//! - `risk/` - Low/Medium/High classification
//! - `pipeline/` - Orchestrates all of the above per request

pub mod config;
pub mod errors;

pub mod confidence;
pub mod explain;
pub mod features;
pub mod imputation;
pub mod model;
pub mod pipeline;
pub mod risk;
