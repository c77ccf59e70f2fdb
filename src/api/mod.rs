//! API Module
//!
//! Structure:
//! - commands.rs: Assessment, batch, schema and status commands
//! - engine_status.rs: Snapshot of schema, model and pipeline state
//!
//! Usage:
//! - `api::assess_location(&pipeline, &request)` - Single assessment
//! - `api::get_engine_status(&pipeline)` - Status for dashboards

pub mod commands;
pub mod engine_status;

// Re-export current version as default
pub use commands::*;
pub use engine_status::EngineStatus;
