//! Pipeline Module
//!
//! Nối validator → imputation → model → classifier → confidence.
//! Mỗi request đi một đường thẳng, không chia sẻ state giữa các request.

pub mod orchestrator;
pub mod state;
pub mod types;


pub use orchestrator::{Assessment, PipelineCounters, RiskPipeline};
pub use state::PipelineState;
pub use types::{AssessmentRequest, PredictionResult};
