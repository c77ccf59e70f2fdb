//! Risk Module
//!
//! Phân loại risk dựa trên probability từ model.
//! Đây là bước quyết định Low/Medium/High.
//!
//! ## Structure
//! - `types`: RiskLevel
//! - `rules`: Thresholds and constants
//! - `classifier`: Classification logic
//!
//! ## Usage
//! ```ignore
//! use crate::logic::risk::{classify, RiskLevel, RiskThresholds};
//!
//! match classify(0.42, &RiskThresholds::default())? {
//!     RiskLevel::Low => println!("Maintain surveillance"),
//!     RiskLevel::Medium => println!("Seasonal monitoring"),
//!     RiskLevel::High => println!("Vector control needed"),
//! }
//! ```

pub mod classifier;
pub mod rules;
pub mod types;

pub use classifier::{classify, classify_simple};
pub use rules::{RiskThresholds, LOW_THRESHOLD, MEDIUM_THRESHOLD, SCORE_UPPER_BOUND};
pub use types::RiskLevel;
