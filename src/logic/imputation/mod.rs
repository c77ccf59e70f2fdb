//! Imputation Module
//!
//! Thay thế giá trị thiếu (MissingOrZero) bằng default đã cấu hình.
//! Mọi thay thế đều được ghi lại trong `ImputationRecord`.

pub mod engine;
pub mod types;

pub use engine::impute;
pub use types::{ImputationEntry, ImputationOutcome, ImputationRecord};
