//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Environment variables override the configuration file; the file
//! overrides the built-in defaults.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "malaria-risk";

/// Config file name inside the per-user config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Model artifact file name inside the per-user data directory
pub const MODEL_FILE_NAME: &str = "risk_model.json";

/// Default minimum data quality below which a request is refused
pub const DEFAULT_MIN_DATA_QUALITY: f64 = 0.5;

/// Assessments per rayon task when running a batch
pub const BATCH_CHUNK_SIZE: usize = 64;

/// Contributions shown per explanation
pub const EXPLAIN_TOP_N: usize = 5;

// ============================================
// Environment variable names
// ============================================

pub const ENV_CONFIG_PATH: &str = "MALARIA_RISK_CONFIG";
pub const ENV_MODEL_PATH: &str = "MALARIA_RISK_MODEL";
pub const ENV_IMPUTATION_STRATEGY: &str = "MALARIA_RISK_IMPUTATION_STRATEGY";
pub const ENV_MIN_DATA_QUALITY: &str = "MALARIA_RISK_MIN_DATA_QUALITY";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get config file path from environment or the per-user default
pub fn get_config_path() -> Option<PathBuf> {
    std::env::var(ENV_CONFIG_PATH)
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join(APP_NAME).join(CONFIG_FILE_NAME)))
}

/// Get model artifact path from environment or the per-user default
pub fn get_model_path() -> Option<PathBuf> {
    std::env::var(ENV_MODEL_PATH)
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::data_dir().map(|d| d.join(APP_NAME).join(MODEL_FILE_NAME)))
}

/// Imputation strategy override, unparsed
pub fn get_imputation_strategy() -> Option<String> {
    std::env::var(ENV_IMPUTATION_STRATEGY)
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Minimum data quality override, unparsed
pub fn get_min_data_quality() -> Option<String> {
    std::env::var(ENV_MIN_DATA_QUALITY)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
