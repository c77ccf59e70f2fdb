//! Malaria Risk CLI - Main Entry Point
//!
//! Reads assessment requests as JSON, prints results as JSON.
//! Exit codes: 0 = ok, 1 = start-up failure (config/model/io), 2 = request rejected.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;

use malaria_risk_core::api::{self, ErrorResponse};
use malaria_risk_core::constants::{self, APP_NAME, APP_VERSION};
use malaria_risk_core::{
    AssessmentRequest, CachedModel, Configuration, EnsembleModel, RiskError, RiskModel,
    RiskPipeline, RiskResult,
};

// ============================================================================
// COMMAND-LINE INTERFACE
// ============================================================================

#[derive(Parser, Debug)]
#[clap(
    name = "malaria-risk",
    version,
    about = "Validate environmental features and classify malaria risk."
)]
struct Cli {
    /// Configuration file (JSON). Defaults to $MALARIA_RISK_CONFIG or the user config dir.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Model artifact (.json ensemble or .onnx). Defaults to $MALARIA_RISK_MODEL,
    /// then the bundled reference model. An .onnx file needs a .meta.json sidecar.
    #[clap(long, global = true)]
    model: Option<PathBuf>,

    /// Cache model outputs for repeated vectors
    #[clap(long, global = true)]
    cache: bool,

    /// Pretty-print JSON output
    #[clap(long, global = true)]
    pretty: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assess one location from a JSON request ("-" reads stdin)
    Assess { input: PathBuf },
    /// Assess a JSON array of requests in parallel
    Batch { input: PathBuf },
    /// Print the feature schema
    Schema,
    /// Load configuration and model, then print the engine status
    CheckConfig,
}

// ============================================================================
// START-UP
// ============================================================================

fn load_configuration(explicit: Option<&Path>) -> RiskResult<Configuration> {
    match explicit {
        Some(path) => Configuration::load(path)?.apply_env_overrides(),
        None => Configuration::resolve(constants::get_config_path().as_deref()),
    }
}

fn load_artifact(path: &Path) -> RiskResult<Box<dyn RiskModel>> {
    let is_onnx = path.extension().map_or(false, |ext| ext == "onnx");

    if is_onnx {
        #[cfg(feature = "onnx")]
        {
            let model = malaria_risk_core::logic::model::OnnxRiskModel::load(path)?;
            return Ok(Box::new(model));
        }
        #[cfg(not(feature = "onnx"))]
        {
            return Err(RiskError::model_unavailable(format!(
                "{} is an ONNX model but this build lacks the `onnx` feature",
                path.display()
            )));
        }
    }

    Ok(Box::new(EnsembleModel::load(path)?))
}

fn load_model(explicit: Option<&Path>) -> RiskResult<Box<dyn RiskModel>> {
    if let Some(path) = explicit {
        return load_artifact(path);
    }

    match constants::get_model_path() {
        Some(path) if path.exists() => load_artifact(&path),
        _ => {
            log::info!("No model artifact found, using bundled reference model");
            Ok(Box::new(EnsembleModel::builtin()?))
        }
    }
}

/// Wrap a boxed model so it can be shared as `Arc<dyn RiskModel>`
struct Shared(Box<dyn RiskModel>);

impl RiskModel for Shared {
    fn predict(&self, features: &malaria_risk_core::FeatureVector) -> RiskResult<f64> {
        self.0.predict(features)
    }

    fn metadata(&self) -> &malaria_risk_core::logic::model::ModelMetadata {
        self.0.metadata()
    }

    fn model_version(&self) -> String {
        self.0.model_version()
    }

    fn feature_importances(&self) -> Option<&malaria_risk_core::logic::model::FeatureImportances> {
        self.0.feature_importances()
    }
}

fn build_pipeline(cli: &Cli) -> RiskResult<RiskPipeline> {
    let config = load_configuration(cli.config.as_deref())?;
    let model = Shared(load_model(cli.model.as_deref())?);

    let model: Arc<dyn RiskModel> = if cli.cache {
        Arc::new(CachedModel::new(model))
    } else {
        Arc::new(model)
    };

    RiskPipeline::new(config, model)
}

// ============================================================================
// I/O HELPERS
// ============================================================================

fn read_input(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn parse_input<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = read_input(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("malformed request in {}: {}", path.display(), e))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = if pretty {
        serde_json::to_writer_pretty(&mut out, value)
    } else {
        serde_json::to_writer(&mut out, value)
    };
    if let Err(e) = written.map_err(io::Error::from).and_then(|_| writeln!(out)) {
        log::error!("Failed to write output: {}", e);
        process::exit(1);
    }
}

fn fail_startup(err: RiskError) -> ! {
    log::error!("Start-up failed: {}", err);
    print_json(&ErrorResponse::from(err), false);
    process::exit(1);
}

// ============================================================================
// MAIN
// ============================================================================

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    log::debug!("Starting {} v{}", APP_NAME, APP_VERSION);

    match &cli.command {
        Command::Schema => {
            print_json(&api::get_feature_schema(), cli.pretty);
        }
        Command::CheckConfig => {
            let pipeline = build_pipeline(&cli).unwrap_or_else(|e| fail_startup(e));
            print_json(&api::get_engine_status(&pipeline), cli.pretty);
        }
        Command::Assess { input } => {
            let request: AssessmentRequest = parse_input(input).unwrap_or_else(|e| {
                log::error!("{}", e);
                process::exit(1);
            });
            let pipeline = build_pipeline(&cli).unwrap_or_else(|e| fail_startup(e));

            match api::assess_location(&pipeline, &request) {
                Ok(result) => print_json(&result, cli.pretty),
                Err(error) => {
                    print_json(&error, cli.pretty);
                    process::exit(2);
                }
            }
        }
        Command::Batch { input } => {
            let requests: Vec<AssessmentRequest> = parse_input(input).unwrap_or_else(|e| {
                log::error!("{}", e);
                process::exit(1);
            });
            let pipeline = build_pipeline(&cli).unwrap_or_else(|e| fail_startup(e));

            let response = api::assess_batch(&pipeline, &requests);
            log::info!(
                "Batch complete: {} accepted, {} rejected",
                response.accepted,
                response.rejected
            );
            print_json(&response, cli.pretty);
            if response.rejected > 0 {
                process::exit(2);
            }
        }
    }
}
