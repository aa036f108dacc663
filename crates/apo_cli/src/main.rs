// crates/apo_cli/src/main.rs
//
// Local file-in/file-out harness around apo_pipeline:
// parse args → telemetry → load payload/config/signals → run → write artifacts.

mod args;
mod telemetry;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Payload or signals violate the input contract; bad CLI arguments.
    pub const VALIDATION: i32 = 2;
    /// Read/write/path/limit failures.
    pub const IO: i32 = 4;
    /// Internal scoring failure.
    pub const ENGINE: i32 = 5;
}

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};

use apo_io::{canonical_json, loader, IoError};
use apo_pipeline::{engine_identifiers, EngineMeta, PipelineError, PipelineOutputs, ScoringRequest};

use args::Args;

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Io(String),
    Engine(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "invalid input: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Engine(m) => write!(f, "engine: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = args.ensure_local() {
        eprintln!("apo: error: {e}");
        return ExitCode::from(exitcodes::VALIDATION as u8);
    }

    if let Err(e) = telemetry::init(&args) {
        eprintln!("apo: error: {e}");
        return ExitCode::from(exitcodes::VALIDATION as u8);
    }

    let outcome = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match outcome {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("apo: error: {e}");
            map_error(&e)
        }
    };

    ExitCode::from(rc as u8)
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Engine(_) => ENGINE,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Validation(v) => MainError::Validation(v.to_string()),
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
        IoError::Limit(m) => MainError::Io(format!("limit: {m}")),
        IoError::Hash(m) => MainError::Engine(format!("hash: {m}")),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Validation(v) => MainError::Validation(v.to_string()),
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Core(c) => MainError::Engine(c.to_string()),
    }
}

/// Inputs resolved from disk, before any scoring.
struct Inputs {
    request: ScoringRequest,
    input_sha256: String,
}

fn load_inputs(args: &Args) -> Result<Inputs, MainError> {
    let loaded = loader::load_payload(&args.input).map_err(map_io_err)?;
    debug!(input = %args.input.display(), sha256 = %loaded.input_sha256, "payload loaded");

    // An unusable config document never fails the run; prepare() falls back
    // to defaults and reports it.
    let (config_override, config_load_error) = match args.config.as_deref().map(loader::load_config) {
        Some(Ok(v)) => (Some(v), None),
        Some(Err(e)) => (None, Some(e.to_string())),
        None => (None, None),
    };
    let signals_override = match &args.signals {
        Some(path) => Some(loader::load_signals(path).map_err(map_io_err)?),
        None => None,
    };

    let mut request = ScoringRequest::new(loaded.payload);
    request.config_override = config_override;
    request.config_load_error = config_load_error;
    request.signals_override = signals_override;
    request.iterations = args.iterations;
    request.ci_enabled = args.no_ci.then_some(false);
    request.seed = args.seed;
    Ok(Inputs { request, input_sha256: loaded.input_sha256 })
}

/// Load and validate every input; no scoring, no artifacts.
fn validate_only(args: &Args) -> Result<(), MainError> {
    let inputs = load_inputs(args)?;
    info!(
        items = inputs.request.payload.items.len(),
        input_sha256 = %inputs.input_sha256,
        "validate-only: inputs OK"
    );
    Ok(())
}

fn engine_meta() -> EngineMeta {
    let defaults = engine_identifiers();
    EngineMeta {
        vendor: option_env!("APO_ENGINE_VENDOR").map_or(defaults.vendor, str::to_string),
        name: option_env!("APO_ENGINE_NAME").map_or(defaults.name, str::to_string),
        version: option_env!("APO_ENGINE_VERSION").map_or(defaults.version, str::to_string),
        build: option_env!("APO_ENGINE_BUILD").map_or(defaults.build, str::to_string),
    }
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let inputs = load_inputs(args)?;
    let outs = apo_pipeline::run(inputs.request, &engine_meta()).map_err(map_pipeline_err)?;
    write_artifacts(&args.out, &outs)?;
    info!(
        out = %args.out.display(),
        result_id = %outs.run_record.result_id,
        "artifacts written"
    );
    Ok(())
}

fn write_artifacts(out_dir: &Path, outs: &PipelineOutputs) -> Result<(), MainError> {
    fs::create_dir_all(out_dir)
        .map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.display())))?;

    canonical_json::write_canonical_file(&out_dir.join("result.json"), &outs.result)
        .map_err(|e| MainError::Io(format!("write result.json: {e}")))?;

    canonical_json::write_canonical_file(&out_dir.join("run_record.json"), &outs.run_record)
        .map_err(|e| MainError::Io(format!("write run_record.json: {e}")))?;

    Ok(())
}
