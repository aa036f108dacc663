//! apo_pipeline: orchestration surface of the APO engine
//! (prepare → score items → aggregate → weights → signals → simulate → consistency → build).
//!
//! This crate stays I/O-free: JSON validation, config resolution and hashing are
//! delegated to `apo_io`, math to `apo_algo`. The deterministic path
//! (`score_deterministic`) never touches an RNG; only `run_with_rng` does.

#![forbid(unsafe_code)]

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use apo_core::{CoreError, NoiseRng, NoiseSource};
use apo_io::{IoError, ValidationError};

pub mod build_result;
pub mod build_run_record;
pub mod prepare;
pub mod score;

pub use build_result::{Insights, ItemBreakdown, ScoringResult};
pub use build_run_record::RunRecord;
pub use prepare::{prepare, Prepared, ScoringRequest};
pub use score::{score_deterministic, Deterministic};

/// Engine identifiers recorded in every run record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

/// Engine identifiers for this build.
pub fn engine_identifiers() -> EngineMeta {
    EngineMeta {
        vendor: "apo".to_string(),
        name: "apo_engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: "dev".to_string(),
    }
}

/// Single error surface for the orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Payload violates the item/category contract; nothing was scored.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(IoError),

    /// Internal invariant failure in the scoring math.
    #[error("scoring failed: {0}")]
    Core(#[from] CoreError),
}

impl From<IoError> for PipelineError {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Validation(v) => PipelineError::Validation(v),
            other => PipelineError::Io(other),
        }
    }
}

/// Result document plus its run record.
#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub result: ScoringResult,
    pub run_record: RunRecord,
}

/// Score a prepared request with an explicit noise source.
pub fn run_with_rng<R: NoiseSource + ?Sized>(
    prepared: &Prepared,
    rng: &mut R,
) -> Result<ScoringResult, PipelineError> {
    let det = score_deterministic(prepared)?;
    let sim = &prepared.config.simulation;
    let ci = if sim.enabled {
        let ci = apo_algo::simulate(
            &det.category_breakdown.map(|_, s| s.apo),
            &det.weights.weights,
            &det.adjustments,
            sim,
            rng,
        );
        debug!(iterations = ci.iterations, lower = ci.lower, upper = ci.upper, "simulate");
        Some(ci)
    } else {
        debug!("simulate skipped");
        None
    };
    Ok(build_result::build(&prepared.payload, det, ci))
}

/// Full run: prepare, score with a ChaCha20 stream seeded from the request, build the run record.
pub fn run(request: ScoringRequest, engine: &EngineMeta) -> Result<PipelineOutputs, PipelineError> {
    let prepared = prepare(request)?;
    let mut rng = NoiseRng::from_seed_u64(prepared.seed);
    let result = run_with_rng(&prepared, &mut rng)?;
    let run_record = build_run_record::build(&prepared, &result, engine)?;
    info!(
        overall_apo = result.overall_apo,
        confidence = %result.overall_confidence,
        warnings = result.validation_warnings.len(),
        "scored"
    );
    Ok(PipelineOutputs { result, run_record })
}
