//! BUILD_RUN_RECORD: provenance for a scoring run, for the caller's telemetry sink.
//!
//! - `result_id` = `RES:` + SHA-256 of the canonical result.
//! - `input_sha256` covers the effective payload; `config_sha256` the resolved config.
//! - `seed`/`iterations` are recorded only when the Monte Carlo band was produced.

use serde::Serialize;

use apo_io::hasher;

use crate::build_result::ScoringResult;
use crate::prepare::Prepared;
use crate::{EngineMeta, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub engine: EngineMeta,
    pub result_id: String,
    pub result_sha256: String,
    pub input_sha256: String,
    pub config_sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

pub fn build(
    prepared: &Prepared,
    result: &ScoringResult,
    engine: &EngineMeta,
) -> Result<RunRecord, PipelineError> {
    let result_sha256 = hasher::sha256_canonical(result)?;
    Ok(RunRecord {
        engine: engine.clone(),
        result_id: format!("RES:{result_sha256}"),
        result_sha256,
        input_sha256: prepared.input_sha256.clone(),
        config_sha256: prepared.config_sha256.clone(),
        seed: result.ci.map(|_| prepared.seed),
        iterations: result.ci.map(|ci| ci.iterations),
    })
}
