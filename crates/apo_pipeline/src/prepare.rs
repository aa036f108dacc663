//! Prepare stage: settle every input before any math runs.
//!
//! Precedence (lowest → highest):
//! - config: payload `config` < caller-supplied config document;
//! - simulation: resolved config < payload `monte_carlo` < caller overrides;
//! - external signals: payload `external_signals` < caller-supplied signals.
//!
//! The input digest covers the effective payload (after substitution), so two
//! requests that score identically also hash identically.

use serde_json::Value;
use tracing::debug;

use apo_core::{EngineConfig, ExternalSignalsInput};
use apo_io::config::{resolve_config, ConfigIssue};
use apo_io::hasher;
use apo_io::validate::ValidatedPayload;

use crate::PipelineError;

/// A validated payload plus caller-side overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringRequest {
    pub payload: ValidatedPayload,
    /// Replaces `payload.config` when present.
    pub config_override: Option<Value>,
    /// Set when the caller's config document could not be loaded; scoring
    /// then runs on defaults and the reason leads the warnings.
    pub config_load_error: Option<String>,
    /// Replaces `payload.external_signals` when present.
    pub signals_override: Option<ExternalSignalsInput>,
    pub iterations: Option<u32>,
    pub ci_enabled: Option<bool>,
    pub seed: Option<u64>,
}

impl ScoringRequest {
    pub fn new(payload: ValidatedPayload) -> Self {
        Self {
            payload,
            config_override: None,
            config_load_error: None,
            signals_override: None,
            iterations: None,
            ci_enabled: None,
            seed: None,
        }
    }
}

/// Everything the scoring stages need, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// Effective payload (overrides applied).
    pub payload: ValidatedPayload,
    pub config: EngineConfig,
    pub config_issues: Vec<ConfigIssue>,
    pub input_sha256: String,
    pub config_sha256: String,
    /// Monte Carlo seed: explicit, else derived from `input_sha256`.
    pub seed: u64,
}

pub fn prepare(request: ScoringRequest) -> Result<Prepared, PipelineError> {
    let ScoringRequest {
        mut payload,
        config_override,
        config_load_error,
        signals_override,
        iterations,
        ci_enabled,
        seed,
    } = request;

    let mut config_issues = Vec::new();
    if let Some(reason) = config_load_error {
        payload.config = None;
        config_issues.push(ConfigIssue::unreadable(reason));
    } else if config_override.is_some() {
        payload.config = config_override;
    }
    if signals_override.is_some() {
        payload.external_signals = signals_override;
    }

    let resolved = resolve_config(payload.config.as_ref());
    config_issues.extend(resolved.issues);
    let mut config = resolved.config;

    let mc = payload.monte_carlo;
    if let Some(n) = iterations.or(mc.iterations) {
        config.simulation.iterations = n;
    }
    if let Some(enabled) = ci_enabled.or(mc.enabled) {
        config.simulation.enabled = enabled;
    }
    config.simulation.validate()?;

    let input_sha256 = hasher::sha256_canonical(&payload)?;
    let config_sha256 = hasher::sha256_canonical(&config)?;
    let seed = match seed.or(mc.seed) {
        Some(s) => s,
        None => hasher::seed_from_digest(&input_sha256)?,
    };

    debug!(
        items = payload.items.len(),
        config_issues = config_issues.len(),
        iterations = config.simulation.iterations,
        ci = config.simulation.enabled,
        seed,
        "prepare"
    );

    Ok(Prepared {
        payload,
        config,
        config_issues,
        input_sha256,
        config_sha256,
        seed,
    })
}
