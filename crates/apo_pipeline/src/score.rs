//! Deterministic scoring path: item scores → categories → weights → signals → consistency.
//! Bit-reproducible for identical prepared input; no RNG in scope.

use tracing::{debug, warn};

use apo_algo::{
    aggregate_categories, check_consistency, dominant_timeline, overall_confidence,
    resolve_signals, resolve_weights, score_items, weighted_overall, SignalAdjustments,
    WeightResolution,
};
use apo_core::{CategoryScore, ConfidenceBand, ExternalSignals, PerCategory, Timeline};

use crate::build_result::ItemBreakdown;
use crate::prepare::Prepared;
use crate::PipelineError;

/// Output of the deterministic stages, before the Monte Carlo band.
#[derive(Debug, Clone, PartialEq)]
pub struct Deterministic {
    pub category_breakdown: PerCategory<CategoryScore>,
    pub items_by_category: PerCategory<Vec<ItemBreakdown>>,
    pub weights: WeightResolution,
    /// Weighted overall before external corrections.
    pub base_apo: f64,
    pub overall_apo: f64,
    pub overall_confidence: ConfidenceBand,
    pub timeline: Timeline,
    pub external_signals: ExternalSignals,
    pub adjustments: SignalAdjustments,
    /// Config fallbacks first, then consistency mismatches.
    pub warnings: Vec<String>,
}

pub fn score_deterministic(prepared: &Prepared) -> Result<Deterministic, PipelineError> {
    let cfg = &prepared.config;
    let payload = &prepared.payload;

    let scored = score_items(&payload.items, &cfg.factor_multipliers);
    let mut items_by_category: PerCategory<Vec<ItemBreakdown>> = PerCategory::default();
    for s in &scored {
        items_by_category
            .get_mut(s.item.category)
            .push(ItemBreakdown::from_scored(s));
    }
    debug!(items = scored.len(), "score items");

    let category_breakdown = aggregate_categories(&scored);
    debug!(
        tasks = category_breakdown.tasks.apo,
        knowledge = category_breakdown.knowledge.apo,
        skills = category_breakdown.skills.apo,
        abilities = category_breakdown.abilities.apo,
        technologies = category_breakdown.technologies.apo,
        "aggregate"
    );

    let weights = resolve_weights(&cfg.weights, &payload.items, &cfg.tech_heavy)?;
    debug!(
        tech_heavy = weights.tech_heavy_applied,
        mean_tech_adoption = weights.mean_tech_adoption,
        "weights"
    );

    let base_apo = weighted_overall(&category_breakdown.map(|_, s| s.apo), &weights.weights);
    let (external_signals, adjustments) =
        resolve_signals(payload.external_signals.as_ref(), &cfg.adjustments);
    let overall_apo = adjustments.apply(base_apo);
    debug!(
        base_apo,
        overall_apo,
        trend_pts = adjustments.trend_pts,
        viability_discount = adjustments.viability_discount,
        "signals"
    );

    let mut warnings: Vec<String> = prepared.config_issues.iter().map(ToString::to_string).collect();
    let mismatches = check_consistency(
        &payload.category_apos,
        &category_breakdown,
        cfg.consistency_tolerance,
    );
    for m in &mismatches {
        warn!("{m}");
    }
    warnings.extend(mismatches);

    Ok(Deterministic {
        overall_confidence: overall_confidence(&category_breakdown),
        timeline: dominant_timeline(payload.timeline_projections.as_ref()),
        category_breakdown,
        items_by_category,
        weights,
        base_apo,
        overall_apo,
        external_signals,
        adjustments,
        warnings,
    })
}
