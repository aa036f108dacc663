//! BUILD_RESULT: the `ScoringResult` document handed back to callers.
//!
//! Shape (all five category keys always present):
//! `{ overall_apo, base_apo, overall_confidence, timeline, category_breakdown,
//!    items_by_category, weights_used, tech_heavy_applied, external_signals,
//!    ci?, insights, recommendations, validation_warnings }`

use serde::Serialize;

use apo_algo::ScoredItem;
use apo_io::validate::{KeyFactors, ValidatedPayload};
use apo_core::weights::WeightSet;
use apo_core::{
    CategoryScore, ConfidenceBand, ConfidenceInterval, ExternalSignals, Factor, PerCategory,
    Timeline,
};

use crate::score::Deterministic;

/// Per-item audit line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBreakdown {
    pub description: String,
    pub apo: f64,
    pub base: f64,
    pub factors: Vec<Factor>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ItemBreakdown {
    pub fn from_scored(s: &ScoredItem<'_>) -> Self {
        Self {
            description: s.item.description.clone(),
            apo: s.apo,
            base: s.base,
            factors: s.item.factors.clone(),
            confidence: s.item.confidence,
            explanation: s.item.explanation.clone(),
        }
    }
}

/// Narrative block derived from the model's key factors. GenAI impacts read
/// as both opportunities and drivers; bottlenecks as both challenges and barriers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Insights {
    pub primary_opportunities: Vec<String>,
    pub main_challenges: Vec<String>,
    pub automation_drivers: Vec<String>,
    pub barriers: Vec<String>,
}

impl From<&KeyFactors> for Insights {
    fn from(k: &KeyFactors) -> Self {
        Self {
            primary_opportunities: k.gen_ai_impacts.clone(),
            main_challenges: k.bottlenecks.clone(),
            automation_drivers: k.gen_ai_impacts.clone(),
            barriers: k.bottlenecks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    pub overall_apo: f64,
    pub base_apo: f64,
    pub overall_confidence: ConfidenceBand,
    pub timeline: Timeline,
    pub category_breakdown: PerCategory<CategoryScore>,
    pub items_by_category: PerCategory<Vec<ItemBreakdown>>,
    pub weights_used: WeightSet,
    pub tech_heavy_applied: bool,
    pub external_signals: ExternalSignals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ci: Option<ConfidenceInterval>,
    pub insights: Insights,
    pub recommendations: Vec<String>,
    pub validation_warnings: Vec<String>,
}

pub fn build(
    payload: &ValidatedPayload,
    det: Deterministic,
    ci: Option<ConfidenceInterval>,
) -> ScoringResult {
    ScoringResult {
        overall_apo: det.overall_apo,
        base_apo: det.base_apo,
        overall_confidence: det.overall_confidence,
        timeline: det.timeline,
        category_breakdown: det.category_breakdown,
        items_by_category: det.items_by_category,
        weights_used: det.weights.weights,
        tech_heavy_applied: det.weights.tech_heavy_applied,
        external_signals: det.external_signals,
        ci,
        insights: Insights::from(&payload.key_factors),
        recommendations: payload.recommendations.clone(),
        validation_warnings: det.warnings,
    }
}
