//! Item Scorer: four normalized signals, a factor product, then a clamp.
//!
//! ```text
//! skill_norm = (skill_level - 1) / 4
//! base       = 100 * (0.30*importance + 0.20*freq + 0.30*(1 - skill_norm) + 0.20*tech_adoption)
//! apo        = clamp(base * Π multiplier(f), 0, 100)
//! ```

use apo_core::weights::FactorMultipliers;
use apo_core::{clamp100, ItemMetadata, WorkItem};

const W_IMPORTANCE: f64 = 0.30;
const W_FREQUENCY: f64 = 0.20;
const W_SKILL: f64 = 0.30;
const W_ADOPTION: f64 = 0.20;

/// An item together with its computed scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredItem<'a> {
    pub item: &'a WorkItem,
    /// Score before factor multipliers (unclamped, already within 0..=100).
    pub base: f64,
    /// Final item score in `[0, 100]`.
    pub apo: f64,
}

/// Base score from metadata alone.
pub fn base_score(meta: &ItemMetadata) -> f64 {
    let skill_norm = (f64::from(meta.skill_level) - 1.0) / 4.0;
    100.0
        * (W_IMPORTANCE * meta.importance
            + W_FREQUENCY * meta.frequency.score()
            + W_SKILL * (1.0 - skill_norm)
            + W_ADOPTION * meta.tech_adoption)
}

pub fn score_item(item: &WorkItem, multipliers: &FactorMultipliers) -> f64 {
    clamp100(base_score(&item.metadata) * multipliers.product(&item.factors))
}

/// Score every item, preserving input order.
pub fn score_items<'a>(items: &'a [WorkItem], multipliers: &FactorMultipliers) -> Vec<ScoredItem<'a>> {
    items
        .iter()
        .map(|item| {
            let base = base_score(&item.metadata);
            ScoredItem {
                item,
                base,
                apo: clamp100(base * multipliers.product(&item.factors)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_core::{Category, Factor, Frequency};
    use proptest::prelude::*;

    fn item(importance: f64, frequency: Frequency, skill_level: u8, tech_adoption: f64) -> WorkItem {
        let mut it = WorkItem::new(Category::Tasks, "t");
        it.metadata = ItemMetadata { importance, frequency, skill_level, tech_adoption };
        it
    }

    #[test]
    fn floor_item_scores_six() {
        let it = item(0.0, Frequency::Low, 5, 0.0);
        let apo = score_item(&it, &FactorMultipliers::defaults());
        assert!((apo - 6.0).abs() < 1e-12, "{apo}");
    }

    #[test]
    fn defaults_item_base() {
        // 100 * (0.15 + 0.12 + 0.15 + 0.10)
        let it = WorkItem::new(Category::Skills, "s");
        assert!((base_score(&it.metadata) - 52.0).abs() < 1e-9);
    }

    #[test]
    fn multiplier_product_is_clamped() {
        // importance 1, high, level 2, adoption 0.75 -> 30 + 18 + 22.5 + 15 = 85.5
        let mut it = item(1.0, Frequency::High, 2, 0.75);
        it.factors = vec![Factor::Routine, Factor::GenaiBoost];
        let scored = score_items(std::slice::from_ref(&it), &FactorMultipliers::defaults());
        assert!((scored[0].base - 85.5).abs() < 1e-9);
        assert_eq!(scored[0].apo, 100.0);
    }

    #[test]
    fn base_ninety_with_routine_and_genai_clamps_to_hundred() {
        // 30 + 18 + 22.5 + 19.5 = 90
        let mut it = item(1.0, Frequency::High, 2, 0.975);
        assert!((base_score(&it.metadata) - 90.0).abs() < 1e-9);
        it.factors = vec![Factor::Routine, Factor::GenaiBoost];
        assert_eq!(score_item(&it, &FactorMultipliers::defaults()), 100.0);
    }

    #[test]
    fn dampening_factors_reduce_score() {
        let mut it = WorkItem::new(Category::Abilities, "a");
        it.factors = vec![Factor::Creative, Factor::Social];
        let apo = score_item(&it, &FactorMultipliers::defaults());
        assert!((apo - 52.0 * 0.5 * 0.6).abs() < 1e-9);
    }

    fn frequency() -> impl Strategy<Value = Frequency> {
        prop_oneof![Just(Frequency::Low), Just(Frequency::Medium), Just(Frequency::High)]
    }

    proptest! {
        #[test]
        fn item_score_always_in_bounds(
            importance in 0.0..=1.0f64,
            freq in frequency(),
            skill in 1u8..=5,
            adoption in 0.0..=1.0f64,
            factor_idx in proptest::collection::vec(0usize..11, 0..6),
        ) {
            let mut it = item(importance, freq, skill, adoption);
            it.factors = factor_idx.into_iter().map(|i| Factor::ALL[i]).collect();
            let apo = score_item(&it, &FactorMultipliers::defaults());
            prop_assert!((0.0..=100.0).contains(&apo));
        }
    }
}
