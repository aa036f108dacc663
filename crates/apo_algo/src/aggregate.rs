//! Category Aggregator.
//!
//! Per category: importance×confidence weighted mean of item scores. When every
//! weight is zero the plain mean is used instead. An empty category scores
//! `apo = 0.0` with `confidence = medium` (mean confidence taken as 0.5) and
//! carries `item_count = 0` so callers can tell it apart from a real zero.

use apo_core::weights::WeightSet;
use apo_core::{clamp100, CategoryScore, ConfidenceBand, PerCategory};

use crate::item::ScoredItem;

/// Mean confidence assumed for a category without items.
const EMPTY_MEAN_CONFIDENCE: f64 = 0.5;

#[derive(Default)]
struct Acc {
    n: usize,
    weighted_sum: f64,
    weight_total: f64,
    plain_sum: f64,
    confidence_sum: f64,
}

/// Aggregate scored items into all five categories (always five entries).
pub fn aggregate_categories(scored: &[ScoredItem<'_>]) -> PerCategory<CategoryScore> {
    let mut acc: PerCategory<Acc> = PerCategory::from_fn(|_| Acc::default());
    for s in scored {
        let a = acc.get_mut(s.item.category);
        let w = s.item.metadata.importance * s.item.confidence;
        a.n += 1;
        a.weighted_sum += s.apo * w;
        a.weight_total += w;
        a.plain_sum += s.apo;
        a.confidence_sum += s.item.confidence;
    }
    acc.map(|_, a| finish(a))
}

fn finish(a: &Acc) -> CategoryScore {
    if a.n == 0 {
        return CategoryScore {
            apo: 0.0,
            confidence: ConfidenceBand::from_mean(EMPTY_MEAN_CONFIDENCE),
            item_count: 0,
        };
    }
    let n = a.n as f64;
    let apo = if a.weight_total > 0.0 {
        a.weighted_sum / a.weight_total
    } else {
        a.plain_sum / n
    };
    CategoryScore {
        apo: clamp100(apo),
        confidence: ConfidenceBand::from_mean(a.confidence_sum / n),
        item_count: a.n,
    }
}

/// Average the five band anchors, then band the mean.
pub fn overall_confidence(categories: &PerCategory<CategoryScore>) -> ConfidenceBand {
    let sum: f64 = categories.iter().map(|(_, s)| s.confidence.anchor()).sum();
    ConfidenceBand::from_mean(sum / categories.iter().count() as f64)
}

/// `clamp100(Σ apo_c · w_c)` in canonical category order.
pub fn weighted_overall(scores: &PerCategory<f64>, weights: &WeightSet) -> f64 {
    clamp100(scores.iter().map(|(c, apo)| apo * weights.get(c)).sum())
}
