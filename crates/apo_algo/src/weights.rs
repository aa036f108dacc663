//! Weight Resolver: tech-heavy re-weighting over an already-normalized base set.
//!
//! When at least one `technologies` item exists and their mean `tech_adoption`
//! reaches the rule threshold, `technologies` gains `boost` and each other
//! category loses `boost / 4` (floored at zero). The result is renormalized.

use apo_core::weights::WeightSet;
use apo_core::{Category, CoreError, PerCategory, TechHeavyRule, WorkItem};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightResolution {
    /// Final weights; sum to 1.0 within `WEIGHT_SUM_TOLERANCE`.
    pub weights: WeightSet,
    pub tech_heavy_applied: bool,
    /// Mean adoption over technology items, if there were any.
    pub mean_tech_adoption: Option<f64>,
}

pub fn resolve_weights(
    base: &WeightSet,
    items: &[WorkItem],
    rule: &TechHeavyRule,
) -> Result<WeightResolution, CoreError> {
    let base = base.normalized()?;

    let (n, sum) = items
        .iter()
        .filter(|i| i.category == Category::Technologies)
        .fold((0usize, 0.0f64), |(n, s), i| (n + 1, s + i.metadata.tech_adoption));
    let mean_tech_adoption = (n > 0).then(|| sum / n as f64);

    let applies = mean_tech_adoption.is_some_and(|m| m >= rule.adoption_threshold);
    if !applies {
        return Ok(WeightResolution {
            weights: base,
            tech_heavy_applied: false,
            mean_tech_adoption,
        });
    }

    let share = rule.boost / 4.0;
    let shifted = PerCategory::from_fn(|c| {
        let w = base.get(c);
        if c == Category::Technologies {
            w + rule.boost
        } else {
            (w - share).max(0.0)
        }
    });

    Ok(WeightResolution {
        weights: WeightSet::new(shifted)?.normalized()?,
        tech_heavy_applied: true,
        mean_tech_adoption,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use apo_core::weights::WEIGHT_SUM_TOLERANCE;
    use proptest::prelude::*;

    fn tech(adoption: f64) -> WorkItem {
        let mut it = WorkItem::new(Category::Technologies, "spreadsheet software");
        it.metadata.tech_adoption = adoption;
        it
    }

    #[test]
    fn no_technology_items_leaves_weights() {
        let r = resolve_weights(&WeightSet::DEFAULT, &[], &TechHeavyRule::default()).unwrap();
        assert!(!r.tech_heavy_applied);
        assert_eq!(r.mean_tech_adoption, None);
        assert_eq!(r.weights, WeightSet::DEFAULT.normalized().unwrap());
    }

    #[test]
    fn threshold_is_inclusive() {
        let r = resolve_weights(&WeightSet::DEFAULT, &[tech(0.6)], &TechHeavyRule::default()).unwrap();
        assert!(r.tech_heavy_applied);
        let below = resolve_weights(&WeightSet::DEFAULT, &[tech(0.59)], &TechHeavyRule::default()).unwrap();
        assert!(!below.tech_heavy_applied);
    }

    #[test]
    fn boost_shifts_toward_technologies() {
        let r = resolve_weights(&WeightSet::DEFAULT, &[tech(0.9), tech(0.7)], &TechHeavyRule::default())
            .unwrap();
        // 0.25 + 0.10 = 0.35; others lose 0.025 each; sum stays 1.0.
        assert!((r.weights.get(Category::Technologies) - 0.35).abs() < 1e-9);
        assert!((r.weights.get(Category::Knowledge) - 0.025).abs() < 1e-9);
        assert!(r.weights.is_normalized());
    }

    #[test]
    fn small_weights_floor_at_zero_then_renormalize() {
        let base = WeightSet::new(PerCategory {
            tasks: 0.97,
            knowledge: 0.01,
            skills: 0.01,
            abilities: 0.01,
            technologies: 0.0,
        })
        .unwrap();
        let r = resolve_weights(&base, &[tech(1.0)], &TechHeavyRule::default()).unwrap();
        assert_eq!(r.weights.get(Category::Knowledge), 0.0);
        assert!(r.weights.is_normalized());
    }

    proptest! {
        #[test]
        fn weights_always_sum_to_one(
            raw in proptest::array::uniform5(0.0..10.0f64),
            adoptions in proptest::collection::vec(0.0..=1.0f64, 0..5),
        ) {
            prop_assume!(raw.iter().sum::<f64>() > 1e-9);
            let base = WeightSet::new(PerCategory {
                tasks: raw[0], knowledge: raw[1], skills: raw[2], abilities: raw[3], technologies: raw[4],
            }).unwrap();
            let items: Vec<WorkItem> = adoptions.into_iter().map(tech).collect();
            let r = resolve_weights(&base, &items, &TechHeavyRule::default()).unwrap();
            prop_assert!((r.weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        }
    }
}
