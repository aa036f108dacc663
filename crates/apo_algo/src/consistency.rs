//! Consistency Checker: the model's own category scores against the recomputed ones.

use apo_core::{CategoryScore, ModelCategoryApo, PerCategory};

/// One warning per category where `|model − computed| > tolerance`, canonical order.
pub fn check_consistency(
    model: &PerCategory<Option<ModelCategoryApo>>,
    computed: &PerCategory<CategoryScore>,
    tolerance: f64,
) -> Vec<String> {
    model
        .iter()
        .filter_map(|(c, m)| {
            let m = m.as_ref()?;
            let ours = computed.get(c).apo;
            let delta = (m.apo - ours).abs();
            (delta > tolerance).then(|| {
                format!(
                    "Category {c} apo mismatch: model={:.1}, computed={:.1}, delta={:.1}",
                    m.apo, ours, delta
                )
            })
        })
        .collect()
}
