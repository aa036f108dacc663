//! Uncertainty Estimator (Monte Carlo sensitivity band).
//!
//! Per trial, in a fixed draw order:
//! 1. each category score × (1 + N(0, category_sigma)), canonical category order;
//! 2. weighted overall with the final weights;
//! 3. trend points × (1 + N(0, signal_sigma)) if a trend correction exists;
//! 4. viability discount × (1 + N(0, signal_sigma)) if a discount exists;
//! 5. clamp to [0, 100].
//!
//! The band is the 5th/95th percentile of the sorted trial scores.

use apo_core::weights::WeightSet;
use apo_core::{clamp100, ConfidenceInterval, NoiseSource, PerCategory, SimulationParams};

use crate::signals::SignalAdjustments;

pub const LOWER_QUANTILE: f64 = 0.05;
pub const UPPER_QUANTILE: f64 = 0.95;

pub fn simulate<R: NoiseSource + ?Sized>(
    category_apo: &PerCategory<f64>,
    weights: &WeightSet,
    adjustments: &SignalAdjustments,
    params: &SimulationParams,
    rng: &mut R,
) -> ConfidenceInterval {
    let n = params.iterations.max(1);
    let mut trials = Vec::with_capacity(n as usize);

    for _ in 0..n {
        let mut overall = 0.0;
        for (c, apo) in category_apo.iter() {
            let perturbed = apo * (1.0 + rng.gaussian(0.0, params.category_sigma));
            overall += perturbed * weights.get(c);
        }
        if let Some(pts) = adjustments.trend_pts {
            overall += pts * (1.0 + rng.gaussian(0.0, params.signal_sigma));
        }
        if let Some(discount) = adjustments.viability_discount {
            overall -= discount * (1.0 + rng.gaussian(0.0, params.signal_sigma));
        }
        trials.push(clamp100(overall));
    }

    trials.sort_by(f64::total_cmp);
    ConfidenceInterval {
        lower: percentile(&trials, LOWER_QUANTILE),
        upper: percentile(&trials, UPPER_QUANTILE),
        iterations: n,
    }
}

/// Nearest-rank-below quantile of an ascending slice: `sorted[floor(p·(n−1))]`.
/// Returns 0.0 for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
