//! External Signal Adjuster.
//!
//! Two independent corrections on the weighted overall score:
//! - employment trend: `trend <= decline` adds points, `trend >= growth` removes them;
//! - economic viability: `avg_cost > payback_years * annual_wage` (strict) discounts.
//!
//! Missing data skips a correction; the matching output field is then absent.

use apo_core::{clamp100, AdjustmentPolicy, ExternalSignals, ExternalSignalsInput};

/// The numeric corrections actually in force, kept apart from the echo object
/// so the Monte Carlo stage can perturb them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalAdjustments {
    /// Signed points added to the score.
    pub trend_pts: Option<f64>,
    /// Points subtracted from the score (0 or the configured discount).
    pub viability_discount: Option<f64>,
}

impl SignalAdjustments {
    /// `clamp100(base + trend - discount)`.
    pub fn apply(&self, base: f64) -> f64 {
        clamp100(base + self.trend_pts.unwrap_or(0.0) - self.viability_discount.unwrap_or(0.0))
    }
}

pub fn trend_adjustment(trend_pct: f64, policy: &AdjustmentPolicy) -> f64 {
    if trend_pct <= policy.decline_threshold_pct {
        policy.trend_adjustment_pts
    } else if trend_pct >= policy.growth_threshold_pct {
        -policy.trend_adjustment_pts
    } else {
        0.0
    }
}

pub fn viability_discount(avg_cost: f64, annual_wage: f64, policy: &AdjustmentPolicy) -> f64 {
    if avg_cost > policy.payback_years * annual_wage {
        policy.viability_discount_pts
    } else {
        0.0
    }
}

/// Resolve raw signals into the echoed `ExternalSignals` and the corrections.
pub fn resolve_signals(
    input: Option<&ExternalSignalsInput>,
    policy: &AdjustmentPolicy,
) -> (ExternalSignals, SignalAdjustments) {
    let Some(input) = input else {
        return (ExternalSignals::default(), SignalAdjustments::default());
    };

    let trend_pts = input.bls_trend_pct.map(|t| trend_adjustment(t, policy));
    let avg_cost = input.average_cost();
    let viability = match (avg_cost, input.annual_wage) {
        (Some(cost), Some(wage)) => Some(viability_discount(cost, wage, policy)),
        _ => None,
    };

    let echo = ExternalSignals {
        bls_trend_pct: input.bls_trend_pct,
        bls_adjustment_pts: trend_pts,
        industry_sector: input.industry_sector.clone(),
        sector_delay_months: input.sector_delay_months,
        avg_implementation_cost: avg_cost,
        annual_wage: input.annual_wage,
        econ_viability_discount: viability,
    };
    (
        echo,
        SignalAdjustments {
            trend_pts,
            viability_discount: viability,
        },
    )
}
