//! config.rs: `EngineConfig`, the explicit configuration value passed into
//! every scoring call. No process-wide tables: defaults live in `Default` impls.
//!
//! Policy tables deserialize with `#[serde(default)]`, so a partial JSON table
//! is merged over the documented defaults field by field.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::weights::{FactorMultipliers, WeightSet};

/// Shift weight toward `technologies` when adoption evidence is strong.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TechHeavyRule {
    /// Mean `tech_adoption` of technology items at or above which the rule fires.
    pub adoption_threshold: f64,
    /// Weight moved to `technologies`, taken evenly from the other four.
    pub boost: f64,
}

impl Default for TechHeavyRule {
    fn default() -> Self {
        Self {
            adoption_threshold: 0.6,
            boost: 0.10,
        }
    }
}

impl TechHeavyRule {
    pub fn validate(&self) -> Result<(), CoreError> {
        finite_in(self.adoption_threshold, 0.0, 1.0, "tech_heavy.adoption_threshold")?;
        finite_in(self.boost, 0.0, 1.0, "tech_heavy.boost")
    }
}

/// Thresholds and magnitudes for the external-signal corrections.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AdjustmentPolicy {
    /// Employment trend (%) at or below which points are added.
    pub decline_threshold_pct: f64,
    /// Employment trend (%) at or above which points are subtracted.
    pub growth_threshold_pct: f64,
    pub trend_adjustment_pts: f64,
    /// Discount applies when `avg_cost > payback_years * annual_wage`.
    pub payback_years: f64,
    pub viability_discount_pts: f64,
}

impl Default for AdjustmentPolicy {
    fn default() -> Self {
        Self {
            decline_threshold_pct: -3.0,
            growth_threshold_pct: 5.0,
            trend_adjustment_pts: 3.0,
            payback_years: 3.0,
            viability_discount_pts: 10.0,
        }
    }
}

impl AdjustmentPolicy {
    pub fn validate(&self) -> Result<(), CoreError> {
        finite(self.decline_threshold_pct, "adjustments.decline_threshold_pct")?;
        finite(self.growth_threshold_pct, "adjustments.growth_threshold_pct")?;
        if self.decline_threshold_pct >= self.growth_threshold_pct {
            return Err(CoreError::DomainOutOfRange("adjustments.decline_threshold_pct"));
        }
        finite_in(self.trend_adjustment_pts, 0.0, 100.0, "adjustments.trend_adjustment_pts")?;
        finite_in(self.payback_years, 0.0, f64::MAX, "adjustments.payback_years")?;
        finite_in(self.viability_discount_pts, 0.0, 100.0, "adjustments.viability_discount_pts")
    }
}

/// Monte Carlo knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SimulationParams {
    pub enabled: bool,
    pub iterations: u32,
    /// Relative noise on each category score.
    pub category_sigma: f64,
    /// Relative noise on each external adjustment.
    pub signal_sigma: f64,
}

/// Upper bound on trials per run.
pub const MAX_ITERATIONS: u32 = 100_000;

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            enabled: true,
            iterations: 200,
            category_sigma: 0.03,
            signal_sigma: 0.20,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=MAX_ITERATIONS).contains(&self.iterations) {
            return Err(CoreError::DomainOutOfRange("simulation.iterations"));
        }
        finite_in(self.category_sigma, 0.0, 1.0, "simulation.category_sigma")?;
        finite_in(self.signal_sigma, 0.0, 1.0, "simulation.signal_sigma")
    }
}

/// Full engine configuration. Serialize-only: it is built table by table
/// from raw JSON, never deserialized whole.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct EngineConfig {
    pub weights: WeightSet,
    pub factor_multipliers: FactorMultipliers,
    pub tech_heavy: TechHeavyRule,
    pub adjustments: AdjustmentPolicy,
    pub simulation: SimulationParams,
    /// Largest tolerated |model − computed| category gap before a warning.
    pub consistency_tolerance: f64,
}

pub const DEFAULT_CONSISTENCY_TOLERANCE: f64 = 5.0;

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: WeightSet::DEFAULT,
            factor_multipliers: FactorMultipliers::defaults(),
            tech_heavy: TechHeavyRule::default(),
            adjustments: AdjustmentPolicy::default(),
            simulation: SimulationParams::default(),
            consistency_tolerance: DEFAULT_CONSISTENCY_TOLERANCE,
        }
    }
}

fn finite(v: f64, key: &'static str) -> Result<(), CoreError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(CoreError::NonFinite(key))
    }
}

fn finite_in(v: f64, lo: f64, hi: f64, key: &'static str) -> Result<(), CoreError> {
    finite(v, key)?;
    if v < lo || v > hi {
        return Err(CoreError::DomainOutOfRange(key));
    }
    Ok(())
}
