//! weights.rs: category weights and factor multiplier tables.
//!
//! `WeightSet` holds five non-negative weights; after `normalized()` they sum
//! to 1.0 (within 1e-6). `FactorMultipliers` is total over `Factor`: any
//! factor without an override uses its documented default.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::domain::{Category, Factor, PerCategory};
use crate::errors::CoreError;

/// Tolerance for the sum-to-one invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WeightSet(PerCategory<f64>);

impl WeightSet {
    /// Hard defaults: tasks .35, technologies .25, skills .20, abilities .15, knowledge .05.
    pub const DEFAULT: WeightSet = WeightSet(PerCategory {
        tasks: 0.35,
        knowledge: 0.05,
        skills: 0.20,
        abilities: 0.15,
        technologies: 0.25,
    });

    /// Construct from raw weights; every weight must be finite and non-negative.
    pub fn new(raw: PerCategory<f64>) -> Result<Self, CoreError> {
        for (_, &w) in raw.iter() {
            if !w.is_finite() {
                return Err(CoreError::NonFinite("weight"));
            }
            if w < 0.0 {
                return Err(CoreError::DomainOutOfRange("weight"));
            }
        }
        Ok(Self(raw))
    }

    /// Fill missing categories from the defaults, then normalize.
    pub fn merged_with_defaults(partial: &PerCategory<Option<f64>>) -> Result<Self, CoreError> {
        let merged = PerCategory::from_fn(|c| partial.get(c).unwrap_or(Self::DEFAULT.get(c)));
        Self::new(merged)?.normalized()
    }

    pub fn get(&self, category: Category) -> f64 {
        *self.0.get(category)
    }

    pub fn as_per_category(&self) -> &PerCategory<f64> {
        &self.0
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, w)| *w).sum()
    }

    /// Scale so the weights sum to 1.0. Fails if they sum to zero.
    pub fn normalized(&self) -> Result<Self, CoreError> {
        let total = self.sum();
        if !total.is_finite() {
            return Err(CoreError::NonFinite("weight sum"));
        }
        if total <= 0.0 {
            return Err(CoreError::EmptyWeights);
        }
        Ok(Self(self.0.map(|_, w| w / total)))
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }
}

impl Default for WeightSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Multiplier per factor; serializes as the full eleven-entry table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FactorMultipliers(BTreeMap<Factor, f64>);

impl FactorMultipliers {
    pub fn defaults() -> Self {
        Self(Factor::ALL.iter().map(|&f| (f, f.default_multiplier())).collect())
    }

    /// Override one factor; the multiplier must be finite and non-negative.
    pub fn set(&mut self, factor: Factor, multiplier: f64) -> Result<(), CoreError> {
        if !multiplier.is_finite() {
            return Err(CoreError::NonFinite("factor multiplier"));
        }
        if multiplier < 0.0 {
            return Err(CoreError::DomainOutOfRange("factor multiplier"));
        }
        self.0.insert(factor, multiplier);
        Ok(())
    }

    pub fn get(&self, factor: Factor) -> f64 {
        self.0
            .get(&factor)
            .copied()
            .unwrap_or_else(|| factor.default_multiplier())
    }

    /// Product of the multipliers of `factors`; 1.0 for an empty slice.
    pub fn product(&self, factors: &[Factor]) -> f64 {
        factors.iter().map(|&f| self.get(f)).product()
    }
}

impl Default for FactorMultipliers {
    fn default() -> Self {
        Self::defaults()
    }
}
