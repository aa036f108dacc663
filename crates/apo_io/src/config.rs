//! config.rs: resolve raw configuration JSON into an `EngineConfig`.
//!
//! Configuration never fails a request. A malformed table is replaced by its
//! documented default and reported as a `ConfigIssue`; factor multipliers fall
//! back entry by entry. Category weights fall back as a whole table, since a
//! partially trusted weight set has no meaningful normalization.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use apo_core::config::DEFAULT_CONSISTENCY_TOLERANCE;
use apo_core::weights::{FactorMultipliers, WeightSet};
use apo_core::{Category, CoreError, EngineConfig, Factor, PerCategory};

/// One configuration problem that was absorbed by falling back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigIssue {
    /// Table (or `table.key`) that fell back.
    pub table: String,
    pub message: String,
}

impl ConfigIssue {
    fn new(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            message: message.into(),
        }
    }

    /// A configuration document that could not be read or parsed at all.
    pub fn unreadable(detail: impl fmt::Display) -> Self {
        let issue = Self::new("config", format!("{detail}; using defaults"));
        warn!(table = %issue.table, "{}", issue.message);
        issue
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config: {}: {}", self.table, self.message)
    }
}

/// A usable configuration plus everything that had to be defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: EngineConfig,
    pub issues: Vec<ConfigIssue>,
}

/// Resolve `raw` (absent → all defaults). Each issue is also logged at `warn`.
pub fn resolve_config(raw: Option<&Value>) -> ResolvedConfig {
    let mut issues = Vec::new();
    let mut config = EngineConfig::default();

    match raw {
        None | Some(Value::Null) => {}
        Some(Value::Object(root)) => {
            for key in root.keys() {
                if !matches!(
                    key.as_str(),
                    "weights"
                        | "factor_multipliers"
                        | "tech_heavy"
                        | "adjustments"
                        | "simulation"
                        | "consistency_tolerance"
                ) {
                    issues.push(ConfigIssue::new(key.as_str(), "unknown table ignored"));
                }
            }
            if let Some(v) = present(root, "weights") {
                match resolve_weights(v) {
                    Ok(w) => config.weights = w,
                    Err(msg) => issues.push(ConfigIssue::new("weights", format!("{msg}; using defaults"))),
                }
            }
            if let Some(v) = present(root, "factor_multipliers") {
                config.factor_multipliers = resolve_multipliers(v, &mut issues);
            }
            if let Some(v) = present(root, "tech_heavy") {
                config.tech_heavy = resolve_table(v, "tech_heavy", |t: &apo_core::TechHeavyRule| t.validate(), &mut issues);
            }
            if let Some(v) = present(root, "adjustments") {
                config.adjustments = resolve_table(v, "adjustments", |t: &apo_core::AdjustmentPolicy| t.validate(), &mut issues);
            }
            if let Some(v) = present(root, "simulation") {
                config.simulation = resolve_table(v, "simulation", |t: &apo_core::SimulationParams| t.validate(), &mut issues);
            }
            if let Some(v) = present(root, "consistency_tolerance") {
                match v.as_f64() {
                    Some(t) if t.is_finite() && t >= 0.0 => config.consistency_tolerance = t,
                    _ => issues.push(ConfigIssue::new(
                        "consistency_tolerance",
                        format!("must be a non-negative number; using {DEFAULT_CONSISTENCY_TOLERANCE}"),
                    )),
                }
            }
        }
        Some(_) => issues.push(ConfigIssue::new("config", "must be an object; using defaults")),
    }

    for issue in &issues {
        warn!(table = %issue.table, "{}", issue.message);
    }
    ResolvedConfig { config, issues }
}

fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn resolve_weights(v: &Value) -> Result<WeightSet, String> {
    let obj = v.as_object().ok_or("must be an object")?;
    let mut partial: PerCategory<Option<f64>> = PerCategory::default();
    for (key, wv) in obj {
        let category = Category::from_str(key).map_err(|_| format!("unknown category {key:?}"))?;
        if wv.is_null() {
            continue;
        }
        let w = wv
            .as_f64()
            .ok_or_else(|| format!("{key} must be a number"))?;
        *partial.get_mut(category) = Some(w);
    }
    WeightSet::merged_with_defaults(&partial).map_err(|e| match e {
        CoreError::EmptyWeights => "weights sum to zero".to_string(),
        other => other.to_string(),
    })
}

fn resolve_multipliers(v: &Value, issues: &mut Vec<ConfigIssue>) -> FactorMultipliers {
    let mut table = FactorMultipliers::defaults();
    let Some(obj) = v.as_object() else {
        issues.push(ConfigIssue::new("factor_multipliers", "must be an object; using defaults"));
        return table;
    };
    for (key, mv) in obj {
        let slot = format!("factor_multipliers.{key}");
        let Ok(factor) = Factor::from_str(key) else {
            issues.push(ConfigIssue::new(slot, "unknown factor ignored"));
            continue;
        };
        if mv.is_null() {
            continue;
        }
        let applied = mv
            .as_f64()
            .ok_or(CoreError::NonFinite("factor multiplier"))
            .and_then(|m| table.set(factor, m));
        if let Err(e) = applied {
            issues.push(ConfigIssue::new(
                slot,
                format!("{e}; using default {}", factor.default_multiplier()),
            ));
        }
    }
    table
}

fn resolve_table<T, F>(v: &Value, name: &str, validate: F, issues: &mut Vec<ConfigIssue>) -> T
where
    T: DeserializeOwned + Default,
    F: Fn(&T) -> Result<(), CoreError>,
{
    match serde_json::from_value::<T>(v.clone()) {
        Ok(t) => match validate(&t) {
            Ok(()) => t,
            Err(e) => {
                issues.push(ConfigIssue::new(name, format!("{e}; using defaults")));
                T::default()
            }
        },
        Err(e) => {
            issues.push(ConfigIssue::new(name, format!("{e}; using defaults")));
            T::default()
        }
    }
}
