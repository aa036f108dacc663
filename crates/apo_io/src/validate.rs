//! validate.rs: enforce the item/category contract on raw LLM output.
//!
//! Validation is typed and manual: every rejection names the offending field by
//! JSON Pointer (RFC 6901) together with the violated constraint, and nothing is
//! silently coerced. `null` is treated as "absent" for optional fields. Fields
//! outside the contract are ignored, except inside `category_apos`, whose keys
//! must be categories.

use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use apo_core::{
    config::MAX_ITERATIONS, Category, ConfidenceBand, ExternalSignalsInput, Factor, Frequency,
    ItemMetadata, ModelCategoryApo, PerCategory, TimelineProjections, WorkItem,
};
use apo_core::domain::DEFAULT_CONFIDENCE;

/// Longest accepted item explanation, in characters.
pub const MAX_EXPLANATION_CHARS: usize = 500;

/// Contract violation at a specific location in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed at {pointer}: {constraint}")]
pub struct ValidationError {
    /// JSON Pointer to the offending value (`/` for the document root).
    pub pointer: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(pointer: impl Into<String>, constraint: impl Into<String>) -> Self {
        let pointer = pointer.into();
        Self {
            pointer: if pointer.is_empty() { "/".to_string() } else { pointer },
            constraint: constraint.into(),
        }
    }
}

type VResult<T> = Result<T, ValidationError>;

/// Monte Carlo overrides carried in the payload; all optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MonteCarloRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Qualitative drivers the model lists next to its scores. Carried through
/// untouched into the result's `insights`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct KeyFactors {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bottlenecks: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gen_ai_impacts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adaptation_strategies: Vec<String>,
}

impl KeyFactors {
    pub fn is_empty(&self) -> bool {
        self.bottlenecks.is_empty() && self.gen_ai_impacts.is_empty() && self.adaptation_strategies.is_empty()
    }
}

/// The payload after the contract holds. `config` stays raw: it is resolved
/// separately so a malformed configuration degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedPayload {
    pub items: Vec<WorkItem>,
    pub category_apos: PerCategory<Option<ModelCategoryApo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_projections: Option<TimelineProjections>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_signals: Option<ExternalSignalsInput>,
    pub monte_carlo: MonteCarloRequest,
    #[serde(skip_serializing_if = "KeyFactors::is_empty")]
    pub key_factors: KeyFactors,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

/// Validate a whole payload document.
pub fn validate_payload(doc: &Value) -> VResult<ValidatedPayload> {
    let root = as_object(doc, "")?;

    let items_ptr = child("", "items");
    let items = match present(root, "items") {
        None => return Err(ValidationError::new(items_ptr, "required")),
        Some(Value::Array(arr)) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| validate_item(v, &index(&items_ptr, i)))
            .collect::<VResult<Vec<_>>>()?,
        Some(_) => return Err(ValidationError::new(items_ptr, "must be an array")),
    };
    if items.is_empty() {
        return Err(ValidationError::new(items_ptr, "must contain at least one item"));
    }

    let category_apos = match present(root, "category_apos") {
        Some(v) => validate_category_apos(v, &child("", "category_apos"))?,
        None => PerCategory::default(),
    };

    let timeline_projections = present(root, "timeline_projections")
        .map(|v| validate_timeline(v, &child("", "timeline_projections")))
        .transpose()?;

    let external_signals = present(root, "external_signals")
        .map(|v| validate_external_signals(v, &child("", "external_signals")))
        .transpose()?;

    let monte_carlo = match present(root, "monte_carlo") {
        Some(v) => validate_monte_carlo(v, &child("", "monte_carlo"))?,
        None => MonteCarloRequest::default(),
    };

    let key_factors = match present(root, "key_factors") {
        Some(v) => validate_key_factors(v, &child("", "key_factors"))?,
        None => KeyFactors::default(),
    };
    let recommendations = opt_string_list(root, "recommendations", "")?;

    Ok(ValidatedPayload {
        items,
        category_apos,
        timeline_projections,
        config: present(root, "config").cloned(),
        external_signals,
        monte_carlo,
        key_factors,
        recommendations,
    })
}

/// Validate one work item at `ptr`.
pub fn validate_item(v: &Value, ptr: &str) -> VResult<WorkItem> {
    let obj = as_object(v, ptr)?;

    let category: Category = required_token(obj, "category", ptr, "tasks|knowledge|skills|abilities|technologies")?;

    let description = match required(obj, "description", ptr)? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::String(_) => {
            return Err(ValidationError::new(child(ptr, "description"), "must be non-empty"))
        }
        _ => return Err(ValidationError::new(child(ptr, "description"), "must be a string")),
    };

    let explanation = match opt_string(obj, "explanation", ptr)? {
        Some("") => return Err(ValidationError::new(child(ptr, "explanation"), "must be non-empty")),
        Some(s) if s.chars().count() > MAX_EXPLANATION_CHARS => {
            return Err(ValidationError::new(
                child(ptr, "explanation"),
                format!("must be at most {MAX_EXPLANATION_CHARS} characters"),
            ))
        }
        other => other.map(str::to_string),
    };

    let factors = match present(obj, "factors") {
        None => Vec::new(),
        Some(Value::Array(arr)) => {
            let fptr = child(ptr, "factors");
            let mut out: Vec<Factor> = Vec::with_capacity(arr.len());
            for (i, fv) in arr.iter().enumerate() {
                let f: Factor = token(fv, &index(&fptr, i), "a known factor")?;
                if !out.contains(&f) {
                    out.push(f);
                }
            }
            out
        }
        Some(_) => return Err(ValidationError::new(child(ptr, "factors"), "must be an array")),
    };

    let confidence = opt_number_in(obj, "confidence", ptr, 0.0, 1.0)?.unwrap_or(DEFAULT_CONFIDENCE);

    let metadata = match present(obj, "metadata") {
        Some(mv) => validate_metadata(mv, &child(ptr, "metadata"))?,
        None => ItemMetadata::default(),
    };

    Ok(WorkItem {
        category,
        description,
        explanation,
        factors,
        confidence,
        metadata,
    })
}

fn validate_metadata(v: &Value, ptr: &str) -> VResult<ItemMetadata> {
    let obj = as_object(v, ptr)?;
    let d = ItemMetadata::default();

    let skill_level = match present(obj, "skill_level") {
        None => d.skill_level,
        Some(sv) => {
            let sptr = child(ptr, "skill_level");
            let n = number(sv, &sptr)?;
            if n.fract() != 0.0 || !(1.0..=5.0).contains(&n) {
                return Err(ValidationError::new(sptr, "must be an integer in 1..=5"));
            }
            n as u8
        }
    };

    Ok(ItemMetadata {
        importance: opt_number_in(obj, "importance", ptr, 0.0, 1.0)?.unwrap_or(d.importance),
        frequency: opt_token::<Frequency>(obj, "frequency", ptr, "low|medium|high")?.unwrap_or(d.frequency),
        skill_level,
        tech_adoption: opt_number_in(obj, "tech_adoption", ptr, 0.0, 1.0)?.unwrap_or(d.tech_adoption),
    })
}

fn validate_category_apos(v: &Value, ptr: &str) -> VResult<PerCategory<Option<ModelCategoryApo>>> {
    let obj = as_object(v, ptr)?;
    let mut out: PerCategory<Option<ModelCategoryApo>> = PerCategory::default();
    for (key, entry) in obj {
        let eptr = child(ptr, key);
        let category = Category::from_str(key)
            .map_err(|_| ValidationError::new(eptr.clone(), "unknown category"))?;
        if entry.is_null() {
            continue;
        }
        let parsed = match entry {
            Value::Number(_) => ModelCategoryApo {
                apo: number_in(entry, &eptr, 0.0, 100.0)?,
                confidence: None,
            },
            Value::Object(eobj) => ModelCategoryApo {
                apo: number_in(required(eobj, "apo", &eptr)?, &child(&eptr, "apo"), 0.0, 100.0)?,
                confidence: opt_token::<ConfidenceBand>(eobj, "confidence", &eptr, "low|medium|high")?,
            },
            _ => {
                return Err(ValidationError::new(eptr, "must be a number or an object with `apo`"))
            }
        };
        *out.get_mut(category) = Some(parsed);
    }
    Ok(out)
}

fn validate_timeline(v: &Value, ptr: &str) -> VResult<TimelineProjections> {
    let obj = as_object(v, ptr)?;
    Ok(TimelineProjections {
        immediate: opt_number_in(obj, "immediate", ptr, 0.0, 100.0)?,
        short_term: opt_number_in(obj, "short_term", ptr, 0.0, 100.0)?,
        medium_term: opt_number_in(obj, "medium_term", ptr, 0.0, 100.0)?,
        long_term: opt_number_in(obj, "long_term", ptr, 0.0, 100.0)?,
    })
}

/// Validate an external-signals object (payload field or standalone file).
/// Missing fields are fine; present fields must be well-formed.
pub fn validate_external_signals(v: &Value, ptr: &str) -> VResult<ExternalSignalsInput> {
    let obj = as_object(v, ptr)?;
    Ok(ExternalSignalsInput {
        bls_trend_pct: opt_number_in(obj, "bls_trend_pct", ptr, -100.0, f64::MAX)?,
        avg_implementation_cost: opt_number_in(obj, "avg_implementation_cost", ptr, 0.0, f64::MAX)?,
        implementation_cost_low: opt_number_in(obj, "implementation_cost_low", ptr, 0.0, f64::MAX)?,
        implementation_cost_high: opt_number_in(obj, "implementation_cost_high", ptr, 0.0, f64::MAX)?,
        annual_wage: opt_number_in(obj, "annual_wage", ptr, 0.0, f64::MAX)?,
        industry_sector: opt_string(obj, "industry_sector", ptr)?.map(str::to_string),
        sector_delay_months: opt_number_in(obj, "sector_delay_months", ptr, 0.0, f64::MAX)?,
    })
}

fn validate_key_factors(v: &Value, ptr: &str) -> VResult<KeyFactors> {
    let obj = as_object(v, ptr)?;
    Ok(KeyFactors {
        bottlenecks: opt_string_list(obj, "bottlenecks", ptr)?,
        gen_ai_impacts: opt_string_list(obj, "gen_ai_impacts", ptr)?,
        adaptation_strategies: opt_string_list(obj, "adaptation_strategies", ptr)?,
    })
}

fn validate_monte_carlo(v: &Value, ptr: &str) -> VResult<MonteCarloRequest> {
    let obj = as_object(v, ptr)?;

    let iterations = match present(obj, "iterations") {
        None => None,
        Some(iv) => {
            let iptr = child(ptr, "iterations");
            match iv.as_u64() {
                Some(n) if (1..=u64::from(MAX_ITERATIONS)).contains(&n) => Some(n as u32),
                _ => {
                    return Err(ValidationError::new(
                        iptr,
                        format!("must be an integer in 1..={MAX_ITERATIONS}"),
                    ))
                }
            }
        }
    };

    let enabled = match present(obj, "enabled") {
        None => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => return Err(ValidationError::new(child(ptr, "enabled"), "must be a boolean")),
    };

    let seed = match present(obj, "seed") {
        None => None,
        Some(sv) => match sv.as_u64() {
            Some(s) => Some(s),
            None => {
                return Err(ValidationError::new(
                    child(ptr, "seed"),
                    "must be a non-negative 64-bit integer",
                ))
            }
        },
    };

    Ok(MonteCarloRequest { iterations, enabled, seed })
}

// ---------------------------- pointer helpers ----------------------------

/// Escape one reference token per RFC 6901 (`~` → `~0`, `/` → `~1`).
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn child(ptr: &str, key: &str) -> String {
    format!("{ptr}/{}", escape_pointer_token(key))
}

fn index(ptr: &str, i: usize) -> String {
    format!("{ptr}/{i}")
}

// ---------------------------- typed accessors ----------------------------

fn as_object<'a>(v: &'a Value, ptr: &str) -> VResult<&'a Map<String, Value>> {
    v.as_object()
        .ok_or_else(|| ValidationError::new(ptr, "must be an object"))
}

/// Field value, treating JSON `null` as absent.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str, ptr: &str) -> VResult<&'a Value> {
    present(obj, key).ok_or_else(|| ValidationError::new(child(ptr, key), "required"))
}

fn number(v: &Value, ptr: &str) -> VResult<f64> {
    match v {
        Value::Number(n) => n
            .as_f64()
            .filter(|x| x.is_finite())
            .ok_or_else(|| ValidationError::new(ptr, "must be a finite number")),
        _ => Err(ValidationError::new(ptr, "must be a number")),
    }
}

fn number_in(v: &Value, ptr: &str, lo: f64, hi: f64) -> VResult<f64> {
    let x = number(v, ptr)?;
    if x < lo || x > hi {
        let constraint = if hi == f64::MAX {
            format!("must be >= {lo}")
        } else {
            format!("must be in [{lo}, {hi}]")
        };
        return Err(ValidationError::new(ptr, constraint));
    }
    Ok(x)
}

fn opt_number_in(obj: &Map<String, Value>, key: &str, ptr: &str, lo: f64, hi: f64) -> VResult<Option<f64>> {
    present(obj, key)
        .map(|v| number_in(v, &child(ptr, key), lo, hi))
        .transpose()
}

fn opt_string<'a>(obj: &'a Map<String, Value>, key: &str, ptr: &str) -> VResult<Option<&'a str>> {
    match present(obj, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::new(child(ptr, key), "must be a string")),
    }
}

/// Optional array of strings; absent or `null` is empty.
fn opt_string_list(obj: &Map<String, Value>, key: &str, ptr: &str) -> VResult<Vec<String>> {
    let lptr = child(ptr, key);
    match present(obj, key) {
        None => Ok(Vec::new()),
        Some(Value::Array(arr)) => arr
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::String(s) => Ok(s.clone()),
                _ => Err(ValidationError::new(index(&lptr, i), "must be a string")),
            })
            .collect(),
        Some(_) => Err(ValidationError::new(lptr, "must be an array of strings")),
    }
}

fn token<T: FromStr>(v: &Value, ptr: &str, expected: &str) -> VResult<T> {
    match v {
        Value::String(s) => s
            .parse::<T>()
            .map_err(|_| ValidationError::new(ptr, format!("unknown token {s:?}; expected {expected}"))),
        _ => Err(ValidationError::new(ptr, "must be a string")),
    }
}

fn required_token<T: FromStr>(obj: &Map<String, Value>, key: &str, ptr: &str, expected: &str) -> VResult<T> {
    token(required(obj, key, ptr)?, &child(ptr, key), expected)
}

fn opt_token<T: FromStr>(obj: &Map<String, Value>, key: &str, ptr: &str, expected: &str) -> VResult<Option<T>> {
    present(obj, key)
        .map(|v| token(v, &child(ptr, key), expected))
        .transpose()
}
