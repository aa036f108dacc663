//! domain.rs: closed vocabularies, work items, and per-category shapes.
//!
//! Every vocabulary is a closed enum with explicit wire tokens; unknown tokens
//! are rejected at parse time, so downstream code matches exhaustively and
//! never sees an unmapped category or factor.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Define a closed enum with explicit wire tokens, `ALL`, `as_str`, and `FromStr`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident => { $($variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in canonical (declaration) order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire token.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($token => Ok($name::$variant),)+
                    _ => Err(CoreError::UnknownToken),
                }
            }
        }
    };
}

// ------------ Canonical vocabularies (wire tokens explicit) ------------

wire_enum!(
    /// The five fixed buckets items are grouped into.
    Category => {
        Tasks        = "tasks",
        Knowledge    = "knowledge",
        Skills       = "skills",
        Abilities    = "abilities",
        Technologies = "technologies",
    }
);

wire_enum!(
    /// Controlled-vocabulary tag that multiplicatively adjusts an item's score.
    Factor => {
        Routine                 = "routine",
        DataDriven              = "data_driven",
        Creative                = "creative",
        Social                  = "social",
        PhysicalComplex         = "physical_complex",
        Judgment                = "judgment",
        Compliance              = "compliance",
        GenaiBoost              = "genai_boost",
        EconomicViability       = "economic_viability",
        ProductivityEnhancement = "productivity_enhancement",
        InsufficientEvidence    = "insufficient_evidence",
    }
);

wire_enum!(
    Frequency => {
        Low    = "low",
        Medium = "medium",
        High   = "high",
    }
);

wire_enum!(
    /// Coarse summary of evidence quality.
    ConfidenceBand => {
        Low    = "low",
        Medium = "medium",
        High   = "high",
    }
);

wire_enum!(
    /// Dominant bucket of the model's timeline projections.
    Timeline => {
        Immediate  = "immediate",
        ShortTerm  = "short_term",
        MediumTerm = "medium_term",
        LongTerm   = "long_term",
        Unknown    = "unknown",
    }
);

impl Factor {
    /// Documented default multiplier for this factor.
    pub fn default_multiplier(self) -> f64 {
        match self {
            Factor::Routine => 1.2,
            Factor::DataDriven => 1.15,
            Factor::Creative => 0.5,
            Factor::Social => 0.6,
            Factor::PhysicalComplex => 0.7,
            Factor::Judgment => 0.9,
            Factor::Compliance => 0.95,
            Factor::GenaiBoost => 1.2,
            Factor::EconomicViability => 1.1,
            Factor::ProductivityEnhancement => 0.95,
            Factor::InsufficientEvidence => 0.9,
        }
    }
}

impl Frequency {
    /// Normalized frequency signal used by the item formula.
    pub fn score(self) -> f64 {
        match self {
            Frequency::Low => 0.3,
            Frequency::Medium => 0.6,
            Frequency::High => 0.9,
        }
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Medium
    }
}

impl ConfidenceBand {
    /// Band a mean confidence: `>= 0.75` high, `>= 0.5` medium, else low.
    pub fn from_mean(mean: f64) -> Self {
        if mean >= 0.75 {
            ConfidenceBand::High
        } else if mean >= 0.5 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    /// Representative numeric value of a band (used to average bands).
    pub fn anchor(self) -> f64 {
        match self {
            ConfidenceBand::Low => 0.3,
            ConfidenceBand::Medium => 0.6,
            ConfidenceBand::High => 0.85,
        }
    }
}

impl Default for ConfidenceBand {
    fn default() -> Self {
        ConfidenceBand::Medium
    }
}

// ------------ Work items ------------

/// Item confidence when the model omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ItemMetadata {
    /// 0..=1
    pub importance: f64,
    pub frequency: Frequency,
    /// 1..=5
    pub skill_level: u8,
    /// 0..=1
    pub tech_adoption: f64,
}

impl Default for ItemMetadata {
    fn default() -> Self {
        Self {
            importance: 0.5,
            frequency: Frequency::Medium,
            skill_level: 3,
            tech_adoption: 0.5,
        }
    }
}

/// One atomic unit of assessed work, already validated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorkItem {
    pub category: Category,
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub explanation: Option<String>,
    /// Distinct factors in first-seen order.
    pub factors: Vec<Factor>,
    pub confidence: f64,
    pub metadata: ItemMetadata,
}

impl WorkItem {
    /// Item with default confidence and metadata.
    pub fn new(category: Category, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
            explanation: None,
            factors: Vec::new(),
            confidence: DEFAULT_CONFIDENCE,
            metadata: ItemMetadata::default(),
        }
    }
}

// ------------ Per-category shapes ------------

/// Exactly one slot per category; serializes as an object with all five keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PerCategory<T> {
    pub tasks: T,
    pub knowledge: T,
    pub skills: T,
    pub abilities: T,
    pub technologies: T,
}

impl<T> PerCategory<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            tasks: f(Category::Tasks),
            knowledge: f(Category::Knowledge),
            skills: f(Category::Skills),
            abilities: f(Category::Abilities),
            technologies: f(Category::Technologies),
        }
    }

    pub fn get(&self, category: Category) -> &T {
        match category {
            Category::Tasks => &self.tasks,
            Category::Knowledge => &self.knowledge,
            Category::Skills => &self.skills,
            Category::Abilities => &self.abilities,
            Category::Technologies => &self.technologies,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Tasks => &mut self.tasks,
            Category::Knowledge => &mut self.knowledge,
            Category::Skills => &mut self.skills,
            Category::Abilities => &mut self.abilities,
            Category::Technologies => &mut self.technologies,
        }
    }

    /// Iterate `(category, &value)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.get(c)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(Category, &T) -> U) -> PerCategory<U> {
        PerCategory::from_fn(|c| f(c, self.get(c)))
    }
}

/// Aggregated score for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CategoryScore {
    pub apo: f64,
    pub confidence: ConfidenceBand,
    pub item_count: usize,
}

impl Default for CategoryScore {
    /// Empty-category default: `apo = 0.0`, `confidence = medium`.
    fn default() -> Self {
        Self {
            apo: 0.0,
            confidence: ConfidenceBand::Medium,
            item_count: 0,
        }
    }
}

/// The model's own self-reported category score.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModelCategoryApo {
    pub apo: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub confidence: Option<ConfidenceBand>,
}

/// Model-reported timeline projections (each 0..=100).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimelineProjections {
    pub immediate: Option<f64>,
    pub short_term: Option<f64>,
    pub medium_term: Option<f64>,
    pub long_term: Option<f64>,
}

// ------------ External signals ------------

/// Raw labor-market / economics data supplied by external collaborators.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExternalSignalsInput {
    pub bls_trend_pct: Option<f64>,
    pub avg_implementation_cost: Option<f64>,
    pub implementation_cost_low: Option<f64>,
    pub implementation_cost_high: Option<f64>,
    pub annual_wage: Option<f64>,
    pub industry_sector: Option<String>,
    pub sector_delay_months: Option<f64>,
}

impl ExternalSignalsInput {
    /// Average implementation cost: explicit value, else midpoint of the band.
    pub fn average_cost(&self) -> Option<f64> {
        if let Some(avg) = self.avg_implementation_cost {
            return Some(avg);
        }
        match (self.implementation_cost_low, self.implementation_cost_high) {
            (Some(lo), Some(hi)) => Some((lo + hi) / 2.0),
            (Some(one), None) | (None, Some(one)) => Some(one),
            (None, None) => None,
        }
    }
}

/// Resolved external adjustments echoed in the result; absent fields are omitted.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExternalSignals {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub bls_trend_pct: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub bls_adjustment_pts: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub industry_sector: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub sector_delay_months: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub avg_implementation_cost: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub annual_wage: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub econ_viability_discount: Option<f64>,
}

/// Monte Carlo 5th–95th percentile band.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub iterations: u32,
}
