//! apo_core: Core types, closed vocabularies, engine configuration, and the
//! seedable noise RNG for the Automation Potential Outlook (APO) engine.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`apo_io`, `apo_algo`, `apo_pipeline`, `apo_cli`).
//!
//! - Closed vocabularies: `Category`, `Factor`, `Frequency`, `ConfidenceBand`
//! - Work items and their metadata (defaults applied at validation time)
//! - `PerCategory<T>`: exactly five slots, one per category
//! - `WeightSet` / `FactorMultipliers` tables with their documented defaults
//! - `EngineConfig`: explicit configuration value passed into every call
//! - Seedable RNG (ChaCha20) for **Monte Carlo noise only**
//!
//! Serialization derives are gated behind the `serde` feature (on by default).

pub mod errors {
    use core::fmt;

    /// Minimal error set for core-domain validation & parsing.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub enum CoreError {
        UnknownToken,
        NonFinite(&'static str),
        DomainOutOfRange(&'static str),
        EmptyWeights,
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::UnknownToken => write!(f, "unknown vocabulary token"),
                CoreError::NonFinite(k) => write!(f, "non-finite value: {k}"),
                CoreError::DomainOutOfRange(k) => write!(f, "domain out of range: {k}"),
                CoreError::EmptyWeights => write!(f, "weights sum to zero"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod domain;
pub mod weights;
pub mod config;
pub mod rng;

/// Clamp a score into the closed APO range `[0, 100]`.
#[inline]
pub fn clamp100(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

pub use config::{AdjustmentPolicy, EngineConfig, SimulationParams, TechHeavyRule};
pub use domain::{
    Category, CategoryScore, ConfidenceBand, ConfidenceInterval, ExternalSignals,
    ExternalSignalsInput, Factor, Frequency, ItemMetadata, ModelCategoryApo, PerCategory,
    Timeline, TimelineProjections, WorkItem,
};
pub use errors::CoreError;
pub use rng::{NoiseRng, NoiseSource};
pub use weights::{FactorMultipliers, WeightSet};
