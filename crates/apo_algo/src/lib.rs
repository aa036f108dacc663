// crates/apo_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Pure scoring math. Nothing here performs I/O or reads a clock; the only
//! randomness enters through the `NoiseSource` handed to `uncertainty::simulate`.

pub mod aggregate;
pub mod consistency;
pub mod item;
pub mod signals;
pub mod timeline;
pub mod uncertainty;
pub mod weights;

pub use aggregate::{aggregate_categories, overall_confidence, weighted_overall};
pub use consistency::check_consistency;
pub use item::{base_score, score_item, score_items, ScoredItem};
pub use signals::{resolve_signals, SignalAdjustments};
pub use timeline::dominant_timeline;
pub use uncertainty::{percentile, simulate};
pub use weights::{resolve_weights, WeightResolution};
