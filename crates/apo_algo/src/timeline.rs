//! Dominant timeline bucket from the model's projections.

use apo_core::{Timeline, TimelineProjections};

/// Bucket with the largest positive value; earlier buckets win ties.
/// `Unknown` when nothing is projected.
pub fn dominant_timeline(projections: Option<&TimelineProjections>) -> Timeline {
    let Some(p) = projections else {
        return Timeline::Unknown;
    };
    let buckets = [
        (Timeline::Immediate, p.immediate),
        (Timeline::ShortTerm, p.short_term),
        (Timeline::MediumTerm, p.medium_term),
        (Timeline::LongTerm, p.long_term),
    ];
    let mut best = (Timeline::Unknown, 0.0);
    for (bucket, value) in buckets {
        if let Some(v) = value {
            if v > best.1 {
                best = (bucket, v);
            }
        }
    }
    best.0
}
