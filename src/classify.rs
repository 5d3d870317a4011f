// src/classify.rs

use crate::config::DetectionConfig;
use crate::types::Segment;

/// Partition segments into left and right lane-boundary candidates by
/// slope sign. Segments with near-zero horizontal extent or slope
/// magnitude outside [min_slope, max_slope] are rejected from both
/// sides; every accepted segment lands in exactly one side.
pub fn classify_segments(
    segments: &[Segment],
    config: &DetectionConfig,
) -> (Vec<Segment>, Vec<Segment>) {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for segment in segments {
        let Some(slope) = segment.slope() else {
            continue;
        };
        if slope.abs() < config.min_slope || slope.abs() > config.max_slope {
            continue;
        }

        if slope < 0.0 {
            left.push(*segment);
        } else {
            right.push(*segment);
        }
    }

    (left, right)
}
