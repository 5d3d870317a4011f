// src/curve.rs
//
// Graded curve direction classification from slope trend: how the
// boundary slopes change between the top and bottom halves of the
// frame. Positive combined trend bends right, negative bends left.

use crate::types::{CurveDirection, CurveInfo, Segment};
use tracing::debug;

const TREND_THRESHOLD: f32 = 0.1;
const FULL_CONFIDENCE_TREND: f32 = 0.3;

/// Classify the upcoming road curvature from left/right boundary
/// segments. Sides with fewer than 2 usable segments contribute a zero
/// trend.
pub fn detect_curve_direction(left: &[Segment], right: &[Segment]) -> CurveInfo {
    let left_trend = slope_trend(left);
    let right_trend = slope_trend(right);
    let combined = (left_trend + right_trend) / 2.0;

    let (direction, confidence) = if combined > TREND_THRESHOLD {
        (
            CurveDirection::Right,
            (combined.abs() / FULL_CONFIDENCE_TREND).min(1.0),
        )
    } else if combined < -TREND_THRESHOLD {
        (
            CurveDirection::Left,
            (combined.abs() / FULL_CONFIDENCE_TREND).min(1.0),
        )
    } else {
        (
            CurveDirection::Straight,
            1.0 - (combined.abs() / TREND_THRESHOLD).min(1.0),
        )
    };

    if direction != CurveDirection::Straight {
        debug!(
            direction = direction.as_str(),
            confidence, combined, "curve detected"
        );
    }

    CurveInfo {
        direction,
        confidence,
        left_slope_trend: left_trend,
        right_slope_trend: right_trend,
    }
}

/// Mean slope of the bottom half minus mean slope of the top half,
/// after ordering segments by vertical midpoint.
fn slope_trend(segments: &[Segment]) -> f32 {
    if segments.len() < 2 {
        return 0.0;
    }

    let mut slopes_by_y: Vec<(f32, f32)> = segments
        .iter()
        .filter_map(|s| s.slope().map(|slope| (slope, s.mid_y())))
        .collect();

    if slopes_by_y.len() < 2 {
        return 0.0;
    }

    slopes_by_y.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let split = slopes_by_y.len() / 2;
    let top_mean = mean(slopes_by_y[..split].iter().map(|(s, _)| *s));
    let bottom_mean = mean(slopes_by_y[split..].iter().map(|(s, _)| *s));

    bottom_mean - top_mean
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let mut sum = 0.0;
    let mut count = 0;
    for v in values {
        sum += v;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_curve_from_positive_trend() {
        // Bottom-half slopes are larger than top-half on both sides.
        let left = vec![
            Segment::new(100, 200, 140, 160), // slope -1.0, top
            Segment::new(100, 390, 180, 350), // slope -0.5, bottom
        ];
        let right = vec![
            Segment::new(500, 160, 540, 180), // slope 0.5, top
            Segment::new(500, 350, 540, 390), // slope 1.0, bottom
        ];

        let info = detect_curve_direction(&left, &right);
        assert_eq!(info.direction, CurveDirection::Right);
        assert_eq!(info.confidence, 1.0);
        assert!((info.left_slope_trend - 0.5).abs() < 1e-5);
        assert!((info.right_slope_trend - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_straight_with_full_confidence() {
        let left = vec![
            Segment::new(100, 200, 140, 160),
            Segment::new(100, 390, 140, 350),
        ];
        let right = vec![
            Segment::new(500, 160, 540, 200),
            Segment::new(500, 350, 540, 390),
        ];

        let info = detect_curve_direction(&left, &right);
        assert_eq!(info.direction, CurveDirection::Straight);
        assert_eq!(info.confidence, 1.0);
    }

    #[test]
    fn test_graded_confidence_near_boundary() {
        // Left trend 0.1, right trend 0.0 -> combined 0.05, still
        // straight but with reduced confidence.
        let left = vec![
            Segment::new(100, 200, 140, 180), // slope -0.5, top
            Segment::new(100, 390, 150, 370), // slope -0.4, bottom
        ];
        let right = vec![
            Segment::new(500, 170, 540, 190), // slope 0.5, top
            Segment::new(500, 370, 550, 395), // slope 0.5, bottom
        ];

        let info = detect_curve_direction(&left, &right);
        assert_eq!(info.direction, CurveDirection::Straight);
        assert!((info.confidence - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_single_segment_side_contributes_zero() {
        let left = vec![Segment::new(100, 200, 140, 160)];
        let info = detect_curve_direction(&left, &[]);

        assert_eq!(info.left_slope_trend, 0.0);
        assert_eq!(info.right_slope_trend, 0.0);
        assert_eq!(info.direction, CurveDirection::Straight);
        assert!((0.0..=1.0).contains(&info.confidence));
    }
}
