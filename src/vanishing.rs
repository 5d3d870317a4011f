// src/vanishing.rs
//
// Consensus estimate of the perspective convergence point from
// full-frame segments. Deliberately lightweight: component-wise median
// of pairwise intersections plus a radius inlier count, not an
// iterative robust fit.

use crate::types::{Segment, VanishingPoint};
use tracing::debug;

/// Intersections above this fraction of the frame height are plausible
/// vanishing points; anything lower sits on the road surface.
const MAX_Y_RATIO: f32 = 0.7;
/// Inlier radius around the median, in pixels.
const INLIER_RADIUS: f32 = 50.0;

/// Estimate the vanishing point from line segment intersections.
/// Needs at least 2 segments and 3 in-bounds intersections, otherwise
/// absent.
pub fn estimate_vanishing_point(
    segments: &[Segment],
    height: i32,
    width: i32,
) -> Option<VanishingPoint> {
    if segments.len() < 2 {
        return None;
    }

    let y_limit = height as f32 * MAX_Y_RATIO;
    let mut intersections: Vec<(f32, f32)> = Vec::new();

    for (i, a) in segments.iter().enumerate() {
        for b in &segments[i + 1..] {
            let Some((px, py)) = intersect(a, b) else {
                continue;
            };
            if px >= 0.0 && px <= width as f32 && py >= 0.0 && py <= y_limit {
                intersections.push((px, py));
            }
        }
    }

    if intersections.len() < 3 {
        debug!(
            candidates = intersections.len(),
            "too few in-bounds intersections for a vanishing point"
        );
        return None;
    }

    let center_x = median(intersections.iter().map(|p| p.0).collect());
    let center_y = median(intersections.iter().map(|p| p.1).collect());

    let inliers = intersections
        .iter()
        .filter(|(x, y)| (x - center_x).hypot(y - center_y) < INLIER_RADIUS)
        .count();
    let confidence = (inliers as f32 / intersections.len().max(1) as f32).min(1.0);

    Some(VanishingPoint {
        x: center_x,
        y: center_y,
        confidence,
    })
}

/// Intersection of the infinite-line extensions of two segments via the
/// 2x2 determinant solution. None when near-parallel.
fn intersect(a: &Segment, b: &Segment) -> Option<(f32, f32)> {
    let (x1, y1, x2, y2) = (a.x1 as f32, a.y1 as f32, a.x2 as f32, a.y2 as f32);
    let (x3, y3, x4, y4) = (b.x1 as f32, b.y1 as f32, b.x2 as f32, b.y2 as f32);

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom.abs() < 1e-6 {
        return None;
    }

    let det_a = x1 * y2 - y1 * x2;
    let det_b = x3 * y4 - y3 * x4;
    let px = (det_a * (x3 - x4) - (x1 - x2) * det_b) / denom;
    let py = (det_a * (y3 - y4) - (y1 - y2) * det_b) / denom;

    Some((px, py))
}

fn median(mut values: Vec<f32>) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
