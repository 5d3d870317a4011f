// src/fit.rs
//
// Regression fit of one side's boundary segments to a two-point lane
// line. x is fitted as a function of y so near-vertical boundaries stay
// well conditioned. A singular normal matrix means "no line", not an
// error.

use crate::types::{LaneLine, Segment};
use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use opencv::core::Point;

/// Fraction of the frame height at which the top endpoint sits.
pub const DEFAULT_Y_TOP_RATIO: f32 = 0.6;

/// Fit a lane line through the endpoints of the given segments,
/// evaluated at the image bottom and the look-ahead height. Quadratic
/// extrapolation is used when `use_polyfit` is set and at least three
/// points are available.
pub fn fit_lane_line(
    segments: &[Segment],
    height: i32,
    y_top_ratio: f32,
    use_polyfit: bool,
) -> Option<LaneLine> {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(segments.len() * 2);
    for s in segments {
        points.push((s.y1 as f64, s.x1 as f64));
        points.push((s.y2 as f64, s.x2 as f64));
    }
    if points.len() < 2 {
        return None;
    }

    let y_bottom = height as f64;
    let y_top = (height as f32 * y_top_ratio).round() as f64;

    let (x_bottom, x_top) = if use_polyfit && points.len() >= 3 {
        let coeffs = quadratic_fit(&points)?;
        (eval_quadratic(&coeffs, y_bottom), eval_quadratic(&coeffs, y_top))
    } else {
        let (m, b) = linear_fit(&points)?;
        (m * y_bottom + b, m * y_top + b)
    };

    Some(LaneLine::new(
        Point::new(x_bottom.round() as i32, y_bottom as i32),
        Point::new(x_top.round() as i32, y_top as i32),
    ))
}

/// Least-squares x = m*y + b via the 2x2 normal equations.
fn linear_fit(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    let (mut sy, mut syy, mut sx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
    for &(y, x) in points {
        sy += y;
        syy += y * y;
        sx += x;
        sxy += x * y;
    }

    let normal = Matrix2::new(syy, sy, sy, n);
    let rhs = Vector2::new(sxy, sx);
    let solution = normal.lu().solve(&rhs)?;
    Some((solution[0], solution[1]))
}

/// Least-squares x = a*y^2 + b*y + c via the 3x3 normal equations.
fn quadratic_fit(points: &[(f64, f64)]) -> Option<Vector3<f64>> {
    let n = points.len() as f64;
    let (mut s1, mut s2, mut s3, mut s4) = (0.0, 0.0, 0.0, 0.0);
    let (mut t0, mut t1, mut t2) = (0.0, 0.0, 0.0);
    for &(y, x) in points {
        let y2 = y * y;
        s1 += y;
        s2 += y2;
        s3 += y2 * y;
        s4 += y2 * y2;
        t0 += x;
        t1 += x * y;
        t2 += x * y2;
    }

    let normal = Matrix3::new(s4, s3, s2, s3, s2, s1, s2, s1, n);
    let rhs = Vector3::new(t2, t1, t0);
    normal.lu().solve(&rhs)
}

fn eval_quadratic(coeffs: &Vector3<f64>, y: f64) -> f64 {
    coeffs[0] * y * y + coeffs[1] * y + coeffs[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_left_boundary() {
        let segments = vec![Segment::new(100, 400, 140, 300)];
        let line = fit_lane_line(&segments, 400, DEFAULT_Y_TOP_RATIO, false).unwrap();

        assert_eq!(line.bottom, Point::new(100, 400));
        assert_eq!(line.top, Point::new(164, 240));
    }

    #[test]
    fn test_fit_right_boundary() {
        let segments = vec![Segment::new(540, 400, 500, 300)];
        let line = fit_lane_line(&segments, 400, DEFAULT_Y_TOP_RATIO, false).unwrap();

        assert_eq!(line.bottom, Point::new(540, 400));
        assert_eq!(line.top, Point::new(476, 240));
        // Endpoints sit exactly at height and height * ratio.
        assert_eq!(line.bottom.y, 400);
        assert_eq!(line.top.y, 240);
    }

    #[test]
    fn test_too_few_points() {
        assert!(fit_lane_line(&[], 400, DEFAULT_Y_TOP_RATIO, false).is_none());
    }

    #[test]
    fn test_singular_fit_is_absent() {
        // All points share one y: x(y) is not a function here.
        let segments = vec![Segment::new(100, 300, 200, 300), Segment::new(300, 300, 400, 300)];
        assert!(fit_lane_line(&segments, 400, DEFAULT_Y_TOP_RATIO, false).is_none());
    }

    #[test]
    fn test_quadratic_matches_linear_on_collinear_points() {
        let segments = vec![Segment::new(100, 400, 140, 300), Segment::new(140, 300, 180, 200)];
        let linear = fit_lane_line(&segments, 400, DEFAULT_Y_TOP_RATIO, false).unwrap();
        let quadratic = fit_lane_line(&segments, 400, DEFAULT_Y_TOP_RATIO, true).unwrap();

        assert_eq!(linear.bottom, quadratic.bottom);
        assert_eq!(linear.top, quadratic.top);
    }
}
