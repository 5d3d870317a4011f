// src/roi.rs
//
// Region-of-interest selection for the edge map. When a confident
// vanishing point is available the polygon apex tracks it, following
// the true road geometry; otherwise a fixed trapezoid is the safe
// default so a noisy estimate cannot produce an eccentric ROI. Curve
// information shifts the polygon toward the bend.

use crate::types::{CurveDirection, CurveInfo, VanishingPoint};
use crate::vision;
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point},
    prelude::*,
};
use tracing::debug;

pub const DEFAULT_TOP_OFFSET: f32 = 0.58;
pub const DEFAULT_BOTTOM_INSET: f32 = 0.08;

/// Minimum vanishing-point confidence for the adaptive polygon.
const VP_CONFIDENCE_FLOOR: f32 = 0.3;
/// Apex half-width as a fraction of frame width in the adaptive polygon.
const APEX_HALF_WIDTH_RATIO: f32 = 0.075;
/// Curve shift ratios: whole-polygon shift in adaptive mode, single-side
/// shift in the fixed trapezoid.
const ADAPTIVE_CURVE_SHIFT: f32 = 0.05;
const FIXED_CURVE_SHIFT: f32 = 0.03;

/// Build the ROI polygon from vanishing point and curve info, then mask
/// the edge map to it.
pub fn apply_adaptive_roi(
    edges: &Mat,
    vanishing_point: Option<&VanishingPoint>,
    curve: Option<&CurveInfo>,
    top_offset: f32,
    bottom_inset: f32,
) -> Result<Mat> {
    let height = edges.rows();
    let width = edges.cols();
    let w = width as f32;

    let corners = match vanishing_point {
        Some(vp) if vp.confidence > VP_CONFIDENCE_FLOOR => {
            let shift = match curve {
                Some(c) if c.direction == CurveDirection::Left => {
                    -w * ADAPTIVE_CURVE_SHIFT * c.confidence
                }
                Some(c) if c.direction == CurveDirection::Right => {
                    w * ADAPTIVE_CURVE_SHIFT * c.confidence
                }
                _ => 0.0,
            };
            debug!(vp.x, vp.y, vp.confidence, shift, "vanishing-point ROI");

            let apex_half = w * APEX_HALF_WIDTH_RATIO;
            [
                Point::new((w * bottom_inset + shift) as i32, height),
                Point::new((vp.x - apex_half + shift) as i32, vp.y as i32),
                Point::new((vp.x + apex_half + shift) as i32, vp.y as i32),
                Point::new((w * (1.0 - bottom_inset) + shift) as i32, height),
            ]
        }
        _ => {
            let (left_shift, right_shift) = match curve {
                Some(c) if c.direction == CurveDirection::Left => {
                    (-w * FIXED_CURVE_SHIFT * c.confidence, 0.0)
                }
                Some(c) if c.direction == CurveDirection::Right => {
                    (0.0, w * FIXED_CURVE_SHIFT * c.confidence)
                }
                _ => (0.0, 0.0),
            };
            fixed_trapezoid_shifted(height, width, top_offset, left_shift, right_shift)
        }
    };

    let mut mask = Mat::zeros(height, width, core::CV_8UC1)?.to_mat()?;
    vision::fill_polygon(&mut mask, &corners)?;
    vision::mask_edges(edges, &mask)
}

/// The default trapezoid used when no reliable geometry is available,
/// also the re-detection region for the single-lane fallback.
pub fn fixed_trapezoid(height: i32, width: i32, top_offset: f32) -> [Point; 4] {
    fixed_trapezoid_shifted(height, width, top_offset, 0.0, 0.0)
}

fn fixed_trapezoid_shifted(
    height: i32,
    width: i32,
    top_offset: f32,
    left_shift: f32,
    right_shift: f32,
) -> [Point; 4] {
    let w = width as f32;
    let apex_y = (height as f32 * top_offset) as i32;
    [
        Point::new((w * 0.08 + left_shift) as i32, height),
        Point::new((w * 0.46 + left_shift) as i32, apex_y),
        Point::new((w * 0.54 + right_shift) as i32, apex_y),
        Point::new((w * 0.92 + right_shift) as i32, height),
    ]
}
