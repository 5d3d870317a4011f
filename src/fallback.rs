// src/fallback.rs
//
// Single-lane reconstruction for frames where the full pipeline finds
// nothing. Re-detects against the fixed default ROI; when exactly one
// side is visible, the missing boundary is synthesized at a fixed
// assumed lane width from the found one. Zero or two sides means the
// fallback has nothing to add.

use crate::classify::classify_segments;
use crate::config::DetectionConfig;
use crate::fit::{fit_lane_line, DEFAULT_Y_TOP_RATIO};
use crate::roi::{self, DEFAULT_TOP_OFFSET};
use crate::types::LaneLine;
use crate::vision;
use anyhow::Result;
use opencv::{
    core::{self, Mat},
    prelude::*,
};
use tracing::debug;

/// Assumed lane width as a fraction of the frame width.
pub const ASSUMED_LANE_WIDTH_RATIO: f32 = 0.35;

/// Synthesize the missing boundary by offsetting the found one
/// horizontally by the assumed lane width.
pub fn estimate_missing_side(found: &LaneLine, width: i32, found_is_left: bool) -> LaneLine {
    let offset = (width as f32 * ASSUMED_LANE_WIDTH_RATIO) as i32;
    found.shifted_x(if found_is_left { offset } else { -offset })
}

/// Build a corridor mask from a single visible lane boundary. Absent
/// when zero or both sides are detected, or the visible side cannot be
/// fitted.
pub fn single_lane_mask(frame: &Mat, config: &DetectionConfig) -> Result<Option<Mat>> {
    let height = frame.rows();
    let width = frame.cols();

    let edges = vision::edge_map(frame, config)?;

    let mut roi_mask = Mat::zeros(height, width, core::CV_8UC1)?.to_mat()?;
    vision::fill_polygon(
        &mut roi_mask,
        &roi::fixed_trapezoid(height, width, DEFAULT_TOP_OFFSET),
    )?;
    let masked = vision::mask_edges(&edges, &roi_mask)?;

    let segments = vision::detect_segments(&masked, config)?;
    if segments.is_empty() {
        return Ok(None);
    }

    let (left_segments, right_segments) = classify_segments(&segments, config);

    let (fitted, found_is_left) = match (left_segments.is_empty(), right_segments.is_empty()) {
        (false, true) => (
            fit_lane_line(&left_segments, height, DEFAULT_Y_TOP_RATIO, false),
            true,
        ),
        (true, false) => (
            fit_lane_line(&right_segments, height, DEFAULT_Y_TOP_RATIO, false),
            false,
        ),
        _ => {
            debug!(
                left = left_segments.len(),
                right = right_segments.len(),
                "single-lane fallback needs exactly one side"
            );
            return Ok(None);
        }
    };

    let Some(found) = fitted else {
        return Ok(None);
    };

    let estimated = estimate_missing_side(&found, width, found_is_left);
    let (left, right) = if found_is_left {
        (found, estimated)
    } else {
        (estimated, found)
    };
    debug!(
        side = if found_is_left { "left" } else { "right" },
        "reconstructed missing lane boundary"
    );

    let mask = vision::render_mask(height, width, Some(&left), Some(&right), true)?;
    let cleaned = vision::morphological_cleanup(&mask, config.morph_kernel_size)?;
    Ok(Some(cleaned))
}
