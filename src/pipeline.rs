// src/pipeline.rs
//
// Per-frame orchestration: enhancement, edge extraction, segment
// detection, vanishing-point and curve estimation, adaptive ROI,
// line fitting, rendering and cleanup. Every stage degrades to
// "absent"; absence is resolved by temporal memory, then the
// single-lane geometric fallback, then a final no-mask.

use crate::classify::classify_segments;
use crate::config::DetectionConfig;
use crate::curve::detect_curve_direction;
use crate::enhance::enhance_low_light;
use crate::fallback::single_lane_mask;
use crate::fit::{fit_lane_line, DEFAULT_Y_TOP_RATIO};
use crate::roi::{apply_adaptive_roi, DEFAULT_BOTTOM_INSET, DEFAULT_TOP_OFFSET};
use crate::smoother::TemporalSmoother;
use crate::vanishing::estimate_vanishing_point;
use crate::vision;
use anyhow::Result;
use opencv::{core::Mat, prelude::*};
use tracing::debug;

/// Rendering and processing switches for the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct MaskOptions {
    /// Fill the corridor polygon between both boundaries; otherwise
    /// draw thick center-lines for whichever sides are present.
    pub fill_polygon: bool,
    /// Quadratic extrapolation for curved boundaries.
    pub use_polyfit: bool,
    /// Force the enhancement path. Currently selects the identical
    /// routine as the default path; kept for caller compatibility.
    pub night_mode: bool,
    /// Compute curve info when both sides have candidates.
    pub curve_detection: bool,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            fill_polygon: true,
            use_polyfit: false,
            night_mode: false,
            curve_detection: true,
        }
    }
}

/// Per-frame lane corridor estimator. Stateless itself; per-stream
/// state lives in the caller-owned `TemporalSmoother`.
pub struct LanePipeline {
    config: DetectionConfig,
    options: MaskOptions,
}

impl LanePipeline {
    pub fn new(config: DetectionConfig) -> Self {
        Self::with_options(config, MaskOptions::default())
    }

    pub fn with_options(config: DetectionConfig, options: MaskOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Process one BGR frame into a lane corridor mask. Absent when
    /// the frame yields no usable geometry and the smoother holds no
    /// memory for the intermediate dropout cases.
    pub fn process(
        &self,
        frame: &Mat,
        mut smoother: Option<&mut TemporalSmoother>,
    ) -> Result<Option<Mat>> {
        let height = frame.rows();
        let width = frame.cols();

        // night_mode currently selects the same enhancement routine as
        // the default path; enhance_low_light gates on brightness
        // itself, so the frame is only touched when it is actually dim.
        let (enhanced, _was_enhanced) = enhance_low_light(frame, &self.config)?;

        let edges = vision::edge_map(&enhanced, &self.config)?;

        let segments = vision::detect_segments(&edges, &self.config)?;
        if segments.is_empty() {
            debug!("no segments in full frame");
            return Ok(None);
        }

        let vanishing_point = estimate_vanishing_point(&segments, height, width);

        let (left_candidates, right_candidates) = classify_segments(&segments, &self.config);
        let curve = if self.options.curve_detection
            && !left_candidates.is_empty()
            && !right_candidates.is_empty()
        {
            Some(detect_curve_direction(&left_candidates, &right_candidates))
        } else {
            None
        };

        let masked = apply_adaptive_roi(
            &edges,
            vanishing_point.as_ref(),
            curve.as_ref(),
            DEFAULT_TOP_OFFSET,
            DEFAULT_BOTTOM_INSET,
        )?;

        let roi_segments = vision::detect_segments(&masked, &self.config)?;
        if roi_segments.is_empty() {
            debug!("no segments inside ROI, recalling previous mask");
            return Ok(smoother.as_deref().and_then(|s| s.previous_mask().cloned()));
        }

        let (left_segments, right_segments) = classify_segments(&roi_segments, &self.config);
        let left = fit_lane_line(&left_segments, height, DEFAULT_Y_TOP_RATIO, self.options.use_polyfit);
        let right = fit_lane_line(&right_segments, height, DEFAULT_Y_TOP_RATIO, self.options.use_polyfit);

        if left.is_none() && right.is_none() {
            debug!("no side could be fitted, recalling previous mask");
            return Ok(smoother.as_deref().and_then(|s| s.previous_mask().cloned()));
        }

        let (left, right) = match smoother.as_deref_mut() {
            Some(s) => s.update_lines(left, right),
            None => (left, right),
        };

        let mask =
            vision::render_mask(height, width, left.as_ref(), right.as_ref(), self.options.fill_polygon)?;
        let cleaned = vision::morphological_cleanup(&mask, self.config.morph_kernel_size)?;

        match smoother.as_deref_mut() {
            Some(s) => s.smooth_mask(Some(&cleaned)),
            None => Ok(Some(cleaned)),
        }
    }

    /// Full cascade: the main pipeline, then temporal memory, then the
    /// single-lane geometric fallback.
    pub fn process_with_fallback(
        &self,
        frame: &Mat,
        mut smoother: Option<&mut TemporalSmoother>,
    ) -> Result<Option<Mat>> {
        if let Some(mask) = self.process(frame, smoother.as_deref_mut())? {
            return Ok(Some(mask));
        }

        if let Some(previous) = smoother.as_deref().and_then(|s| s.previous_mask()) {
            debug!("pipeline empty, resolving from temporal memory");
            return Ok(Some(previous.clone()));
        }

        debug!("pipeline empty, trying single-lane fallback");
        single_lane_mask(frame, &self.config)
    }
}
