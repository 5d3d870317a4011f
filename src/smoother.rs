// src/smoother.rs
//
// Temporal smoothing for one video stream. Holds the previous lane
// lines and mask and blends new observations in exponentially; a
// missing observation keeps the previous value, so transient
// misdetections do not flicker the output.
//
// One instance per stream. Sharing an instance across streams would
// blend unrelated geometries.

use crate::types::LaneLine;
use anyhow::Result;
use opencv::core::{self, Mat, Point};
use tracing::debug;

pub struct TemporalSmoother {
    alpha: f32,
    left_line: Option<LaneLine>,
    right_line: Option<LaneLine>,
    prev_mask: Option<Mat>,
}

impl TemporalSmoother {
    /// Create a smoother with the given blending factor. Higher alpha
    /// weights the newest observation more.
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha,
            left_line: None,
            right_line: None,
            prev_mask: None,
        }
    }

    /// Blend new line observations with the stored ones, per side.
    /// An absent observation keeps the previous line; with no previous
    /// line the observation is adopted as-is. The result is stored and
    /// returned.
    pub fn update_lines(
        &mut self,
        left: Option<LaneLine>,
        right: Option<LaneLine>,
    ) -> (Option<LaneLine>, Option<LaneLine>) {
        self.left_line = self.blend_line(left, self.left_line);
        self.right_line = self.blend_line(right, self.right_line);
        (self.left_line, self.right_line)
    }

    fn blend_line(&self, new: Option<LaneLine>, prev: Option<LaneLine>) -> Option<LaneLine> {
        match (new, prev) {
            (None, prev) => prev,
            (Some(new), None) => Some(new),
            (Some(new), Some(prev)) => Some(LaneLine::new(
                self.blend_point(new.bottom, prev.bottom),
                self.blend_point(new.top, prev.top),
            )),
        }
    }

    fn blend_point(&self, new: Point, prev: Point) -> Point {
        let blend = |n: i32, p: i32| (self.alpha * n as f32 + (1.0 - self.alpha) * p as f32) as i32;
        Point::new(blend(new.x, prev.x), blend(new.y, prev.y))
    }

    /// Pixel-wise blend of the new mask with the stored one. The result
    /// stays continuous-valued; downstream treats it as
    /// confidence-weighted. Stores and returns the result.
    pub fn smooth_mask(&mut self, mask: Option<&Mat>) -> Result<Option<Mat>> {
        let Some(mask) = mask else {
            return Ok(self.prev_mask.clone());
        };

        let Some(prev) = &self.prev_mask else {
            self.prev_mask = Some(mask.clone());
            return Ok(Some(mask.clone()));
        };

        let mut blended = Mat::default();
        core::add_weighted(
            mask,
            self.alpha as f64,
            prev,
            1.0 - self.alpha as f64,
            0.0,
            &mut blended,
            -1,
        )?;
        self.prev_mask = Some(blended.clone());
        Ok(Some(blended))
    }

    pub fn previous_mask(&self) -> Option<&Mat> {
        self.prev_mask.as_ref()
    }

    pub fn left_line(&self) -> Option<LaneLine> {
        self.left_line
    }

    pub fn right_line(&self) -> Option<LaneLine> {
        self.right_line
    }

    /// Clear all stored state. Call at stream start or on a scene cut.
    pub fn reset(&mut self) {
        debug!("temporal smoother reset");
        self.left_line = None;
        self.right_line = None;
        self.prev_mask = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Scalar;
    use opencv::prelude::*;

    fn line(xb: i32, xt: i32) -> LaneLine {
        LaneLine::new(Point::new(xb, 400), Point::new(xt, 240))
    }

    #[test]
    fn test_first_observation_adopted_unchanged() {
        let mut smoother = TemporalSmoother::new(0.3);
        let (l, r) = smoother.update_lines(Some(line(100, 164)), Some(line(540, 476)));

        assert_eq!(l, Some(line(100, 164)));
        assert_eq!(r, Some(line(540, 476)));
    }

    #[test]
    fn test_absent_observation_keeps_previous() {
        let mut smoother = TemporalSmoother::new(0.3);
        smoother.update_lines(Some(line(100, 164)), Some(line(540, 476)));
        let (l, r) = smoother.update_lines(None, None);

        assert_eq!(l, Some(line(100, 164)));
        assert_eq!(r, Some(line(540, 476)));
    }

    #[test]
    fn test_convergence_toward_constant_observation() {
        let mut smoother = TemporalSmoother::new(0.3);
        smoother.update_lines(Some(line(0, 0)), None);

        let target = line(100, 100);
        let mut prev_gap = 100;
        for _ in 0..6 {
            let (l, _) = smoother.update_lines(Some(target), None);
            let gap = (target.bottom.x - l.unwrap().bottom.x).abs();
            assert!(gap < prev_gap, "gap must strictly shrink: {} -> {}", prev_gap, gap);
            prev_gap = gap;
        }
    }

    #[test]
    fn test_reset_clears_state() {
        let mut smoother = TemporalSmoother::new(0.3);
        smoother.update_lines(Some(line(100, 164)), None);
        smoother.reset();

        assert_eq!(smoother.left_line(), None);
        assert!(smoother.previous_mask().is_none());
        let (l, _) = smoother.update_lines(Some(line(200, 260)), None);
        assert_eq!(l, Some(line(200, 260)));
    }

    #[test]
    fn test_smooth_mask_adopts_first_and_is_idempotent_when_converged() {
        let mut smoother = TemporalSmoother::new(0.3);
        let mask =
            Mat::new_rows_cols_with_default(40, 60, core::CV_8UC1, Scalar::all(200.0)).unwrap();

        let first = smoother.smooth_mask(Some(&mask)).unwrap().unwrap();
        assert_eq!(*first.at_2d::<u8>(20, 30).unwrap(), 200);

        // Blending an image with itself returns that image.
        let second = smoother.smooth_mask(Some(&mask)).unwrap().unwrap();
        assert_eq!(*second.at_2d::<u8>(20, 30).unwrap(), 200);
    }

    #[test]
    fn test_smooth_mask_absent_returns_stored() {
        let mut smoother = TemporalSmoother::new(0.3);
        assert!(smoother.smooth_mask(None).unwrap().is_none());

        let mask =
            Mat::new_rows_cols_with_default(40, 60, core::CV_8UC1, Scalar::all(255.0)).unwrap();
        smoother.smooth_mask(Some(&mask)).unwrap();

        let recalled = smoother.smooth_mask(None).unwrap().unwrap();
        assert_eq!(*recalled.at_2d::<u8>(10, 10).unwrap(), 255);
    }
}
