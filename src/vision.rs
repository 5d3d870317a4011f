// src/vision.rs
//
// Thin wrappers over the OpenCV primitives the pipeline consumes:
// grayscale conversion, blur + Canny, probabilistic Hough, polygon
// rendering and morphological cleanup. Estimation logic lives in the
// sibling modules; nothing here is reimplemented from scratch.

use crate::config::DetectionConfig;
use crate::types::{LaneLine, Segment};
use anyhow::Result;
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vec4i, Vector},
    imgproc,
    prelude::*,
};

pub fn to_grayscale(frame: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
    Ok(gray)
}

/// Mean luminance of a BGR frame.
pub fn mean_intensity(frame: &Mat) -> Result<f64> {
    let gray = to_grayscale(frame)?;
    Ok(core::mean(&gray, &core::no_array())?[0])
}

/// Grayscale, 5x5 Gaussian blur, then Canny with config thresholds.
pub fn edge_map(frame: &Mat, config: &DetectionConfig) -> Result<Mat> {
    let gray = to_grayscale(frame)?;

    let mut blurred = Mat::default();
    imgproc::gaussian_blur(
        &gray,
        &mut blurred,
        Size::new(5, 5),
        0.0,
        0.0,
        core::BORDER_DEFAULT,
    )?;

    let mut edges = Mat::default();
    imgproc::canny(
        &blurred,
        &mut edges,
        config.canny_low as f64,
        config.canny_high as f64,
        3,
        false,
    )?;

    Ok(edges)
}

/// Probabilistic Hough transform on an edge map. An empty result means
/// no segments were found, not a failure.
pub fn detect_segments(edges: &Mat, config: &DetectionConfig) -> Result<Vec<Segment>> {
    let mut lines = Vector::<Vec4i>::new();
    imgproc::hough_lines_p(
        edges,
        &mut lines,
        1.0,
        std::f64::consts::PI / 180.0,
        config.hough_threshold,
        config.hough_min_line_length as f64,
        config.hough_max_line_gap as f64,
    )?;

    Ok(lines.iter().map(Segment::from).collect())
}

/// Fill a polygon with full intensity on an existing single-channel mask.
pub fn fill_polygon(mask: &mut Mat, corners: &[Point]) -> Result<()> {
    let mut polygon = Vector::<Vector<Point>>::new();
    polygon.push(Vector::from_slice(corners));
    imgproc::fill_poly(
        mask,
        &polygon,
        Scalar::all(255.0),
        imgproc::LINE_8,
        0,
        Point::new(0, 0),
    )?;
    Ok(())
}

/// Keep only the edge pixels inside the given mask.
pub fn mask_edges(edges: &Mat, mask: &Mat) -> Result<Mat> {
    let mut masked = Mat::default();
    core::bitwise_and(edges, mask, &mut masked, &core::no_array())?;
    Ok(masked)
}

/// Render the corridor mask from the fitted boundaries. With both sides
/// present and fill enabled, the polygon between them is filled;
/// otherwise whichever side is present is drawn as a thick center-line.
pub fn render_mask(
    height: i32,
    width: i32,
    left: Option<&LaneLine>,
    right: Option<&LaneLine>,
    fill: bool,
) -> Result<Mat> {
    let mut mask = Mat::zeros(height, width, core::CV_8UC1)?.to_mat()?;

    match (left, right) {
        (Some(l), Some(r)) if fill => {
            fill_polygon(&mut mask, &[l.bottom, l.top, r.top, r.bottom])?;
        }
        _ => {
            const LINE_THICKNESS: i32 = 10;
            for line in [left, right].into_iter().flatten() {
                imgproc::line(
                    &mut mask,
                    line.bottom,
                    line.top,
                    Scalar::all(255.0),
                    LINE_THICKNESS,
                    imgproc::LINE_8,
                    0,
                )?;
            }
        }
    }

    Ok(mask)
}

/// Morphological close then open with an elliptical kernel. Closes small
/// gaps and removes speckle from the rendered mask.
pub fn morphological_cleanup(mask: &Mat, kernel_size: i32) -> Result<Mat> {
    let kernel = imgproc::get_structuring_element(
        imgproc::MORPH_ELLIPSE,
        Size::new(kernel_size, kernel_size),
        Point::new(-1, -1),
    )?;

    let mut closed = Mat::default();
    imgproc::morphology_ex(
        mask,
        &mut closed,
        imgproc::MORPH_CLOSE,
        &kernel,
        Point::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;

    let mut opened = Mat::default();
    imgproc::morphology_ex(
        &closed,
        &mut opened,
        imgproc::MORPH_OPEN,
        &kernel,
        Point::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )?;

    Ok(opened)
}
