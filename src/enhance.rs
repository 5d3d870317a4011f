// src/enhance.rs
//
// Low-light enhancement ahead of edge extraction. Dim frames get
// clip-limited histogram equalization on the LAB luminance channel,
// then a global gamma correction via a per-intensity lookup table. Bright
// frames pass through untouched.

use crate::config::DetectionConfig;
use crate::vision;
use anyhow::Result;
use opencv::{
    core::{self, Mat, Size, Vector},
    imgproc,
    prelude::*,
};
use tracing::debug;

/// Enhance a BGR frame for low-light conditions. Returns the (possibly
/// unchanged) frame and whether enhancement was applied. Never fails on
/// image content; only OpenCV plumbing errors propagate.
pub fn enhance_low_light(frame: &Mat, config: &DetectionConfig) -> Result<(Mat, bool)> {
    let brightness = vision::mean_intensity(frame)?;

    if brightness >= config.brightness_threshold as f64 {
        return Ok((frame.clone(), false));
    }

    debug!(
        brightness,
        threshold = config.brightness_threshold,
        "applying low-light enhancement"
    );

    // Equalize luminance only; chroma channels stay untouched.
    let mut lab = Mat::default();
    imgproc::cvt_color(frame, &mut lab, imgproc::COLOR_BGR2Lab, 0)?;

    let mut channels = Vector::<Mat>::new();
    core::split(&lab, &mut channels)?;

    let mut clahe = imgproc::create_clahe(
        config.clahe_clip_limit as f64,
        Size::new(config.clahe_grid_size, config.clahe_grid_size),
    )?;
    let mut equalized = Mat::default();
    clahe.apply(&channels.get(0)?, &mut equalized)?;
    channels.set(0, equalized)?;

    let mut merged = Mat::default();
    core::merge(&channels, &mut merged)?;

    let mut enhanced = Mat::default();
    imgproc::cvt_color(&merged, &mut enhanced, imgproc::COLOR_Lab2BGR, 0)?;

    let table = gamma_table(config.gamma_low);
    let lut = Mat::from_exact_iter(table.into_iter())?;
    let mut corrected = Mat::default();
    core::lut(&enhanced, &lut, &mut corrected)?;

    Ok((corrected, true))
}

/// out = 255 * (in / 255) ^ (1 / gamma), per intensity value.
fn gamma_table(gamma: f32) -> [u8; 256] {
    let inv_gamma = 1.0 / gamma;
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        *entry = ((i as f32 / 255.0).powf(inv_gamma) * 255.0) as u8;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Scalar;

    fn solid_frame(value: f64) -> Mat {
        Mat::new_rows_cols_with_default(120, 160, core::CV_8UC3, Scalar::all(value)).unwrap()
    }

    #[test]
    fn test_bright_frame_passes_through() {
        let frame = solid_frame(128.0);
        let (out, enhanced) = enhance_low_light(&frame, &DetectionConfig::default()).unwrap();

        assert!(!enhanced);
        assert_eq!(*out.at_2d::<core::Vec3b>(60, 80).unwrap(), core::Vec3b::from([128, 128, 128]));
    }

    #[test]
    fn test_dim_frame_is_enhanced() {
        let frame = solid_frame(20.0);
        let (out, enhanced) = enhance_low_light(&frame, &DetectionConfig::default()).unwrap();

        assert!(enhanced);
        assert_eq!(out.rows(), frame.rows());
        assert_eq!(out.cols(), frame.cols());
        assert_eq!(out.typ(), core::CV_8UC3);
    }

    #[test]
    fn test_gamma_table_endpoints() {
        let table = gamma_table(0.6);
        assert_eq!(table[0], 0);
        assert_eq!(table[255], 255);
        // Sub-unity gamma with an inverted exponent maps midtones down.
        assert!(table[128] < 128);
    }
}
