// src/config.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Immutable parameter bundle for lane detection. Passed by reference
/// into every stage and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub canny_low: i32,
    pub canny_high: i32,
    pub hough_threshold: i32,
    pub hough_min_line_length: i32,
    pub hough_max_line_gap: i32,
    pub min_slope: f32,
    pub max_slope: f32,
    pub brightness_threshold: f32,
    pub gamma_low: f32,
    /// Declared but not consulted by the current algorithm.
    pub gamma_high: f32,
    pub clahe_clip_limit: f32,
    pub clahe_grid_size: i32,
    pub morph_kernel_size: i32,
    pub temporal_alpha: f32,
    /// Declared but not consulted by the current algorithm.
    pub min_line_points: usize,
    /// Declared but not consulted by the current algorithm.
    pub curve_detection_window: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            canny_low: 50,
            canny_high: 150,
            hough_threshold: 50,
            hough_min_line_length: 50,
            hough_max_line_gap: 180,
            min_slope: 0.3,
            max_slope: 3.0,
            brightness_threshold: 60.0,
            gamma_low: 0.6,
            gamma_high: 1.2,
            clahe_clip_limit: 3.0,
            clahe_grid_size: 8,
            morph_kernel_size: 5,
            temporal_alpha: 0.3,
            min_line_points: 2,
            curve_detection_window: 50,
        }
    }
}

impl DetectionConfig {
    /// Load from a YAML file. Missing fields fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DetectionConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.canny_low, 50);
        assert_eq!(config.canny_high, 150);
        assert_eq!(config.hough_threshold, 50);
        assert_eq!(config.hough_max_line_gap, 180);
        assert_eq!(config.min_slope, 0.3);
        assert_eq!(config.max_slope, 3.0);
        assert_eq!(config.brightness_threshold, 60.0);
        assert_eq!(config.gamma_low, 0.6);
        assert_eq!(config.morph_kernel_size, 5);
        assert_eq!(config.temporal_alpha, 0.3);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: DetectionConfig = serde_yaml::from_str("canny_low: 30\nmax_slope: 2.5\n").unwrap();
        assert_eq!(config.canny_low, 30);
        assert_eq!(config.max_slope, 2.5);
        assert_eq!(config.canny_high, 150);
        assert_eq!(config.temporal_alpha, 0.3);
    }
}
