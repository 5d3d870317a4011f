// src/types.rs

use opencv::core::{Point, Vec4i};

/// A finite line piece from the probabilistic Hough detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Segment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Slope dy/dx. None when the horizontal extent is near zero.
    pub fn slope(&self) -> Option<f32> {
        let dx = (self.x2 - self.x1) as f32;
        if dx.abs() < 1e-6 {
            return None;
        }
        Some((self.y2 - self.y1) as f32 / dx)
    }

    /// Vertical midpoint, used to order segments from top to bottom.
    pub fn mid_y(&self) -> f32 {
        (self.y1 + self.y2) as f32 / 2.0
    }
}

impl From<Vec4i> for Segment {
    fn from(v: Vec4i) -> Self {
        Self {
            x1: v[0],
            y1: v[1],
            x2: v[2],
            y2: v[3],
        }
    }
}

/// Image-plane point where the lane edges appear to converge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VanishingPoint {
    pub x: f32,
    pub y: f32,
    /// Fraction of candidate intersections supporting the estimate, [0, 1].
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveDirection {
    Left,
    Right,
    Straight,
}

impl CurveDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveDirection::Left => "left",
            CurveDirection::Right => "right",
            CurveDirection::Straight => "straight",
        }
    }
}

/// Graded classification of upcoming road curvature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveInfo {
    pub direction: CurveDirection,
    /// [0, 1]; graded near the straight/curved boundary.
    pub confidence: f32,
    pub left_slope_trend: f32,
    pub right_slope_trend: f32,
}

/// One side's estimated boundary: bottom endpoint at y = height,
/// top endpoint at the fixed look-ahead height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneLine {
    pub bottom: Point,
    pub top: Point,
}

impl LaneLine {
    pub fn new(bottom: Point, top: Point) -> Self {
        Self { bottom, top }
    }

    /// The same line shifted horizontally by `dx` pixels.
    pub fn shifted_x(&self, dx: i32) -> Self {
        Self {
            bottom: Point::new(self.bottom.x + dx, self.bottom.y),
            top: Point::new(self.top.x + dx, self.top.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope() {
        let seg = Segment::new(100, 400, 140, 300);
        assert_eq!(seg.slope(), Some(-2.5));

        let vertical = Segment::new(50, 0, 50, 100);
        assert_eq!(vertical.slope(), None);
    }

    #[test]
    fn test_mid_y() {
        let seg = Segment::new(0, 100, 10, 300);
        assert_eq!(seg.mid_y(), 200.0);
    }

    #[test]
    fn test_shifted_x() {
        let line = LaneLine::new(Point::new(100, 400), Point::new(140, 240));
        let shifted = line.shifted_x(224);
        assert_eq!(shifted.bottom, Point::new(324, 400));
        assert_eq!(shifted.top, Point::new(364, 240));
    }
}
