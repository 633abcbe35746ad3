//! 2D points and straight-segment subdivision

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of equal parts a linear move is split into for animation
pub const DEFAULT_SUBDIVISIONS: usize = 4;

/// Upper bound the engine clamps subdivisions to
pub const MAX_SUBDIVISIONS: usize = 64;

const TOKEN_PRECISION: usize = 3;

/// 2D point in machine coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Point at fraction `t` of the way from `self` to `other`
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Path-data token `"x,y"`
    pub fn to_path_token(&self) -> String {
        format!("{},{}", format_coord(self.x), format_coord(self.y))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path_token())
    }
}

/// Format a coordinate with fixed precision, trimming trailing zeros.
///
/// Output never depends on locale and never contains an exponent.
pub fn format_coord(value: f64) -> String {
    let mut s = format!("{:.*}", TOKEN_PRECISION, value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Interior points of the segment `a`→`b` at [`DEFAULT_SUBDIVISIONS`]
pub fn points_between(a: Point, b: Point) -> Vec<Point> {
    points_between_with(a, b, DEFAULT_SUBDIVISIONS)
}

/// Interior points of the segment `a`→`b`, endpoints excluded.
///
/// The segment is split into `subdivisions` equal parts, so
/// `subdivisions - 1` points are returned in order from `a` to `b`.
pub fn points_between_with(a: Point, b: Point, subdivisions: usize) -> Vec<Point> {
    if subdivisions < 2 {
        return Vec::new();
    }
    let n = subdivisions as f64;
    (1..subdivisions)
        .map(|i| a.lerp(&b, i as f64 / n))
        .collect()
}
