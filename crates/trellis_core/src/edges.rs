//! Edge insets used for margins, padding, borders and nine-slice thickness.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alignment::SimpleRotation;
use crate::error::CoreError;
use crate::geometry::Vec2;

/// Thickness of each side of a rectangle, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edges {
    /// Left edge.
    pub left: i32,
    /// Top edge.
    pub top: i32,
    /// Right edge.
    pub right: i32,
    /// Bottom edge.
    pub bottom: i32,
}

impl Edges {
    /// No thickness on any side.
    pub const NONE: Self = Self::new(0, 0, 0, 0);

    /// Creates edges from individual sides.
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    /// Same thickness on all four sides.
    #[must_use]
    pub const fn all(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// `horizontal` on left and right, `vertical` on top and bottom.
    #[must_use]
    pub const fn symmetric(horizontal: i32, vertical: i32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    /// Sum of left and right.
    #[must_use]
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[must_use]
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    /// Combined horizontal and vertical thickness.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total(&self) -> Vec2 {
        Vec2::new(self.horizontal() as f32, self.vertical() as f32)
    }

    /// Top-left offset.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.left as f32, self.top as f32)
    }

    /// Only the left and right components.
    #[must_use]
    pub const fn horizontal_only(&self) -> Self {
        Self::new(self.left, 0, self.right, 0)
    }

    /// Only the top and bottom components.
    #[must_use]
    pub const fn vertical_only(&self) -> Self {
        Self::new(0, self.top, 0, self.bottom)
    }

    /// Returns `true` if all four sides are zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }

    /// Rotates the edges so each side follows the content it was attached to.
    ///
    /// A clockwise quarter turn moves the old left edge to the top.
    #[must_use]
    pub const fn rotate(&self, rotation: SimpleRotation) -> Self {
        match rotation {
            SimpleRotation::None => *self,
            SimpleRotation::QuarterClockwise => {
                Self::new(self.bottom, self.left, self.top, self.right)
            }
            SimpleRotation::QuarterCounterclockwise => {
                Self::new(self.top, self.right, self.bottom, self.left)
            }
            SimpleRotation::Half => Self::new(self.right, self.bottom, self.left, self.top),
        }
    }
}

impl Add for Edges {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.left + rhs.left,
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
        )
    }
}

impl Sub for Edges {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.left - rhs.left,
            self.top - rhs.top,
            self.right - rhs.right,
            self.bottom - rhs.bottom,
        )
    }
}

impl Neg for Edges {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.left, -self.top, -self.right, -self.bottom)
    }
}

impl Mul<i32> for Edges {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.left * rhs, self.top * rhs, self.right * rhs, self.bottom * rhs)
    }
}

impl Mul<f32> for Edges {
    type Output = Self;

    /// Scales each side, rounding to the nearest pixel.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn mul(self, rhs: f32) -> Self {
        let scale = |value: i32| (value as f32 * rhs).round() as i32;
        Self::new(scale(self.left), scale(self.top), scale(self.right), scale(self.bottom))
    }
}

impl fmt::Display for Edges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.left, self.top, self.right, self.bottom)
    }
}

impl FromStr for Edges {
    type Err = CoreError;

    /// Parses `"n"`, `"h, v"` or `"left, top, right, bottom"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<i32>().map_err(|_| CoreError::EdgeValue {
                    input: s.to_string(),
                    value: part.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        match parts.as_slice() {
            [all] => Ok(Self::all(*all)),
            [horizontal, vertical] => Ok(Self::symmetric(*horizontal, *vertical)),
            [left, top, right, bottom] => Ok(Self::new(*left, *top, *right, *bottom)),
            _ => Err(CoreError::EdgeCount {
                input: s.to_string(),
                count: parts.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_totals() {
        let edges = Edges::new(1, 2, 3, 4);
        assert_eq!(edges.horizontal(), 4);
        assert_eq!(edges.vertical(), 6);
        assert_eq!(edges.total(), Vec2::new(4.0, 6.0));
        assert_eq!(edges.horizontal_only(), Edges::new(1, 0, 3, 0));
        assert_eq!(edges.vertical_only(), Edges::new(0, 2, 0, 4));
    }

    #[test]
    fn test_edges_arithmetic() {
        let a = Edges::all(2);
        let b = Edges::new(1, 2, 3, 4);
        assert_eq!(a + b, Edges::new(3, 4, 5, 6));
        assert_eq!(b - a, Edges::new(-1, 0, 1, 2));
        assert_eq!(-b, Edges::new(-1, -2, -3, -4));
        assert_eq!(b * 2, Edges::new(2, 4, 6, 8));
        assert_eq!(Edges::new(3, 5, 1, 2) * 1.5, Edges::new(5, 8, 2, 3));
    }

    #[test]
    fn test_edges_rotation() {
        let edges = Edges::new(1, 2, 3, 4);
        assert_eq!(edges.rotate(SimpleRotation::None), edges);
        assert_eq!(edges.rotate(SimpleRotation::QuarterClockwise), Edges::new(4, 1, 2, 3));
        assert_eq!(edges.rotate(SimpleRotation::QuarterCounterclockwise), Edges::new(2, 3, 4, 1));
        assert_eq!(edges.rotate(SimpleRotation::Half), Edges::new(3, 4, 1, 2));

        let back = edges
            .rotate(SimpleRotation::QuarterClockwise)
            .rotate(SimpleRotation::QuarterCounterclockwise);
        assert_eq!(back, edges);
    }

    #[test]
    fn test_edges_parse() {
        assert_eq!("4".parse::<Edges>().unwrap(), Edges::all(4));
        assert_eq!("4, 8".parse::<Edges>().unwrap(), Edges::symmetric(4, 8));
        assert_eq!(" 1,2 ,3, 4".parse::<Edges>().unwrap(), Edges::new(1, 2, 3, 4));
        assert!(matches!("1, 2, 3".parse::<Edges>(), Err(CoreError::EdgeCount { count: 3, .. })));
        assert!(matches!("1, x".parse::<Edges>(), Err(CoreError::EdgeValue { .. })));
    }

    #[test]
    fn test_edges_display_parses_back() {
        let edges = Edges::new(5, 6, 7, 8);
        assert_eq!(edges.to_string().parse::<Edges>().unwrap(), edges);
    }
}
