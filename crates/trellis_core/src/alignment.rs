//! Alignment, orientation, navigation direction and quarter-turn rotation.

use std::f32::consts::{FRAC_PI_2, PI};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::Vec2;
use crate::length::{LayoutParameters, Length};

/// Placement of content along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Left or top.
    #[default]
    Start,
    /// Centered.
    Middle,
    /// Right or bottom.
    End,
}

impl Alignment {
    /// Offset of content of length `content` inside an axis of length `axis`.
    #[must_use]
    pub fn align(self, content: f32, axis: f32) -> f32 {
        match self {
            Self::Start => 0.0,
            Self::Middle => (axis - content) / 2.0,
            Self::End => axis - content,
        }
    }
}

impl FromStr for Alignment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "middle" => Ok(Self::Middle),
            "end" => Ok(Self::End),
            _ => Err(CoreError::UnknownKeyword {
                kind: "alignment",
                value: s.to_string(),
            }),
        }
    }
}

/// Layout axis of a lane or scroll container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Children flow left to right.
    #[default]
    Horizontal,
    /// Children flow top to bottom.
    Vertical,
}

impl Orientation {
    /// The perpendicular orientation.
    #[must_use]
    pub const fn swap(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Component of `v` along this axis.
    #[must_use]
    pub const fn get(self, v: Vec2) -> f32 {
        match self {
            Self::Horizontal => v.x,
            Self::Vertical => v.y,
        }
    }

    /// Sets the component of `v` along this axis.
    pub fn set(self, v: &mut Vec2, value: f32) {
        match self {
            Self::Horizontal => v.x = value,
            Self::Vertical => v.y = value,
        }
    }

    /// Applies `f` to the component of `v` along this axis.
    pub fn update(self, v: &mut Vec2, f: impl FnOnce(f32) -> f32) {
        let value = f(self.get(*v));
        self.set(v, value);
    }

    /// The length specification along this axis.
    #[must_use]
    pub fn length(self, layout: &LayoutParameters) -> Length {
        match self {
            Self::Horizontal => layout.width,
            Self::Vertical => layout.height,
        }
    }

    /// Builds a vector from a main-axis and cross-axis component.
    #[must_use]
    pub const fn vec(self, main: f32, cross: f32) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(main, cross),
            Self::Vertical => Vec2::new(cross, main),
        }
    }
}

impl FromStr for Orientation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            _ => Err(CoreError::UnknownKeyword {
                kind: "orientation",
                value: s.to_string(),
            }),
        }
    }
}

/// Navigation direction for focus search and wheel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Up.
    North,
    /// Right.
    East,
    /// Down.
    South,
    /// Left.
    West,
}

impl Direction {
    /// Axis along which the direction moves.
    #[must_use]
    pub const fn orientation(self) -> Orientation {
        match self {
            Self::North | Self::South => Orientation::Vertical,
            Self::East | Self::West => Orientation::Horizontal,
        }
    }

    /// `true` when the direction moves toward smaller coordinates.
    #[must_use]
    pub const fn is_backward(self) -> bool {
        matches!(self, Self::North | Self::West)
    }
}

/// Rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimpleRotation {
    /// No rotation.
    #[default]
    None,
    /// 90 degrees clockwise.
    QuarterClockwise,
    /// 90 degrees counterclockwise.
    QuarterCounterclockwise,
    /// 180 degrees.
    Half,
}

impl SimpleRotation {
    /// Rotation angle in radians, clockwise positive.
    #[must_use]
    pub fn angle(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::QuarterClockwise => FRAC_PI_2,
            Self::QuarterCounterclockwise => -FRAC_PI_2,
            Self::Half => PI,
        }
    }

    /// `true` for 90-degree rotations, which swap width and height.
    #[must_use]
    pub const fn is_quarter(self) -> bool {
        matches!(self, Self::QuarterClockwise | Self::QuarterCounterclockwise)
    }
}
