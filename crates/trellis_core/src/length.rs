//! Length specifications and layout parameter resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::Vec2;

/// How one axis of a view is sized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    /// Exact size in pixels.
    Px(f32),
    /// Percentage of the available size.
    Percent(f32),
    /// Natural size of the content.
    #[default]
    Content,
    /// All of the available size.
    Stretch,
}

impl Length {
    /// Resolves the length against an available size.
    ///
    /// `content` is only evaluated for `Content`, or for `Stretch`/`Percent` when the
    /// available size is unbounded.
    pub fn resolve(self, available: f32, content: impl FnOnce() -> f32) -> f32 {
        match self {
            Self::Px(value) => value,
            Self::Percent(percent) if available.is_finite() => available * percent / 100.0,
            Self::Stretch if available.is_finite() => available,
            Self::Percent(_) | Self::Stretch | Self::Content => content(),
        }
    }

    /// `true` for `Content`.
    #[must_use]
    pub const fn is_content(self) -> bool {
        matches!(self, Self::Content)
    }

    /// `true` for `Stretch`.
    #[must_use]
    pub const fn is_stretch(self) -> bool {
        matches!(self, Self::Stretch)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(value) => write!(f, "{value}px"),
            Self::Percent(percent) => write!(f, "{percent}%"),
            Self::Content => f.write_str("content"),
            Self::Stretch => f.write_str("stretch"),
        }
    }
}

impl FromStr for Length {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CoreError::Length(s.to_string());
        match trimmed.to_ascii_lowercase().as_str() {
            "content" => Ok(Self::Content),
            "stretch" => Ok(Self::Stretch),
            other => {
                if let Some(number) = other.strip_suffix("px") {
                    number.trim().parse().map(Self::Px).map_err(|_| invalid())
                } else if let Some(number) = other.strip_suffix('%') {
                    number.trim().parse().map(Self::Percent).map_err(|_| invalid())
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// Width and height specification of a view, with optional clamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutParameters {
    /// Horizontal sizing.
    pub width: Length,
    /// Vertical sizing.
    pub height: Length,
    /// Lower bound on the resolved width.
    pub min_width: Option<f32>,
    /// Upper bound on the resolved width.
    pub max_width: Option<f32>,
    /// Lower bound on the resolved height.
    pub min_height: Option<f32>,
    /// Upper bound on the resolved height.
    pub max_height: Option<f32>,
}

impl LayoutParameters {
    /// Creates parameters with no clamps.
    #[must_use]
    pub const fn new(width: Length, height: Length) -> Self {
        Self {
            width,
            height,
            min_width: None,
            max_width: None,
            min_height: None,
            max_height: None,
        }
    }

    /// Sized to content on both axes.
    #[must_use]
    pub const fn fit_content() -> Self {
        Self::new(Length::Content, Length::Content)
    }

    /// Stretched on both axes.
    #[must_use]
    pub const fn fill() -> Self {
        Self::new(Length::Stretch, Length::Stretch)
    }

    /// Full width, content height.
    #[must_use]
    pub const fn auto_row() -> Self {
        Self::new(Length::Stretch, Length::Content)
    }

    /// Exact pixel size.
    #[must_use]
    pub const fn fixed_size(width: f32, height: f32) -> Self {
        Self::new(Length::Px(width), Length::Px(height))
    }

    /// Sets the minimum width.
    #[must_use]
    pub const fn with_min_width(mut self, value: f32) -> Self {
        self.min_width = Some(value);
        self
    }

    /// Sets the maximum width.
    #[must_use]
    pub const fn with_max_width(mut self, value: f32) -> Self {
        self.max_width = Some(value);
        self
    }

    /// Sets the minimum height.
    #[must_use]
    pub const fn with_min_height(mut self, value: f32) -> Self {
        self.min_height = Some(value);
        self
    }

    /// Sets the maximum height.
    #[must_use]
    pub const fn with_max_height(mut self, value: f32) -> Self {
        self.max_height = Some(value);
        self
    }

    /// Resolves a concrete size.
    ///
    /// The result is never negative and lies within the configured clamps; when a
    /// minimum exceeds its maximum, the maximum wins.
    #[must_use]
    pub fn resolve(&self, available: Vec2, content_size: Vec2) -> Vec2 {
        let width = self.width.resolve(available.x, || content_size.x);
        let height = self.height.resolve(available.y, || content_size.y);
        Vec2::new(
            clamp(width, self.min_width, self.max_width),
            clamp(height, self.min_height, self.max_height),
        )
    }

    /// Size limits to pass down to children when measuring.
    #[must_use]
    pub fn limits(&self, available: Vec2) -> Vec2 {
        let width = self.width.resolve(available.x, || available.x);
        let height = self.height.resolve(available.y, || available.y);
        Vec2::new(
            self.max_width.map_or(width, |max| width.min(max)),
            self.max_height.map_or(height, |max| height.min(max)),
        )
    }
}

fn clamp(value: f32, min: Option<f32>, max: Option<f32>) -> f32 {
    let mut value = value;
    if let Some(min) = min {
        value = value.max(min);
    }
    if let Some(max) = max {
        value = value.min(max);
    }
    value.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_resolution() {
        assert_eq!(Length::Px(12.0).resolve(100.0, || 5.0), 12.0);
        assert_eq!(Length::Percent(25.0).resolve(200.0, || 5.0), 50.0);
        assert_eq!(Length::Content.resolve(100.0, || 5.0), 5.0);
        assert_eq!(Length::Stretch.resolve(100.0, || 5.0), 100.0);
        assert_eq!(Length::Stretch.resolve(f32::INFINITY, || 5.0), 5.0);
        assert_eq!(Length::Percent(50.0).resolve(f32::INFINITY, || 7.0), 7.0);
    }

    #[test]
    fn test_length_parse_and_display() {
        assert_eq!("content".parse::<Length>().unwrap(), Length::Content);
        assert_eq!("Stretch".parse::<Length>().unwrap(), Length::Stretch);
        assert_eq!("64px".parse::<Length>().unwrap(), Length::Px(64.0));
        assert_eq!("12.5%".parse::<Length>().unwrap(), Length::Percent(12.5));
        assert!("64".parse::<Length>().is_err());
        assert!("abcpx".parse::<Length>().is_err());
        assert_eq!(Length::Px(64.0).to_string(), "64px");
    }

    #[test]
    fn test_resolved_size_respects_clamps() {
        let lengths = [
            Length::Px(-10.0),
            Length::Px(0.0),
            Length::Px(40.0),
            Length::Percent(150.0),
            Length::Content,
            Length::Stretch,
        ];
        let availables = [0.0, 25.0, 80.0, 1000.0, f32::INFINITY];
        let contents = [0.0, 30.0, 500.0];
        let clamps = [
            (None, None),
            (Some(10.0), None),
            (None, Some(50.0)),
            (Some(20.0), Some(60.0)),
            (Some(90.0), Some(40.0)),
        ];

        for length in lengths {
            for available in availables {
                for content in contents {
                    for (min, max) in clamps {
                        let mut layout = LayoutParameters::new(length, length);
                        layout.min_width = min;
                        layout.max_width = max;
                        let size =
                            layout.resolve(Vec2::new(available, available), Vec2::splat(content));

                        assert!(size.x >= 0.0, "{length} {available} {content}");
                        assert!(size.y >= 0.0);
                        if let Some(max) = max {
                            assert!(size.x <= max);
                        }
                        if let (Some(min), None) = (min, max) {
                            assert!(size.x >= min);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_max_wins_over_min() {
        let layout = LayoutParameters::fixed_size(30.0, 30.0)
            .with_min_width(90.0)
            .with_max_width(40.0);
        assert_eq!(layout.resolve(Vec2::splat(100.0), Vec2::ZERO).x, 40.0);
    }

    #[test]
    fn test_limits() {
        let layout = LayoutParameters::fill().with_max_width(50.0);
        assert_eq!(layout.limits(Vec2::new(100.0, 80.0)), Vec2::new(50.0, 80.0));
        assert_eq!(
            LayoutParameters::fit_content().limits(Vec2::new(100.0, 80.0)),
            Vec2::new(100.0, 80.0)
        );
        assert_eq!(
            LayoutParameters::fixed_size(10.0, 20.0).limits(Vec2::INFINITY),
            Vec2::new(10.0, 20.0)
        );
    }
}
