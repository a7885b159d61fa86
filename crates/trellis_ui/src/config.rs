//! Engine configuration.
//!
//! ```toml
//! [input]
//! repeat_interval_ms = 50
//! initial_delay_ms = 500
//! suppress = true
//!
//! [buttons]
//! primary = ["MouseLeft", "C"]
//! secondary = ["MouseRight", "X"]
//! cancel = ["Escape", "E"]
//!
//! [overlay]
//! dimming = 0.5
//! horizontal_alignment = "middle"
//! vertical_alignment = "middle"
//!
//! [animation]
//! hover_scale = 1.1
//! hover_duration_ms = 80
//! hover_easing = "linear"
//! ```
//!
//! Every section and key is optional; missing values fall back to the
//! built-in defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trellis_core::Alignment;

use crate::animation::{Easing, DEFAULT_HOVER_DURATION};
use crate::error::{UiError, UiResult};
use crate::input::{ActionRepeat, ButtonBindings, ButtonResolver};

/// Default hover scale factor.
pub const DEFAULT_HOVER_SCALE: f32 = 1.1;

/// Default overlay dimming.
pub const DEFAULT_OVERLAY_DIMMING: f32 = 0.5;

#[allow(clippy::cast_possible_truncation)]
const fn millis(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// `[input]`: defaults for action bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Time between repeats of a held action.
    pub repeat_interval_ms: u64,
    /// Time a held action waits before it starts repeating.
    pub initial_delay_ms: u64,
    /// Whether triggered buttons are suppressed from the host.
    pub suppress: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            repeat_interval_ms: millis(ActionRepeat::DEFAULT.repeat_interval),
            initial_delay_ms: millis(ActionRepeat::DEFAULT.initial_delay),
            suppress: true,
        }
    }
}

/// `[overlay]`: defaults for new overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Dimming drawn behind overlays, from 0 to 1.
    pub dimming: f32,
    /// Horizontal placement of overlays.
    pub horizontal_alignment: Alignment,
    /// Vertical placement of overlays.
    pub vertical_alignment: Alignment,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            dimming: DEFAULT_OVERLAY_DIMMING,
            horizontal_alignment: Alignment::Middle,
            vertical_alignment: Alignment::Middle,
        }
    }
}

/// `[animation]`: hover effect tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Maximum scale reached while hovered.
    pub hover_scale: f32,
    /// Time to reach the maximum scale.
    pub hover_duration_ms: u64,
    /// Progress curve of the hover tween.
    pub hover_easing: Easing,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            hover_scale: DEFAULT_HOVER_SCALE,
            hover_duration_ms: millis(DEFAULT_HOVER_DURATION),
            hover_easing: Easing::Linear,
        }
    }
}

/// Resolved engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Action binding defaults.
    pub input: InputConfig,
    /// Keyboard and mouse buttons for menu actions.
    pub buttons: ButtonBindings,
    /// Overlay defaults.
    pub overlay: OverlayConfig,
    /// Hover animation tuning.
    pub animation: AnimationConfig,
}

impl UiConfig {
    /// Parses and validates TOML configuration text.
    ///
    /// # Errors
    ///
    /// [`UiError::InvalidConfig`] if the text does not parse or a value is out of range.
    pub fn from_toml_str(text: &str) -> UiResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|err| UiError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`UiError::ConfigIo`] if the file cannot be read, otherwise as
    /// [`UiConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> UiResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| UiError::ConfigIo {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`UiError::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> UiResult<()> {
        if !(0.0..=1.0).contains(&self.overlay.dimming) {
            return Err(UiError::InvalidConfig(format!(
                "overlay.dimming must be between 0 and 1, got {}",
                self.overlay.dimming
            )));
        }
        if self.buttons.cancel.is_empty() {
            return Err(UiError::InvalidConfig("buttons.cancel must not be empty".into()));
        }
        if !self.animation.hover_scale.is_finite() || self.animation.hover_scale <= 0.0 {
            return Err(UiError::InvalidConfig(format!(
                "animation.hover_scale must be positive, got {}",
                self.animation.hover_scale
            )));
        }
        Ok(())
    }

    /// Repeat policy for new action bindings.
    #[must_use]
    pub const fn action_repeat(&self) -> ActionRepeat {
        ActionRepeat {
            repeat_interval: Duration::from_millis(self.input.repeat_interval_ms),
            initial_delay: Duration::from_millis(self.input.initial_delay_ms),
        }
    }

    /// Resolver over the configured buttons.
    #[must_use]
    pub fn resolver(&self) -> ButtonResolver {
        ButtonResolver::new(self.buttons.clone())
    }

    /// Hover tween duration.
    #[must_use]
    pub const fn hover_duration(&self) -> Duration {
        Duration::from_millis(self.animation.hover_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Button;

    #[test]
    fn test_default_mirrors_constants() {
        let config = UiConfig::default();
        assert_eq!(config.action_repeat(), ActionRepeat::DEFAULT);
        assert_eq!(config.hover_duration(), DEFAULT_HOVER_DURATION);
        assert_eq!(config.buttons, ButtonBindings::default());
        assert!(config.input.suppress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_text_is_default() {
        assert_eq!(UiConfig::from_toml_str("").unwrap(), UiConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = UiConfig::from_toml_str(
            r#"
            [input]
            initial_delay_ms = 250

            [buttons]
            cancel = ["ControllerB", "Back"]

            [overlay]
            dimming = 0.75
            horizontal_alignment = "start"
            "#,
        )
        .unwrap();
        assert_eq!(config.action_repeat().initial_delay, Duration::from_millis(250));
        assert_eq!(config.action_repeat().repeat_interval, Duration::from_millis(50));
        assert_eq!(config.buttons.cancel, [Button::ControllerB, Button::Back]);
        assert_eq!(config.buttons.primary, [Button::MouseLeft, Button::C]);
        assert_eq!(config.overlay.horizontal_alignment, Alignment::Start);
        assert_eq!(config.overlay.vertical_alignment, Alignment::Middle);
        assert_eq!(config.resolver().bindings().cancel, [Button::ControllerB, Button::Back]);
        assert_eq!(config.animation.hover_easing, Easing::Linear);
    }

    #[test]
    fn test_hover_easing_by_name() {
        let config = UiConfig::from_toml_str("[animation]\nhover_easing = \"quad_out\"").unwrap();
        assert_eq!(config.animation.hover_easing, Easing::QuadOut);
        assert!(UiConfig::from_toml_str("[animation]\nhover_easing = \"bounce\"").is_err());
    }

    #[test]
    fn test_validation_errors() {
        let err = UiConfig::from_toml_str("[overlay]\ndimming = 1.5").unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(message) if message.contains("dimming")));

        let err = UiConfig::from_toml_str("[buttons]\ncancel = []").unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(message) if message.contains("cancel")));

        let err = UiConfig::from_toml_str("[buttons]\nprimary = [\"NotAButton\"]").unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = UiConfig::load("/nonexistent/trellis.toml").unwrap_err();
        assert!(matches!(err, UiError::ConfigIo { path, .. } if path.contains("trellis.toml")));
    }
}
