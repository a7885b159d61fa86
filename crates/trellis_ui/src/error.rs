//! Error types for the UI engine.
//!
//! Only malformed setup arguments are errors. Lookups that can miss return
//! `Option` or a placeholder flag instead.

use thiserror::Error;
use trellis_core::{CoreError, PixelRect};

/// UI engine errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UiError {
    /// A keybind was bound twice in the same action state.
    #[error("Keybind '{keybind}' is already bound")]
    DuplicateKeybind {
        /// Display form of the keybind.
        keybind: String,
    },

    /// A sprite-map source rectangle has zero or negative size.
    #[error("Sprite rectangle {rect:?} must have positive width and height")]
    EmptySpriteRect {
        /// The offending rectangle.
        rect: PixelRect,
    },

    /// A sprite-map source rectangle falls outside its texture.
    #[error("Sprite rectangle {rect:?} exceeds texture bounds {width}x{height}")]
    SpriteOutOfBounds {
        /// The offending rectangle.
        rect: PixelRect,
        /// Texture width.
        width: i32,
        /// Texture height.
        height: i32,
    },

    /// A button name was not recognized.
    #[error("Unknown button '{0}'")]
    UnknownButton(String),

    /// Keybind text has an empty chord member, e.g. `"A + "`.
    #[error("Invalid keybind '{0}'")]
    InvalidKeybind(String),

    /// Configuration text could not be parsed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("Failed to read configuration '{path}': {message}")]
    ConfigIo {
        /// File path.
        path: String,
        /// Underlying I/O error message.
        message: String,
    },

    /// A layout primitive failed to parse.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
