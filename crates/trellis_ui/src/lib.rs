//! # Trellis UI
//!
//! Retained-mode view engine for hosts that own the window, the textures and the
//! frame loop. The host hands in elapsed time, input and a [`SpriteBatch`]; the
//! engine measures, hit-tests, animates and records draw calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FRAME PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  InputSource → Actions/Capture → Overlays → View tree → Batch │
//! │       ↓              ↓              ↓           ↓         ↓   │
//! │  Keybinds      Repeat timing    Modal stack   Measure   Commands│
//! │                                               Dispatch  Vertices│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//!
//! Views are shared as `Rc<RefCell<dyn View>>`. Parents own children; nothing
//! owns upward. Overlays, animators and keyboard capture hold their views
//! weakly, so dropping a view is always enough to retire everything attached
//! to it.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod animation;
pub mod config;
pub mod error;
pub mod input;
pub mod nine_slice;
pub mod overlay;
pub mod render;
pub mod sprite;
pub mod style;
pub mod ui;
pub mod view;
pub mod widget;

pub use animation::{AnimationRunner, Animator, Easing, HoverScale, SpriteAnimator};
pub use config::UiConfig;
pub use error::{UiError, UiResult};
pub use input::{ActionState, Button, ButtonResolver, InputSource, InputState, Keybind, KeybindList};
pub use nine_slice::NineSlice;
pub use overlay::{Overlay, OverlayContext, OverlayInput};
pub use render::{Font, RenderCommand, SpriteBatch, Texture, UiRenderer};
pub use sprite::{Sprite, SpriteMap};
pub use style::Color;
pub use ui::Ui;
pub use view::{View, ViewChild, ViewHandle, ViewState};
