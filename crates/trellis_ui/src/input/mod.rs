//! Buttons, input sources and semantic actions.
//!
//! ```text
//!  host events ──► InputState ──► ActionState::tick ──► current_actions()
//!                      │                  │
//!                      │                  └── suppress() on first press
//!                      └──► KeybindCapture (keybind editor overlay)
//! ```
//!
//! The engine never polls hardware. The host fills an [`InputSource`] once per
//! frame and hands it to whatever needs it.

mod action;
mod capture;
mod keybind;
mod resolver;

pub use action::{ActionRepeat, ActionState};
pub use capture::{CaptureSlot, CaptureStatus, KeybindCapture, KeybindType};
pub use keybind::{Keybind, KeybindList};
pub use resolver::{ButtonAction, ButtonBindings, ButtonResolver};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use trellis_core::Vec2;

use crate::error::UiError;

/// Which device family a button belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    /// Mouse buttons.
    Mouse,
    /// Gamepad buttons, triggers and thumbstick directions.
    Controller,
    /// Keyboard keys.
    Keyboard,
}

macro_rules! buttons {
    ($( $kind:ident { $($variant:ident),+ $(,)? } )+) => {
        /// A physical button on any supported device.
        ///
        /// Ordering follows declaration order, so modifier keys sort ahead of
        /// the keys they modify inside a [`Keybind`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Button {
            $($(
                #[doc = concat!("The `", stringify!($variant), "` button.")]
                $variant,
            )+)+
        }

        impl Button {
            /// Every button, in declaration order.
            pub const ALL: &'static [Self] = &[$($(Self::$variant,)+)+];

            /// The button's name as written in keybind text and config files.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $($(Self::$variant => stringify!($variant),)+)+
                }
            }

            /// Device family.
            #[must_use]
            pub const fn kind(self) -> ButtonKind {
                match self {
                    $($(Self::$variant => ButtonKind::$kind,)+)+
                }
            }
        }
    };
}

buttons! {
    Mouse {
        MouseLeft, MouseRight, MouseMiddle, MouseX1, MouseX2,
    }
    Controller {
        ControllerA, ControllerB, ControllerX, ControllerY,
        ControllerBack, ControllerStart,
        DPadUp, DPadDown, DPadLeft, DPadRight,
        LeftShoulder, RightShoulder, LeftTrigger, RightTrigger,
        LeftStick, RightStick,
        LeftThumbstickUp, LeftThumbstickDown, LeftThumbstickLeft, LeftThumbstickRight,
        RightThumbstickUp, RightThumbstickDown, RightThumbstickLeft, RightThumbstickRight,
    }
    Keyboard {
        LeftControl, RightControl, LeftShift, RightShift, LeftAlt, RightAlt,
        Escape, Enter, Space, Tab, Back, Delete, Insert, Home, End, PageUp, PageDown,
        Up, Down, Left, Right,
        A, B, C, D, E, F, G, H, I, J, K, L, M,
        N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
        D0, D1, D2, D3, D4, D5, D6, D7, D8, D9,
        F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    }
}

impl Button {
    /// `true` for gamepad buttons.
    #[must_use]
    pub fn is_controller(self) -> bool {
        self.kind() == ButtonKind::Controller
    }

    /// `true` for keyboard keys.
    #[must_use]
    pub fn is_keyboard(self) -> bool {
        self.kind() == ButtonKind::Keyboard
    }

    /// `true` for mouse buttons.
    #[must_use]
    pub fn is_mouse(self) -> bool {
        self.kind() == ButtonKind::Mouse
    }

    /// `true` for the eight thumbstick directions.
    #[must_use]
    pub const fn is_thumbstick(self) -> bool {
        matches!(
            self,
            Self::LeftThumbstickUp
                | Self::LeftThumbstickDown
                | Self::LeftThumbstickLeft
                | Self::LeftThumbstickRight
                | Self::RightThumbstickUp
                | Self::RightThumbstickDown
                | Self::RightThumbstickLeft
                | Self::RightThumbstickRight
        )
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Button {
    type Err = UiError;

    /// Parses a button name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|button| button.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| UiError::UnknownButton(name.to_string()))
    }
}

/// Per-frame button state supplied by the host.
pub trait InputSource {
    /// `true` while `button` is held, including the frame it was pressed.
    fn is_down(&self, button: Button) -> bool;

    /// Buttons that went down this frame.
    fn pressed_buttons(&self) -> Vec<Button>;

    /// Hides `button` from the host's own handling until it is released.
    fn suppress(&mut self, button: Button);
}

/// A frame-based [`InputSource`] the host feeds with raw events.
///
/// Call [`InputState::begin_frame`] once per frame before applying that frame's
/// events. Suppression lasts until the button is released.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<Button>,
    pressed: BTreeSet<Button>,
    released: BTreeSet<Button>,
    suppressed: BTreeSet<Button>,
    pointer_position: Vec2,
    pointer_delta: Vec2,
    scroll_delta: f32,
}

impl InputState {
    /// Creates an empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears per-frame edges and deltas.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
        self.pointer_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Records a button going down.
    pub fn press(&mut self, button: Button) {
        if self.held.insert(button) {
            self.pressed.insert(button);
        }
    }

    /// Records a button going up.
    pub fn release(&mut self, button: Button) {
        if self.held.remove(&button) {
            self.released.insert(button);
            self.suppressed.remove(&button);
        }
    }

    /// Moves the pointer, accumulating the frame delta.
    pub fn move_pointer(&mut self, position: Vec2) {
        self.pointer_delta += position - self.pointer_position;
        self.pointer_position = position;
    }

    /// Accumulates wheel movement; positive is away from the user.
    pub fn scroll(&mut self, amount: f32) {
        self.scroll_delta += amount;
    }

    /// Buttons currently held.
    #[must_use]
    pub const fn held(&self) -> &BTreeSet<Button> {
        &self.held
    }

    /// `true` if `button` went down this frame.
    #[must_use]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed.contains(&button)
    }

    /// `true` if `button` went up this frame.
    #[must_use]
    pub fn is_released(&self, button: Button) -> bool {
        self.released.contains(&button)
    }

    /// `true` if `button` should be hidden from the host.
    #[must_use]
    pub fn is_suppressed(&self, button: Button) -> bool {
        self.suppressed.contains(&button)
    }

    /// Pointer position at the end of the frame.
    #[must_use]
    pub const fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Pointer position at the start of the frame.
    #[must_use]
    pub fn previous_pointer_position(&self) -> Vec2 {
        self.pointer_position - self.pointer_delta
    }

    /// Pointer movement this frame.
    #[must_use]
    pub const fn pointer_delta(&self) -> Vec2 {
        self.pointer_delta
    }

    /// Wheel movement this frame.
    #[must_use]
    pub const fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

impl InputSource for InputState {
    fn is_down(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    fn pressed_buttons(&self) -> Vec<Button> {
        self.pressed.iter().copied().collect()
    }

    fn suppress(&mut self, button: Button) {
        if self.held.contains(&button) {
            self.suppressed.insert(button);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_names_round_trip() {
        for button in Button::ALL {
            assert_eq!(button.name().parse::<Button>(), Ok(*button));
        }
        assert_eq!("leftcontrol".parse::<Button>(), Ok(Button::LeftControl));
        assert_eq!(
            "Hyperspace".parse::<Button>(),
            Err(UiError::UnknownButton("Hyperspace".to_string()))
        );
    }

    #[test]
    fn test_button_kinds() {
        assert!(Button::MouseLeft.is_mouse());
        assert!(Button::ControllerA.is_controller());
        assert!(Button::LeftThumbstickUp.is_controller());
        assert!(Button::LeftThumbstickUp.is_thumbstick());
        assert!(Button::F5.is_keyboard());
        assert!(!Button::Escape.is_controller());
        assert!(Button::LeftControl < Button::S);
    }

    #[test]
    fn test_input_state_edges() {
        let mut input = InputState::new();
        input.press(Button::A);
        assert!(input.is_pressed(Button::A));
        assert_eq!(input.pressed_buttons(), [Button::A]);

        input.begin_frame();
        input.press(Button::A);
        assert!(input.is_down(Button::A));
        assert!(input.pressed_buttons().is_empty());

        input.begin_frame();
        input.release(Button::A);
        assert!(!input.is_down(Button::A));
        assert!(input.is_released(Button::A));
    }

    #[test]
    fn test_suppression_lasts_until_release() {
        let mut input = InputState::new();
        input.suppress(Button::B);
        assert!(!input.is_suppressed(Button::B));

        input.press(Button::B);
        input.suppress(Button::B);
        input.begin_frame();
        assert!(input.is_suppressed(Button::B));
        assert!(input.is_down(Button::B));

        input.release(Button::B);
        assert!(!input.is_suppressed(Button::B));
    }

    #[test]
    fn test_pointer_delta_accumulates() {
        let mut input = InputState::new();
        input.move_pointer(Vec2::new(10.0, 0.0));
        input.begin_frame();
        input.move_pointer(Vec2::new(15.0, 5.0));
        input.move_pointer(Vec2::new(20.0, 10.0));
        input.scroll(1.0);
        assert_eq!(input.pointer_delta(), Vec2::new(10.0, 10.0));
        assert_eq!(input.previous_pointer_position(), Vec2::new(10.0, 0.0));
        assert_eq!(input.scroll_delta(), 1.0);
    }
}
