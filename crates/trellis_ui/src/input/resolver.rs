use serde::{Deserialize, Serialize};

use super::{Button, InputSource};

/// What a button means to menus, independent of device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    /// No menu meaning.
    #[default]
    None,
    /// Select or activate.
    Primary,
    /// Alternate activation.
    Secondary,
    /// Back out or close.
    Cancel,
}

/// Host-configurable keyboard and mouse buttons for each [`ButtonAction`].
///
/// Controller buttons are fixed: A is primary, X secondary, B cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonBindings {
    /// Buttons that act as [`ButtonAction::Primary`].
    pub primary: Vec<Button>,
    /// Buttons that act as [`ButtonAction::Secondary`].
    pub secondary: Vec<Button>,
    /// Buttons that act as [`ButtonAction::Cancel`].
    pub cancel: Vec<Button>,
}

impl Default for ButtonBindings {
    fn default() -> Self {
        Self {
            primary: vec![Button::MouseLeft, Button::C],
            secondary: vec![Button::MouseRight, Button::X],
            cancel: vec![Button::Escape, Button::E],
        }
    }
}

/// Maps physical buttons to [`ButtonAction`]s and back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonResolver {
    bindings: ButtonBindings,
}

impl ButtonResolver {
    /// Creates a resolver over `bindings`.
    #[must_use]
    pub const fn new(bindings: ButtonBindings) -> Self {
        Self { bindings }
    }

    /// The configured bindings.
    #[must_use]
    pub const fn bindings(&self) -> &ButtonBindings {
        &self.bindings
    }

    /// Every button that performs `action`, controller button first.
    #[must_use]
    pub fn action_buttons(&self, action: ButtonAction) -> Vec<Button> {
        let (controller, configured) = match action {
            ButtonAction::Primary => (Button::ControllerA, &self.bindings.primary),
            ButtonAction::Secondary => (Button::ControllerX, &self.bindings.secondary),
            ButtonAction::Cancel => (Button::ControllerB, &self.bindings.cancel),
            ButtonAction::None => return Vec::new(),
        };
        std::iter::once(controller).chain(configured.iter().copied()).collect()
    }

    /// The action `button` performs, if any.
    #[must_use]
    pub fn button_action(&self, button: Button) -> ButtonAction {
        match button {
            Button::ControllerA => ButtonAction::Primary,
            Button::ControllerX => ButtonAction::Secondary,
            Button::ControllerB => ButtonAction::Cancel,
            _ if self.bindings.primary.contains(&button) => ButtonAction::Primary,
            _ if self.bindings.secondary.contains(&button) => ButtonAction::Secondary,
            _ if self.bindings.cancel.contains(&button) => ButtonAction::Cancel,
            _ => ButtonAction::None,
        }
    }

    /// The physical button currently held for `logical`.
    ///
    /// A logical press may come from any button sharing its action, e.g. a
    /// synthesized `ControllerA` press while the mouse is what's actually down.
    /// Falls back to `logical` when nothing matching is held.
    pub fn pressed_button(&self, logical: Button, input: &dyn InputSource) -> Button {
        if input.is_down(logical) {
            return logical;
        }
        self.action_buttons(self.button_action(logical))
            .into_iter()
            .find(|button| input.is_down(*button))
            .unwrap_or(logical)
    }
}
