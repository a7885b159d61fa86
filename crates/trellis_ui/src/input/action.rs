use std::time::Duration;

use tracing::trace;

use super::{Button, InputSource, Keybind, KeybindList};
use crate::error::{UiError, UiResult};

/// How an action repeats while its keybind stays held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRepeat {
    /// Minimum time between repeats.
    pub repeat_interval: Duration,
    /// Time after the first press before any repeat.
    pub initial_delay: Duration,
}

impl ActionRepeat {
    /// Fires on every frame while held.
    pub const CONTINUOUS: Self = Self::new(Duration::ZERO, Duration::ZERO);

    /// Fires once, then every 50 ms after a 500 ms hold.
    pub const DEFAULT: Self = Self::new(Duration::from_millis(50), Duration::from_millis(500));

    /// Fires once per press.
    pub const NONE: Self = Self::new(Duration::MAX, Duration::ZERO);

    /// Creates a repeat policy.
    #[must_use]
    pub const fn new(repeat_interval: Duration, initial_delay: Duration) -> Self {
        Self {
            repeat_interval,
            initial_delay,
        }
    }
}

impl Default for ActionRepeat {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone)]
struct Binding<T> {
    keybind: Keybind,
    action: T,
    repeat: ActionRepeat,
    suppress: bool,
    active: bool,
    ready: bool,
    since_first: Duration,
    since_last: Duration,
}

impl<T> Binding<T> {
    fn tick(&mut self, elapsed: Duration, input: &mut dyn InputSource) {
        if !self.keybind.is_down(&*input) {
            self.active = false;
            self.ready = false;
            self.since_first = Duration::ZERO;
            self.since_last = Duration::ZERO;
        } else if self.active {
            self.since_first = self.since_first.saturating_add(elapsed);
            self.since_last = self.since_last.saturating_add(elapsed);
            self.ready = self.since_first >= self.repeat.initial_delay
                && self.since_last >= self.repeat.repeat_interval;
            if self.ready {
                self.since_last = Duration::ZERO;
            }
        } else {
            self.active = true;
            self.ready = true;
            if self.suppress {
                for button in self.keybind.buttons() {
                    input.suppress(*button);
                }
            }
        }
    }
}

/// Translates held keybinds into semantic actions with repeat timing.
///
/// ```text
///  released ──press──► ready (fires, suppresses)
///     ▲                  │ held
///     │                  ▼
///     └──release──── active ──delay elapsed, interval elapsed──► ready (fires)
/// ```
///
/// Each keybind may be bound once. Actions are reported in binding order and
/// reset on every [`ActionState::tick`].
#[derive(Debug, Clone)]
pub struct ActionState<T> {
    bindings: Vec<Binding<T>>,
    default_repeat: ActionRepeat,
    default_suppress: bool,
}

impl<T: Clone + PartialEq> ActionState<T> {
    /// Creates an empty state with [`ActionRepeat::DEFAULT`] and suppression on.
    #[must_use]
    pub fn new() -> Self {
        Self::with_defaults(ActionRepeat::DEFAULT, true)
    }

    /// Creates an empty state with custom defaults for new bindings.
    #[must_use]
    pub fn with_defaults(default_repeat: ActionRepeat, default_suppress: bool) -> Self {
        Self {
            bindings: Vec::new(),
            default_repeat,
            default_suppress,
        }
    }

    /// Binds `keybind` to `action` with the default repeat and suppression.
    ///
    /// # Errors
    ///
    /// [`UiError::DuplicateKeybind`] if `keybind` is already bound.
    pub fn bind(&mut self, keybind: impl Into<Keybind>, action: T) -> UiResult<&mut Self> {
        self.bind_with(keybind, action, None, None)
    }

    /// Binds `keybind` to `action`, overriding the defaults where given.
    ///
    /// # Errors
    ///
    /// [`UiError::DuplicateKeybind`] if `keybind` is already bound.
    pub fn bind_with(
        &mut self,
        keybind: impl Into<Keybind>,
        action: T,
        repeat: Option<ActionRepeat>,
        suppress: Option<bool>,
    ) -> UiResult<&mut Self> {
        let keybind = keybind.into();
        if self.bindings.iter().any(|binding| binding.keybind == keybind) {
            return Err(UiError::DuplicateKeybind {
                keybind: keybind.to_string(),
            });
        }
        self.bindings.push(Binding {
            keybind,
            action,
            repeat: repeat.unwrap_or(self.default_repeat),
            suppress: suppress.unwrap_or(self.default_suppress),
            active: false,
            ready: false,
            since_first: Duration::ZERO,
            since_last: Duration::ZERO,
        });
        Ok(self)
    }

    /// Binds every keybind in `list` to `action`.
    ///
    /// # Errors
    ///
    /// [`UiError::DuplicateKeybind`] on the first keybind already bound; earlier
    /// keybinds in the list stay bound.
    pub fn bind_list(&mut self, list: &KeybindList, action: &T) -> UiResult<&mut Self> {
        for keybind in list.keybinds() {
            self.bind(keybind.clone(), action.clone())?;
        }
        Ok(self)
    }

    /// Advances every binding by one frame.
    pub fn tick(&mut self, elapsed: Duration, input: &mut dyn InputSource) {
        for binding in &mut self.bindings {
            let was_ready = binding.ready;
            binding.tick(elapsed, input);
            if binding.ready && !was_ready {
                trace!(keybind = %binding.keybind, "action ready");
            }
        }
    }

    /// Actions due this frame, in binding order.
    #[must_use]
    pub fn current_actions(&self) -> Vec<T> {
        self.bindings
            .iter()
            .filter(|binding| binding.ready)
            .map(|binding| binding.action.clone())
            .collect()
    }

    /// Every keybind bound to `action`.
    #[must_use]
    pub fn bindings_for(&self, action: &T) -> Vec<Keybind> {
        self.bindings_matching(action, |_| true)
    }

    /// Keybinds for `action` that use at least one keyboard key.
    #[must_use]
    pub fn keyboard_bindings(&self, action: &T) -> Vec<Keybind> {
        self.bindings_matching(action, Button::is_keyboard)
    }

    /// Keybinds for `action` that use at least one controller button.
    #[must_use]
    pub fn controller_bindings(&self, action: &T) -> Vec<Keybind> {
        self.bindings_matching(action, Button::is_controller)
    }

    fn bindings_matching(&self, action: &T, predicate: impl Fn(Button) -> bool) -> Vec<Keybind> {
        self.bindings
            .iter()
            .filter(|binding| binding.action == *action)
            .filter(|binding| binding.keybind.buttons().iter().any(|button| predicate(*button)))
            .map(|binding| binding.keybind.clone())
            .collect()
    }
}

impl<T: Clone + PartialEq> Default for ActionState<T> {
    fn default() -> Self {
        Self::new()
    }
}
