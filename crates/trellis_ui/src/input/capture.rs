use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use super::{Button, ButtonAction, ButtonResolver, InputSource, Keybind, KeybindList};
use crate::view::{same_view, View, ViewChild, ViewHandle};

/// What a [`KeybindCapture`] records and keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeybindType {
    /// One button; the capture ends with a single-button keybind.
    SingleButton,
    /// One chord, replacing the whole list.
    SingleKeybind,
    /// Chords are appended to the list.
    #[default]
    MultipleKeybinds,
}

impl KeybindType {
    /// `true` if whoever hosts the capture should close once it stops.
    #[must_use]
    pub const fn closes_on_stop(self) -> bool {
        !matches!(self, Self::MultipleKeybinds)
    }
}

/// Outcome of one [`KeybindCapture::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Not capturing.
    Idle,
    /// Still waiting for buttons, or for held buttons to be released.
    Capturing,
    /// A cancel button was pressed; the list is unchanged.
    Cancelled,
    /// Every captured button was released and the list was updated.
    Committed,
}

/// Records a keybind from whatever the player presses.
///
/// ```text
///            start()                     all captured buttons released
///   Idle ─────────────► Capturing ───────────────────────────────────► Idle (Committed)
///     ▲                    │
///     └────────────────────┘ cancel button held (suppressed)  ► Idle (Cancelled)
/// ```
///
/// Escape and thumbstick directions can never be captured. Mouse buttons are
/// ignored so the player can still click around the editor.
#[derive(Debug, Clone, Default)]
pub struct KeybindCapture {
    keybind_type: KeybindType,
    keybind_list: KeybindList,
    captured: BTreeSet<Button>,
    current: Keybind,
    capturing: bool,
}

impl KeybindCapture {
    /// Creates an idle capture editing `keybind_list`.
    #[must_use]
    pub fn new(keybind_list: KeybindList, keybind_type: KeybindType) -> Self {
        Self {
            keybind_type,
            keybind_list,
            ..Self::default()
        }
    }

    /// `true` for buttons that may be part of a captured keybind.
    #[must_use]
    pub fn is_bindable(button: Button) -> bool {
        !button.is_mouse() && button != Button::Escape && !button.is_thumbstick()
    }

    /// The list being edited.
    #[must_use]
    pub const fn keybind_list(&self) -> &KeybindList {
        &self.keybind_list
    }

    /// Replaces the list being edited.
    pub fn set_keybind_list(&mut self, keybind_list: KeybindList) {
        self.keybind_list = keybind_list;
    }

    /// Capture mode.
    #[must_use]
    pub const fn keybind_type(&self) -> KeybindType {
        self.keybind_type
    }

    /// Changes the capture mode.
    pub fn set_keybind_type(&mut self, keybind_type: KeybindType) {
        self.keybind_type = keybind_type;
    }

    /// `true` between [`KeybindCapture::start`] and the capture ending.
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// The keybind captured so far, for display.
    #[must_use]
    pub const fn current(&self) -> &Keybind {
        &self.current
    }

    /// Starts capturing. Does nothing if already capturing.
    pub fn start(&mut self) {
        if self.capturing {
            return;
        }
        self.captured.clear();
        self.current = Keybind::default();
        self.capturing = true;
        debug!(keybind_type = ?self.keybind_type, "keybind capture started");
    }

    /// Stops capturing without changing the list.
    pub fn stop(&mut self) {
        if !self.capturing {
            return;
        }
        self.capturing = false;
        self.captured.clear();
        self.current = Keybind::default();
        debug!("keybind capture stopped");
    }

    /// Removes `keybind` from the list.
    pub fn remove(&mut self, keybind: &Keybind) {
        self.keybind_list = KeybindList::new(
            self.keybind_list
                .keybinds()
                .iter()
                .filter(|existing| *existing != keybind)
                .cloned(),
        );
    }

    /// Advances the capture by one frame.
    pub fn update(
        &mut self,
        input: &mut dyn InputSource,
        resolver: &ButtonResolver,
    ) -> CaptureStatus {
        if !self.capturing {
            return CaptureStatus::Idle;
        }

        for button in resolver.action_buttons(ButtonAction::Cancel) {
            if input.is_down(button) {
                input.suppress(button);
                self.stop();
                return CaptureStatus::Cancelled;
            }
        }

        let held: Vec<Button> = Button::ALL
            .iter()
            .copied()
            .filter(|button| Self::is_bindable(*button) && input.is_down(*button))
            .collect();
        let any_held = !held.is_empty();
        let mut changed = false;
        for button in &held {
            changed |= self.captured.insert(*button);
        }
        if self.keybind_type == KeybindType::SingleButton && any_held {
            let before = self.captured.len();
            self.captured.retain(|button| input.is_down(*button));
            changed |= self.captured.len() != before;
        }
        if changed {
            self.current = self.captured_keybind();
        }

        if self.captured.is_empty() || any_held {
            return CaptureStatus::Capturing;
        }

        let keybind = self.captured_keybind();
        if keybind.is_bound() {
            let existing = self.keybind_list.keybinds();
            self.keybind_list = match self.keybind_type {
                KeybindType::MultipleKeybinds if existing.contains(&keybind) => {
                    self.keybind_list.clone()
                }
                KeybindType::MultipleKeybinds => {
                    KeybindList::new(existing.iter().cloned().chain([keybind]))
                }
                KeybindType::SingleButton | KeybindType::SingleKeybind => {
                    KeybindList::new([keybind])
                }
            };
            debug!(keybinds = %self.keybind_list, "keybind captured");
        }
        self.stop();
        CaptureStatus::Committed
    }

    fn captured_keybind(&self) -> Keybind {
        match self.keybind_type {
            KeybindType::SingleButton => {
                self.captured.first().copied().map(Keybind::single).unwrap_or_default()
            }
            KeybindType::SingleKeybind | KeybindType::MultipleKeybinds => {
                Keybind::new(self.captured.iter().copied())
            }
        }
    }
}

/// The single view holding exclusive keyboard capture, if any.
///
/// The slot holds the view weakly; a dropped view counts as no capture.
#[derive(Default)]
pub struct CaptureSlot {
    owner: Option<(Weak<RefCell<dyn View>>, Box<dyn FnOnce()>)>,
}

impl CaptureSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives capture to `view`, releasing any previous owner first.
    pub fn capture(&mut self, view: &ViewHandle, on_release: impl FnOnce() + 'static) {
        self.release();
        self.owner = Some((Rc::downgrade(view), Box::new(on_release)));
    }

    /// The capturing view, if it is still alive.
    #[must_use]
    pub fn view(&self) -> Option<ViewHandle> {
        self.owner.as_ref().and_then(|(view, _)| view.upgrade())
    }

    /// `true` if a live view holds capture.
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.view().is_some()
    }

    /// Ends capture and runs the owner's release callback. Safe when empty.
    pub fn release(&mut self) {
        if let Some((_, on_release)) = self.owner.take() {
            on_release();
        }
    }

    /// Releases capture unless the capturing view is on `path`.
    ///
    /// Returns `true` if capture was released.
    pub fn release_unless_on_path(&mut self, path: &[ViewChild]) -> bool {
        if self.owner.is_none() {
            return false;
        }
        if let Some(view) = self.view() {
            if path.iter().any(|child| same_view(&child.view, &view)) {
                return false;
            }
        }
        self.release();
        true
    }
}

impl fmt::Debug for CaptureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSlot")
            .field("capturing", &self.is_capturing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use crate::view::handle;
    use crate::widget::Spacer;
    use std::cell::Cell;
    use trellis_core::{LayoutParameters, Vec2};

    fn list(text: &str) -> KeybindList {
        text.parse().unwrap()
    }

    #[test]
    fn test_chord_commits_on_release() {
        let resolver = ButtonResolver::default();
        let mut capture = KeybindCapture::new(list("F5"), KeybindType::MultipleKeybinds);
        let mut input = InputState::new();
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Idle);

        capture.start();
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Capturing);
        input.press(Button::LeftControl);
        input.press(Button::MouseLeft);
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Capturing);
        input.press(Button::S);
        capture.update(&mut input, &resolver);
        assert_eq!(capture.current().to_string(), "LeftControl + S");

        input.release(Button::S);
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Capturing);
        input.release(Button::LeftControl);
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Committed);
        assert_eq!(capture.keybind_list().to_string(), "F5, LeftControl + S");
        assert!(!capture.is_capturing());
    }

    #[test]
    fn test_cancel_button_aborts_and_is_suppressed() {
        let resolver = ButtonResolver::default();
        let mut capture = KeybindCapture::new(list("F5"), KeybindType::SingleKeybind);
        let mut input = InputState::new();
        capture.start();
        input.press(Button::A);
        capture.update(&mut input, &resolver);
        input.press(Button::Escape);
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Cancelled);
        assert!(input.is_suppressed(Button::Escape));
        assert_eq!(capture.keybind_list().to_string(), "F5");
    }

    #[test]
    fn test_single_button_keeps_last_held() {
        let resolver = ButtonResolver::default();
        let mut capture = KeybindCapture::new(KeybindList::default(), KeybindType::SingleButton);
        let mut input = InputState::new();
        capture.start();
        input.press(Button::A);
        capture.update(&mut input, &resolver);
        input.release(Button::A);
        input.press(Button::B);
        capture.update(&mut input, &resolver);
        assert_eq!(capture.current(), &Keybind::single(Button::B));

        input.release(Button::B);
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Committed);
        assert_eq!(capture.keybind_list().to_string(), "B");
        assert!(KeybindType::SingleButton.closes_on_stop());
    }

    #[test]
    fn test_banned_buttons_are_ignored() {
        assert!(!KeybindCapture::is_bindable(Button::Escape));
        assert!(!KeybindCapture::is_bindable(Button::LeftThumbstickLeft));
        assert!(KeybindCapture::is_bindable(Button::ControllerY));

        let resolver = ButtonResolver::default();
        let mut capture = KeybindCapture::new(KeybindList::default(), KeybindType::SingleKeybind);
        let mut input = InputState::new();
        capture.start();
        input.press(Button::RightThumbstickUp);
        capture.update(&mut input, &resolver);
        input.release(Button::RightThumbstickUp);
        assert_eq!(capture.update(&mut input, &resolver), CaptureStatus::Capturing);
    }

    #[test]
    fn test_remove_keybind() {
        let mut capture =
            KeybindCapture::new(list("F5, LeftControl + S"), KeybindType::MultipleKeybinds);
        capture.remove(&Keybind::single(Button::F5));
        assert_eq!(capture.keybind_list().to_string(), "LeftControl + S");
    }

    #[test]
    fn test_capture_slot() {
        let mut slot = CaptureSlot::new();
        slot.release();
        assert!(!slot.is_capturing());

        let released = Rc::new(Cell::new(0));
        let view = handle(Spacer::new(LayoutParameters::fixed_size(10.0, 10.0)));
        let other = handle(Spacer::new(LayoutParameters::fixed_size(10.0, 10.0)));
        let counter = Rc::clone(&released);
        slot.capture(&view, move || counter.set(counter.get() + 1));
        assert!(slot.is_capturing());

        assert!(!slot.release_unless_on_path(&[ViewChild::new(Rc::clone(&view), Vec2::ZERO)]));
        assert!(slot.release_unless_on_path(&[ViewChild::new(other, Vec2::ZERO)]));
        assert_eq!(released.get(), 1);
        slot.release();
        assert_eq!(released.get(), 1);
    }
}
