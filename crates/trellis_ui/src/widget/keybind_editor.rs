use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;
use trellis_core::{Alignment, Direction, Edges, LayoutParameters, Orientation, Vec2};

use super::{Frame, Label, Lane};
use crate::input::{
    ButtonAction, ButtonResolver, CaptureStatus, InputSource, KeybindCapture, KeybindList,
    KeybindType,
};
use crate::overlay::{Overlay, OverlayContext, OverlayInput};
use crate::render::{Font, SpriteBatch};
use crate::view::{
    draw_children, search_children, FocusSearchResult, View, ViewChild, ViewHandle, ViewState,
};

const CAPTURE_PROMPT: &str = "Press a button or key combination";

type ChangeHandler = Rc<dyn Fn(&KeybindList)>;

struct Shared {
    keybind_list: KeybindList,
    keybind_type: KeybindType,
    empty_text: String,
    dimming: f32,
    label: Rc<RefCell<Label>>,
    on_change: Vec<ChangeHandler>,
}

impl Shared {
    fn sync_label(&self) {
        let text = if self.keybind_list.is_bound() {
            self.keybind_list.to_string()
        } else {
            self.empty_text.clone()
        };
        self.label.borrow_mut().set_text(text);
    }
}

/// Writes a captured list back to the editor and notifies observers.
fn commit(shared: &RefCell<Shared>, keybind_list: KeybindList) {
    let handlers = {
        let mut state = shared.borrow_mut();
        if state.keybind_list == keybind_list {
            return;
        }
        state.keybind_list = keybind_list.clone();
        state.sync_label();
        state.on_change.clone()
    };
    for handler in &handlers {
        handler(&keybind_list);
    }
}

/// Everything the capture overlay needs, cloned out of the editor when it opens.
struct CaptureSession {
    shared: Weak<RefCell<Shared>>,
    capture: Rc<RefCell<KeybindCapture>>,
    current: Rc<RefCell<Label>>,
    list: Rc<RefCell<Label>>,
    resolver: ButtonResolver,
}

impl CaptureSession {
    fn handle_input(&self, input: &mut dyn InputSource) -> OverlayInput {
        let Some(shared) = self.shared.upgrade() else {
            return OverlayInput::Close;
        };
        let status = self.capture.borrow_mut().update(input, &self.resolver);
        let (keybind_type, current, keybind_list) = {
            let capture = self.capture.borrow();
            (capture.keybind_type(), capture.current().to_string(), capture.keybind_list().clone())
        };
        match status {
            CaptureStatus::Capturing => {
                let text = if current.is_empty() { CAPTURE_PROMPT.to_string() } else { current };
                self.current.borrow_mut().set_text(text);
                OverlayInput::Capturing
            }
            CaptureStatus::Committed => {
                self.list.borrow_mut().set_text(keybind_list.to_string());
                self.current.borrow_mut().set_text(CAPTURE_PROMPT);
                commit(&shared, keybind_list);
                close_or_ignore(keybind_type)
            }
            CaptureStatus::Cancelled => close_or_ignore(keybind_type),
            CaptureStatus::Idle => {
                let cancel = self.resolver.action_buttons(ButtonAction::Cancel);
                if input.pressed_buttons().iter().any(|button| cancel.contains(button)) {
                    OverlayInput::Close
                } else {
                    OverlayInput::Ignored
                }
            }
        }
    }
}

fn close_or_ignore(keybind_type: KeybindType) -> OverlayInput {
    if keybind_type.closes_on_stop() {
        OverlayInput::Close
    } else {
        OverlayInput::Ignored
    }
}

/// Shows a [`KeybindList`] and edits it through a capture overlay.
///
/// Clicking the editor pushes an overlay that records the next keybind pressed.
/// Single-button and single-keybind editors close the overlay as soon as a
/// keybind is captured or cancelled; multiple-keybind editors stay open, and a
/// click on the overlay starts another capture.
pub struct KeybindEditor {
    state: ViewState,
    root: Rc<RefCell<Frame>>,
    font: Rc<dyn Font>,
    shared: Rc<RefCell<Shared>>,
    overlays: Weak<OverlayContext>,
    resolver: ButtonResolver,
}

impl KeybindEditor {
    /// Creates an editor that opens its overlay on `overlays`.
    #[must_use]
    pub fn new(
        font: Rc<dyn Font>,
        overlays: &Rc<OverlayContext>,
        resolver: ButtonResolver,
    ) -> Self {
        let label = Rc::new(RefCell::new(Label::new(Rc::clone(&font), "")));
        let label_handle: ViewHandle = label.clone();
        let root = Frame::new().with_content(label_handle);
        let shared = Rc::new(RefCell::new(Shared {
            keybind_list: KeybindList::default(),
            keybind_type: KeybindType::default(),
            empty_text: String::new(),
            dimming: 0.0,
            label,
            on_change: Vec::new(),
        }));
        shared.borrow().sync_label();

        let mut editor = Self {
            state: ViewState::new("KeybindEditor").with_focusable(true),
            root: Rc::new(RefCell::new(root)),
            font,
            shared,
            overlays: Rc::downgrade(overlays),
            resolver,
        };
        editor.subscribe_click();
        editor
    }

    /// Sets the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.state.set_layout(layout);
        self
    }

    /// Sets the list shown.
    #[must_use]
    pub fn with_keybind_list(self, keybind_list: KeybindList) -> Self {
        self.set_keybind_list(keybind_list);
        self
    }

    /// Sets the capture mode.
    #[must_use]
    pub fn with_keybind_type(self, keybind_type: KeybindType) -> Self {
        self.shared.borrow_mut().keybind_type = keybind_type;
        self
    }

    /// Text shown while nothing is bound.
    #[must_use]
    pub fn with_empty_text(self, text: impl Into<String>) -> Self {
        let mut shared = self.shared.borrow_mut();
        shared.empty_text = text.into();
        shared.sync_label();
        drop(shared);
        self
    }

    /// Dimming behind the capture overlay.
    #[must_use]
    pub fn with_dimming(self, dimming: f32) -> Self {
        self.shared.borrow_mut().dimming = dimming;
        self
    }

    /// The list currently shown.
    #[must_use]
    pub fn keybind_list(&self) -> KeybindList {
        self.shared.borrow().keybind_list.clone()
    }

    /// Replaces the list without notifying observers.
    pub fn set_keybind_list(&self, keybind_list: KeybindList) {
        let mut shared = self.shared.borrow_mut();
        shared.keybind_list = keybind_list;
        shared.sync_label();
    }

    /// Capture mode.
    #[must_use]
    pub fn keybind_type(&self) -> KeybindType {
        self.shared.borrow().keybind_type
    }

    /// Runs `handler` whenever a capture changes the list.
    pub fn on_change(&self, handler: impl Fn(&KeybindList) + 'static) {
        self.shared.borrow_mut().on_change.push(Rc::new(handler));
    }

    /// The frame around the keybind text, for borders and backgrounds.
    #[must_use]
    pub fn frame(&self) -> &Rc<RefCell<Frame>> {
        &self.root
    }

    /// Pushes the capture overlay and starts capturing.
    ///
    /// Does nothing if the overlay stack has been dropped.
    pub fn open(&self) {
        open_capture(&self.shared, &self.overlays, &self.font, &self.resolver);
    }

    fn subscribe_click(&mut self) {
        let shared = Rc::downgrade(&self.shared);
        let overlays = Weak::clone(&self.overlays);
        let font = Rc::clone(&self.font);
        let resolver = self.resolver.clone();
        self.state.handlers_mut().left_click.add(move |event| {
            if let Some(shared) = shared.upgrade() {
                open_capture(&shared, &overlays, &font, &resolver);
                event.handled = true;
            }
        });
    }

    fn root_child(&self) -> ViewChild {
        let root: ViewHandle = self.root.clone();
        ViewChild::new(root, Vec2::ZERO)
    }
}

fn open_capture(
    shared: &Rc<RefCell<Shared>>,
    overlays: &Weak<OverlayContext>,
    font: &Rc<dyn Font>,
    resolver: &ButtonResolver,
) {
    let Some(overlays) = overlays.upgrade() else {
        return;
    };
    let (keybind_list, keybind_type, dimming) = {
        let shared = shared.borrow();
        (shared.keybind_list.clone(), shared.keybind_type, shared.dimming)
    };
    let capture = Rc::new(RefCell::new(KeybindCapture::new(keybind_list.clone(), keybind_type)));
    capture.borrow_mut().start();

    let current = Rc::new(RefCell::new(Label::new(Rc::clone(font), CAPTURE_PROMPT)));
    let list = Rc::new(RefCell::new(Label::new(Rc::clone(font), keybind_list.to_string())));
    let children: Vec<ViewHandle> = vec![current.clone(), list.clone()];
    let content: ViewHandle = Rc::new(RefCell::new(
        Lane::new(Orientation::Vertical).with_children(children),
    ));
    let panel = Frame::new().with_content(content);
    let panel: ViewHandle = Rc::new(RefCell::new(panel));
    panel.borrow_mut().state_mut().set_padding(Edges::all(8));

    let restart = Rc::downgrade(&capture);
    panel.borrow_mut().state_mut().handlers_mut().left_click.add(move |event| {
        if let Some(capture) = restart.upgrade() {
            capture.borrow_mut().start();
            event.handled = true;
        }
    });

    let session = CaptureSession {
        shared: Rc::downgrade(shared),
        capture,
        current,
        list,
        resolver: resolver.clone(),
    };
    let overlay = Overlay::new(panel)
        .with_alignment(Alignment::Middle, Alignment::Middle)
        .with_dimming(dimming)
        .with_input_handler(move |input| session.handle_input(input));
    debug!(keybind_type = ?keybind_type, "keybind capture opened");
    overlays.push(overlay.into_handle());
}

impl fmt::Debug for KeybindEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeybindEditor")
            .field("state", &self.state)
            .field("keybind_list", &self.keybind_list().to_string())
            .field("keybind_type", &self.keybind_type())
            .finish_non_exhaustive()
    }
}

impl View for KeybindEditor {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let mut root = self.root.borrow_mut();
        root.measure(layout.limits(available));
        layout.resolve(available, root.outer_size())
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        draw_children(&[self.root_child()], batch);
    }

    fn local_children(&self) -> Vec<ViewChild> {
        vec![self.root_child()]
    }

    fn is_content_dirty(&self) -> bool {
        self.root.borrow().is_dirty()
    }

    fn find_focusable_descendant(
        &self,
        position: Vec2,
        direction: Direction,
    ) -> Option<FocusSearchResult> {
        search_children(&self.local_children(), position, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Button, InputState};
    use crate::render::MonospaceFont;
    use crate::view::{dispatch_click, handle, ClickEvent};
    use std::cell::Cell;

    fn editor(overlays: &Rc<OverlayContext>, keybind_type: KeybindType) -> KeybindEditor {
        KeybindEditor::new(Rc::new(MonospaceFont::default()), overlays, ButtonResolver::default())
            .with_keybind_list(KeybindList::of_buttons([Button::F5]))
            .with_keybind_type(keybind_type)
            .with_empty_text("Unbound")
    }

    fn frame(
        input: &mut InputState,
        overlays: &OverlayContext,
        change: impl FnOnce(&mut InputState),
    ) {
        input.begin_frame();
        change(input);
        overlays.handle_input(input);
    }

    fn label_text(editor: &KeybindEditor) -> String {
        editor.shared.borrow().label.borrow().text().to_string()
    }

    #[test]
    fn test_label_shows_list_or_empty_text() {
        let overlays = Rc::new(OverlayContext::new());
        let editor = editor(&overlays, KeybindType::SingleKeybind);
        assert_eq!(label_text(&editor), "F5");
        editor.set_keybind_list(KeybindList::default());
        assert_eq!(label_text(&editor), "Unbound");
    }

    #[test]
    fn test_click_opens_capture_and_commit_closes() {
        let overlays = Rc::new(OverlayContext::new());
        let editor = editor(&overlays, KeybindType::SingleKeybind);
        let changes = Rc::new(Cell::new(0));
        let seen = Rc::clone(&changes);
        editor.on_change(move |_| seen.set(seen.get() + 1));
        let shared = Rc::clone(&editor.shared);
        let view: ViewHandle = handle(editor);
        view.borrow_mut().measure(Vec2::new(200.0, 200.0));

        let mut click = ClickEvent::new(Vec2::new(2.0, 2.0), Button::MouseLeft);
        dispatch_click(&view, &mut click);
        assert!(click.handled);
        assert_eq!(overlays.len(), 1);

        let mut input = InputState::new();
        frame(&mut input, &overlays, |input| input.press(Button::F1));
        assert!(overlays.is_capturing_input());
        assert_eq!(overlays.len(), 1);

        frame(&mut input, &overlays, |input| input.release(Button::F1));
        assert!(overlays.is_empty());
        assert_eq!(changes.get(), 1);
        assert_eq!(shared.borrow().keybind_list.to_string(), "F1");
        assert_eq!(shared.borrow().label.borrow().text(), "F1");
    }

    #[test]
    fn test_cancel_keeps_list() {
        let overlays = Rc::new(OverlayContext::new());
        let editor = editor(&overlays, KeybindType::SingleKeybind);
        let changes = Rc::new(Cell::new(0));
        let seen = Rc::clone(&changes);
        editor.on_change(move |_| seen.set(seen.get() + 1));
        editor.open();

        let mut input = InputState::new();
        frame(&mut input, &overlays, |input| input.press(Button::ControllerB));
        assert!(overlays.is_empty());
        assert!(input.is_suppressed(Button::ControllerB));
        assert_eq!(editor.keybind_list().to_string(), "F5");
        assert_eq!(changes.get(), 0);
    }

    #[test]
    fn test_multiple_keybinds_stay_open_until_cancel() {
        let overlays = Rc::new(OverlayContext::new());
        let editor = editor(&overlays, KeybindType::MultipleKeybinds);
        editor.open();

        let mut input = InputState::new();
        frame(&mut input, &overlays, |input| input.press(Button::LeftControl));
        frame(&mut input, &overlays, |input| input.press(Button::S));
        frame(&mut input, &overlays, |input| {
            input.release(Button::S);
            input.release(Button::LeftControl);
        });
        assert_eq!(overlays.len(), 1);
        assert_eq!(editor.keybind_list().to_string(), "F5, LeftControl + S");

        frame(&mut input, &overlays, |input| input.press(Button::Escape));
        assert!(overlays.is_empty());
    }

    #[test]
    fn test_dropped_overlay_stack_is_ignored() {
        let overlays = Rc::new(OverlayContext::new());
        let editor = editor(&overlays, KeybindType::SingleButton);
        drop(overlays);
        editor.open();
        assert_eq!(editor.keybind_list().to_string(), "F5");
    }
}
