//! Modal overlays drawn above the root view.
//!
//! An [`OverlayContext`] is a stack: the last overlay pushed is the front one and
//! receives clicks and focus. Each overlay is placed by aligning its view against an
//! anchor on its parent view (or the viewport, when it has none):
//!
//! ```text
//!   parent alignment picks the anchor     overlay alignment hangs the view off it
//!
//!   Start        Middle        End        Start: [view]         (anchor at left)
//!     │            │            │         Middle:    [vi│ew]    (centered on anchor)
//!     ▼            ▼            ▼         End:   [view]│        (anchor at right)
//!   ┌─────────── parent ──────────┐
//! ```
//!
//! Overlays are dimmed back to front: every overlay draws its dimming layer over
//! everything behind it before drawing its own view.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{debug, trace};
use trellis_core::{Alignment, Bounds, Vec2};

use crate::input::InputSource;
use crate::render::{SpriteBatch, Texture};
use crate::style::Color;
use crate::view::{
    dispatch_click, path_to_view, update_tree, ClickEvent, RoutedEvent, View, ViewChild, ViewHandle,
};

/// Shared handle to an overlay on a stack.
pub type OverlayHandle = Rc<RefCell<Overlay>>;

/// What an overlay's input handler did with this frame's input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayInput {
    /// Input passes through to the menu below.
    Ignored,
    /// The overlay owns the keyboard and controller this frame.
    Capturing,
    /// The overlay is done and should be removed.
    Close,
}

type InputHandler = Box<dyn FnMut(&mut dyn InputSource) -> OverlayInput>;

/// A view shown above the root, positioned relative to a parent view.
pub struct Overlay {
    view: ViewHandle,
    parent: Option<Weak<RefCell<dyn View>>>,
    horizontal_alignment: Alignment,
    horizontal_parent_alignment: Alignment,
    vertical_alignment: Alignment,
    vertical_parent_alignment: Alignment,
    parent_offset: Vec2,
    dimming: f32,
    capturing_input: bool,
    input_handler: Option<InputHandler>,
    close_handlers: Vec<Rc<dyn Fn()>>,
    position: Vec2,
}

impl Overlay {
    /// Creates an overlay centered in the viewport, without dimming.
    #[must_use]
    pub fn new(view: ViewHandle) -> Self {
        Self {
            view,
            parent: None,
            horizontal_alignment: Alignment::Middle,
            horizontal_parent_alignment: Alignment::Middle,
            vertical_alignment: Alignment::Middle,
            vertical_parent_alignment: Alignment::Middle,
            parent_offset: Vec2::ZERO,
            dimming: 0.0,
            capturing_input: false,
            input_handler: None,
            close_handlers: Vec::new(),
            position: Vec2::ZERO,
        }
    }

    /// Anchors the overlay to `parent` instead of the viewport.
    #[must_use]
    pub fn with_parent(mut self, parent: &ViewHandle) -> Self {
        self.parent = Some(Rc::downgrade(parent));
        self
    }

    /// How the overlay's view hangs off the anchor.
    #[must_use]
    pub fn with_alignment(mut self, horizontal: Alignment, vertical: Alignment) -> Self {
        self.horizontal_alignment = horizontal;
        self.vertical_alignment = vertical;
        self
    }

    /// Where on the parent the anchor sits.
    #[must_use]
    pub fn with_parent_alignment(mut self, horizontal: Alignment, vertical: Alignment) -> Self {
        self.horizontal_parent_alignment = horizontal;
        self.vertical_parent_alignment = vertical;
        self
    }

    /// Extra offset applied after alignment.
    #[must_use]
    pub fn with_parent_offset(mut self, offset: Vec2) -> Self {
        self.parent_offset = offset;
        self
    }

    /// Opacity of the black layer drawn behind the overlay, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_dimming(mut self, dimming: f32) -> Self {
        self.dimming = dimming.clamp(0.0, 1.0);
        self
    }

    /// Receives the frame's input while the overlay is on the stack.
    #[must_use]
    pub fn with_input_handler(
        mut self,
        handler: impl FnMut(&mut dyn InputSource) -> OverlayInput + 'static,
    ) -> Self {
        self.input_handler = Some(Box::new(handler));
        self
    }

    /// Runs `handler` when the overlay is popped or removed.
    #[must_use]
    pub fn on_close(mut self, handler: impl Fn() + 'static) -> Self {
        self.close_handlers.push(Rc::new(handler));
        self
    }

    /// Wraps the overlay in a handle for pushing.
    #[must_use]
    pub fn into_handle(self) -> OverlayHandle {
        Rc::new(RefCell::new(self))
    }

    /// The overlay's content.
    #[must_use]
    pub const fn view(&self) -> &ViewHandle {
        &self.view
    }

    /// The parent view, if set and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<ViewHandle> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Dimming opacity.
    #[must_use]
    pub const fn dimming(&self) -> f32 {
        self.dimming
    }

    /// `true` if the input handler claimed the last frame's input.
    #[must_use]
    pub const fn is_capturing_input(&self) -> bool {
        self.capturing_input
    }

    /// Top-left of the view from the last layout, in viewport coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Drawn area in viewport coordinates.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.view.borrow().actual_bounds().offset(self.position)
    }

    /// `true` if a viewport point lands on the overlay's view.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.view.borrow().contains_point(point - self.position)
    }
}

impl fmt::Debug for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overlay")
            .field("view", &self.view.borrow().state().name())
            .field("position", &self.position)
            .field("dimming", &self.dimming)
            .field("capturing_input", &self.capturing_input)
            .finish_non_exhaustive()
    }
}

/// Position along one axis of a child hung off an anchor on its parent.
#[must_use]
pub fn resolve_alignment(
    parent_alignment: Alignment,
    parent_start: f32,
    parent_end: f32,
    child_alignment: Alignment,
    child_length: f32,
) -> f32 {
    let anchor = match parent_alignment {
        Alignment::Start => parent_start,
        Alignment::Middle => parent_start + (parent_end - parent_start) / 2.0,
        Alignment::End => parent_end,
    };
    match child_alignment {
        Alignment::Start => anchor,
        Alignment::Middle => anchor - child_length / 2.0,
        Alignment::End => anchor - child_length,
    }
}

/// The overlay stack.
///
/// Methods take `&self` so views can push overlays from event handlers; no borrow
/// of the stack is held while handlers or view updates run.
#[derive(Default)]
pub struct OverlayContext {
    stack: RefCell<Vec<OverlayHandle>>,
    pushed: RefCell<Vec<Rc<dyn Fn(&OverlayHandle)>>>,
}

impl OverlayContext {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `overlay` to the front, moving it there if it was already on the stack.
    pub fn push(&self, overlay: OverlayHandle) {
        {
            let mut stack = self.stack.borrow_mut();
            stack.retain(|existing| !Rc::ptr_eq(existing, &overlay));
            stack.push(Rc::clone(&overlay));
            debug!(depth = stack.len(), "overlay pushed");
        }
        let pushed = self.pushed.borrow().clone();
        for handler in &pushed {
            handler(&overlay);
        }
    }

    /// Removes and returns the front overlay.
    pub fn pop(&self) -> Option<OverlayHandle> {
        let overlay = self.stack.borrow_mut().pop()?;
        debug!(depth = self.len(), "overlay popped");
        notify_closed(&overlay);
        Some(overlay)
    }

    /// Removes `overlay` wherever it is. Returns `false` if it was not on the stack.
    pub fn remove(&self, overlay: &OverlayHandle) -> bool {
        let removed = {
            let mut stack = self.stack.borrow_mut();
            let before = stack.len();
            stack.retain(|existing| !Rc::ptr_eq(existing, overlay));
            stack.len() != before
        };
        if removed {
            debug!(depth = self.len(), "overlay removed");
            notify_closed(overlay);
        }
        removed
    }

    /// The front overlay.
    #[must_use]
    pub fn front(&self) -> Option<OverlayHandle> {
        self.stack.borrow().last().cloned()
    }

    /// Number of overlays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.borrow().len()
    }

    /// `true` if no overlay is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    /// Snapshot of the stack, back first.
    #[must_use]
    pub fn back_to_front(&self) -> Vec<OverlayHandle> {
        self.stack.borrow().clone()
    }

    /// Snapshot of the stack, front first.
    #[must_use]
    pub fn front_to_back(&self) -> Vec<OverlayHandle> {
        self.stack.borrow().iter().rev().cloned().collect()
    }

    /// Runs `handler` after every push.
    pub fn on_pushed(&self, handler: impl Fn(&OverlayHandle) + 'static) {
        self.pushed.borrow_mut().push(Rc::new(handler));
    }

    /// Updates every overlay's view tree, front to back.
    pub fn update(&self, elapsed: Duration) {
        for overlay in self.front_to_back() {
            let view = Rc::clone(overlay.borrow().view());
            update_tree(&view, elapsed);
        }
    }

    /// Offers the frame's input to every overlay's handler, front to back.
    ///
    /// Overlays whose handler asks to close are removed after the pass.
    pub fn handle_input(&self, input: &mut dyn InputSource) {
        let mut closing = Vec::new();
        for overlay in self.front_to_back() {
            let Some(mut handler) = overlay.borrow_mut().input_handler.take() else {
                continue;
            };
            let outcome = handler(input);
            let mut entry = overlay.borrow_mut();
            entry.input_handler = Some(handler);
            entry.capturing_input = outcome == OverlayInput::Capturing;
            drop(entry);
            if outcome == OverlayInput::Close {
                closing.push(overlay);
            }
        }
        for overlay in &closing {
            self.remove(overlay);
        }
    }

    /// `true` if any overlay claimed the last frame's input.
    #[must_use]
    pub fn is_capturing_input(&self) -> bool {
        self.stack.borrow().iter().any(|overlay| overlay.borrow().is_capturing_input())
    }

    /// Measures and positions every overlay.
    ///
    /// Parents are looked up under `root` on every call, so an overlay follows its
    /// parent when the tree is re-laid out. An overlay whose parent is gone or not
    /// under `root` is placed against the viewport.
    pub fn layout(&self, root: &ViewChild, viewport: Bounds) {
        for overlay in self.back_to_front() {
            layout_overlay(&overlay, root, viewport);
        }
    }

    /// Draws every overlay back to front, each above its own dimming layer.
    pub fn draw(&self, batch: &mut dyn SpriteBatch, dim_texture: Texture, viewport: Bounds) {
        for overlay in self.back_to_front() {
            let overlay = overlay.borrow();
            if overlay.dimming > 0.0 {
                let tint = Color::BLACK.with_alpha(overlay.dimming);
                batch.draw_rect(dim_texture, viewport, None, tint);
            }
            let mut scope = batch.save_transform();
            scope.translate(overlay.position);
            overlay.view.borrow().draw(&mut *scope);
        }
    }

    /// Routes a viewport click to the front overlay.
    ///
    /// A click outside the front overlay pops it. Returns `false` when no overlay
    /// is open, meaning the click belongs to the root.
    pub fn handle_click(&self, event: &mut ClickEvent) -> bool {
        let Some(front) = self.front() else {
            return false;
        };
        let (view, position, inside) = {
            let front = front.borrow();
            (Rc::clone(&front.view), front.position, front.contains_point(event.position))
        };
        if inside {
            let mut local = event.offset(-position);
            dispatch_click(&view, &mut local);
            event.set_handled(local.is_handled());
        } else {
            self.pop();
        }
        true
    }
}

impl fmt::Debug for OverlayContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayContext").field("len", &self.len()).finish()
    }
}

fn notify_closed(overlay: &OverlayHandle) {
    let handlers = overlay.borrow().close_handlers.clone();
    for handler in &handlers {
        handler();
    }
}

fn parent_bounds(parent: &ViewHandle, root: &ViewChild) -> Option<Bounds> {
    let path = path_to_view(&root.view, parent)?;
    let origin = path.iter().fold(root.position, |origin, child| origin + child.position);
    let parent = path.last()?;
    let bounds = parent.view.borrow().content_bounds();
    Some(bounds.offset(origin))
}

fn layout_overlay(overlay: &OverlayHandle, root: &ViewChild, viewport: Bounds) {
    let (view, parent) = {
        let overlay = overlay.borrow();
        (Rc::clone(&overlay.view), overlay.parent())
    };
    let anchor = match parent.as_ref().map(|parent| parent_bounds(parent, root)) {
        Some(Some(bounds)) => Some(bounds),
        Some(None) => {
            trace!("overlay parent not under root; using viewport");
            None
        }
        None => None,
    };

    let place = |overlay: &Overlay, size: Vec2| {
        let area = anchor.unwrap_or(viewport);
        let x = resolve_alignment(
            overlay.horizontal_parent_alignment,
            area.x,
            area.right(),
            overlay.horizontal_alignment,
            size.x,
        );
        let y = resolve_alignment(
            overlay.vertical_parent_alignment,
            area.y,
            area.bottom(),
            overlay.vertical_alignment,
            size.y,
        );
        Vec2::new(x, y) + overlay.parent_offset
    };

    let available = if anchor.is_some() {
        let previous = place(&*overlay.borrow(), view.borrow().outer_size());
        (viewport.position() + viewport.size() - previous).max(Vec2::ZERO)
    } else {
        viewport.size()
    };
    view.borrow_mut().measure(available);
    let size = view.borrow().outer_size();
    let position = place(&*overlay.borrow(), size);
    overlay.borrow_mut().position = position;
}
