//! The per-frame driver.
//!
//! A [`Ui`] owns one root view and everything the host would otherwise keep in
//! globals: the overlay stack, the animation registry and the keyboard capture
//! slot. The host calls it once per frame:
//!
//! ```text
//!   host frame
//!   ├─ ui.update(elapsed, &mut input)   overlays capture input, views and animators tick
//!   ├─ ui.click / wheel / pointer_move  front overlay first, then the root
//!   └─ ui.draw(&mut batch, dim)         measure root, draw root, place and draw overlays
//! ```
//!
//! All positions passed in or returned are viewport coordinates.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::trace;
use trellis_core::{Bounds, Direction, Vec2};

use crate::animation::{AnimationRunner, HoverScale};
use crate::config::UiConfig;
use crate::input::{ActionState, Button, ButtonResolver, CaptureSlot, InputSource};
use crate::overlay::{Overlay, OverlayContext};
use crate::render::{SpriteBatch, Texture};
use crate::view::{
    dispatch_button, dispatch_click, dispatch_pointer_move, dispatch_wheel, focus_search,
    path_to_position, scroll_into_view, ButtonEvent, ClickEvent, FocusSearchResult,
    PointerMoveEvent, RoutedEvent, ViewChild, ViewHandle, WheelEvent,
};
use crate::widget::Image;

/// Root view, overlays, animations and capture for one UI surface.
pub struct Ui {
    root: ViewHandle,
    viewport: Bounds,
    config: UiConfig,
    overlays: Rc<OverlayContext>,
    animations: Rc<AnimationRunner>,
    capture: CaptureSlot,
}

impl Ui {
    /// Creates a driver for `root` filling `viewport`.
    #[must_use]
    pub fn new(root: ViewHandle, viewport: Bounds, config: UiConfig) -> Self {
        Self {
            root,
            viewport,
            config,
            overlays: Rc::new(OverlayContext::new()),
            animations: Rc::new(AnimationRunner::new()),
            capture: CaptureSlot::new(),
        }
    }

    /// The root view.
    #[must_use]
    pub const fn root(&self) -> &ViewHandle {
        &self.root
    }

    /// Replaces the root view. Capture is released.
    pub fn set_root(&mut self, root: ViewHandle) {
        self.capture.release();
        self.root = root;
    }

    /// The area the root fills.
    #[must_use]
    pub const fn viewport(&self) -> Bounds {
        self.viewport
    }

    /// Resizes the area the root fills; takes effect on the next draw.
    pub fn set_viewport(&mut self, viewport: Bounds) {
        self.viewport = viewport;
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &UiConfig {
        &self.config
    }

    /// The overlay stack, shareable with widgets that open overlays.
    #[must_use]
    pub const fn overlays(&self) -> &Rc<OverlayContext> {
        &self.overlays
    }

    /// The animation registry, shareable with widgets that animate.
    #[must_use]
    pub const fn animations(&self) -> &Rc<AnimationRunner> {
        &self.animations
    }

    /// The keyboard capture slot.
    #[must_use]
    pub const fn capture(&self) -> &CaptureSlot {
        &self.capture
    }

    /// Mutable access to the keyboard capture slot.
    pub fn capture_mut(&mut self) -> &mut CaptureSlot {
        &mut self.capture
    }

    /// Resolver over the configured buttons.
    #[must_use]
    pub fn resolver(&self) -> ButtonResolver {
        self.config.resolver()
    }

    /// An empty action state using the configured repeat and suppression defaults.
    #[must_use]
    pub fn action_state<T: Clone + PartialEq>(&self) -> ActionState<T> {
        ActionState::with_defaults(self.config.action_repeat(), self.config.input.suppress)
    }

    /// An overlay for `view` using the configured alignment and dimming.
    #[must_use]
    pub fn overlay(&self, view: ViewHandle) -> Overlay {
        let defaults = &self.config.overlay;
        Overlay::new(view)
            .with_alignment(defaults.horizontal_alignment, defaults.vertical_alignment)
            .with_dimming(defaults.dimming)
    }

    /// Attaches the configured hover scaling to `image`.
    pub fn hover_scale(&self, image: &Rc<RefCell<Image>>) -> HoverScale {
        let animation = &self.config.animation;
        HoverScale::attach(
            &self.animations,
            image,
            animation.hover_scale,
            self.config.hover_duration(),
            animation.hover_easing,
        )
    }

    /// `true` if an overlay claimed the last frame's input.
    #[must_use]
    pub fn is_capturing_input(&self) -> bool {
        self.overlays.is_capturing_input()
    }

    /// Advances one frame: overlay input, then view updates, then animations.
    pub fn update(&mut self, elapsed: Duration, input: &mut dyn InputSource) {
        self.overlays.handle_input(input);
        self.overlays.update(elapsed);
        crate::view::update_tree(&self.root, elapsed);
        self.animations.tick(elapsed);
    }

    /// Lays out and draws the root and every overlay.
    ///
    /// `dim_texture` is stretched over the viewport behind dimmed overlays; any
    /// opaque white texture works.
    pub fn draw(&self, batch: &mut dyn SpriteBatch, dim_texture: Texture) {
        let origin = self.viewport.position();
        self.root.borrow_mut().measure(self.viewport.size());
        {
            let mut scope = batch.save_transform();
            scope.translate(origin);
            self.root.borrow().draw(&mut *scope);
        }
        let root = ViewChild::new(Rc::clone(&self.root), origin);
        self.overlays.layout(&root, self.viewport);
        self.overlays.draw(batch, dim_texture, self.viewport);
    }

    /// Routes a click. Returns `true` if something handled it.
    ///
    /// With an overlay open, the click belongs to the front overlay, and a click
    /// outside it closes it. Otherwise capture is released unless the click landed
    /// on the capturing view or one of its ancestors, and the click is dispatched
    /// into the root.
    pub fn click(&mut self, position: Vec2, button: Button) -> bool {
        let mut event = ClickEvent::new(position, button);
        if self.overlays.handle_click(&mut event) {
            return event.is_handled();
        }
        let mut event = event.offset(-self.viewport.position());
        let path = path_to_position(&self.root, event.position);
        if self.capture.release_unless_on_path(&path) {
            trace!("capture released by click outside its view");
        }
        dispatch_click(&self.root, &mut event);
        event.is_handled()
    }

    /// Routes a button press at `position`. Returns `true` if something handled it.
    pub fn button(&mut self, position: Vec2, button: Button) -> bool {
        let (view, origin) = self.input_target(position);
        let mut event = ButtonEvent::new(position - origin, button);
        dispatch_button(&view, &mut event);
        event.is_handled()
    }

    /// Routes wheel movement. Returns `true` if something handled it.
    pub fn wheel(&mut self, position: Vec2, direction: Direction) -> bool {
        let (view, origin) = self.input_target(position);
        let mut event = WheelEvent::new(position - origin, direction);
        dispatch_wheel(&view, &mut event);
        event.is_handled()
    }

    /// Routes pointer movement, raising enter and leave events.
    pub fn pointer_move(&mut self, previous: Vec2, current: Vec2) {
        let (view, origin) = match self.overlays.front() {
            Some(front) => {
                let front = front.borrow();
                (Rc::clone(front.view()), front.position())
            }
            None => (Rc::clone(&self.root), self.viewport.position()),
        };
        let mut event = PointerMoveEvent::new(previous - origin, current - origin);
        dispatch_pointer_move(&view, &mut event);
    }

    /// Finds the next focusable view from `position` toward `direction`.
    ///
    /// Searches the front overlay if one is open, else the root. Scroll containers
    /// on the way are scrolled so the target is visible, and the result is in
    /// viewport coordinates.
    pub fn focus_search(
        &mut self,
        position: Vec2,
        direction: Direction,
    ) -> Option<FocusSearchResult> {
        let (view, origin) = match self.overlays.front() {
            Some(front) => {
                let front = front.borrow();
                (Rc::clone(front.view()), front.position())
            }
            None => (Rc::clone(&self.root), self.viewport.position()),
        };
        let mut result = focus_search(&view, position - origin, direction)?;
        scroll_into_view(&mut result);
        Some(result.offset(origin))
    }

    /// Front overlay if the position is inside it, otherwise the root.
    fn input_target(&self, position: Vec2) -> (ViewHandle, Vec2) {
        if let Some(front) = self.overlays.front() {
            let front = front.borrow();
            if front.contains_point(position) {
                return (Rc::clone(front.view()), front.position());
            }
        }
        (Rc::clone(&self.root), self.viewport.position())
    }
}

impl fmt::Debug for Ui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ui")
            .field("viewport", &self.viewport)
            .field("overlays", &self.overlays)
            .field("animations", &self.animations.len())
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}
