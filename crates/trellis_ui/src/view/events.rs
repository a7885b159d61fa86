//! Routed pointer and button events, and the observer lists that receive them.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::{Direction, Vec2};

use crate::input::Button;

/// An event delivered down the view tree with a view-relative position.
pub trait RoutedEvent: Clone {
    /// Position relative to the view currently receiving the event.
    fn position(&self) -> Vec2;

    /// A copy of this event moved by `distance`, with the handled flag cleared.
    #[must_use]
    fn offset(&self, distance: Vec2) -> Self;

    /// `true` once some view has consumed the event.
    fn is_handled(&self) -> bool;

    /// Marks the event as consumed (or not).
    fn set_handled(&mut self, handled: bool);
}

macro_rules! positioned_event {
    ($name:ident) => {
        impl RoutedEvent for $name {
            fn position(&self) -> Vec2 {
                self.position
            }

            fn offset(&self, distance: Vec2) -> Self {
                let mut moved = self.clone();
                moved.position += distance;
                moved.handled = false;
                moved
            }

            fn is_handled(&self) -> bool {
                self.handled
            }

            fn set_handled(&mut self, handled: bool) {
                self.handled = handled;
            }
        }
    };
}

/// Pointer entered or left a view.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Pointer position.
    pub position: Vec2,
    /// Consumed flag.
    pub handled: bool,
}

impl PointerEvent {
    /// Creates an unhandled event.
    #[must_use]
    pub const fn new(position: Vec2) -> Self {
        Self { position, handled: false }
    }
}

positioned_event!(PointerEvent);

/// A mouse or controller click.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickEvent {
    /// Click position.
    pub position: Vec2,
    /// Button that produced the click.
    pub button: Button,
    /// Consumed flag.
    pub handled: bool,
}

impl ClickEvent {
    /// Creates an unhandled click.
    #[must_use]
    pub const fn new(position: Vec2, button: Button) -> Self {
        Self {
            position,
            button,
            handled: false,
        }
    }

    /// Left mouse button or controller A.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        matches!(self.button, Button::MouseLeft | Button::ControllerA)
    }

    /// Right mouse button or controller X.
    #[must_use]
    pub fn is_secondary(&self) -> bool {
        matches!(self.button, Button::MouseRight | Button::ControllerX)
    }
}

positioned_event!(ClickEvent);

/// Scroll wheel movement.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelEvent {
    /// Pointer position.
    pub position: Vec2,
    /// Scroll direction; `North` scrolls content up.
    pub direction: Direction,
    /// Consumed flag.
    pub handled: bool,
}

impl WheelEvent {
    /// Creates an unhandled wheel event.
    #[must_use]
    pub const fn new(position: Vec2, direction: Direction) -> Self {
        Self {
            position,
            direction,
            handled: false,
        }
    }
}

positioned_event!(WheelEvent);

/// A button pressed while the pointer (or focus cursor) is over a view.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonEvent {
    /// Pointer or cursor position.
    pub position: Vec2,
    /// The pressed button.
    pub button: Button,
    /// Consumed flag.
    pub handled: bool,
}

impl ButtonEvent {
    /// Creates an unhandled button event.
    #[must_use]
    pub const fn new(position: Vec2, button: Button) -> Self {
        Self {
            position,
            button,
            handled: false,
        }
    }
}

positioned_event!(ButtonEvent);

/// Pointer moved between two positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerMoveEvent {
    /// Position on the previous frame.
    pub previous_position: Vec2,
    /// Current position.
    pub position: Vec2,
    /// Consumed flag.
    pub handled: bool,
}

impl PointerMoveEvent {
    /// Creates an unhandled move event.
    #[must_use]
    pub const fn new(previous_position: Vec2, position: Vec2) -> Self {
        Self {
            previous_position,
            position,
            handled: false,
        }
    }
}

impl RoutedEvent for PointerMoveEvent {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn offset(&self, distance: Vec2) -> Self {
        Self::new(self.previous_position + distance, self.position + distance)
    }

    fn is_handled(&self) -> bool {
        self.handled
    }

    fn set_handled(&mut self, handled: bool) {
        self.handled = handled;
    }
}

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Token returned when subscribing, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Shared event observer.
pub type Handler<E> = Rc<dyn Fn(&mut E)>;

/// Ordered observers for one event kind.
pub struct HandlerList<E> {
    entries: Vec<(HandlerId, Handler<E>)>,
}

impl<E> HandlerList<E> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Appends an observer.
    pub fn add(&mut self, handler: impl Fn(&mut E) + 'static) -> HandlerId {
        let id = HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed));
        self.entries.push((id, Rc::new(handler)));
        id
    }

    /// Removes an observer. Returns `false` if it was not subscribed here.
    pub fn remove(&mut self, id: HandlerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Copies the current observers so they can run without borrowing the view.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Handler<E>> {
        self.entries.iter().map(|(_, handler)| Rc::clone(handler)).collect()
    }

    /// Number of observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for HandlerList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for HandlerList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerList").field("len", &self.entries.len()).finish()
    }
}

/// Every observer list a view carries.
#[derive(Debug, Default)]
pub struct EventHandlers {
    /// Any click.
    pub click: HandlerList<ClickEvent>,
    /// Primary-button clicks, after `click`.
    pub left_click: HandlerList<ClickEvent>,
    /// Secondary-button clicks, after `click`.
    pub right_click: HandlerList<ClickEvent>,
    /// Button presses.
    pub button_press: HandlerList<ButtonEvent>,
    /// Wheel movement.
    pub wheel: HandlerList<WheelEvent>,
    /// Pointer entered the view's bounds.
    pub pointer_enter: HandlerList<PointerEvent>,
    /// Pointer left the view's bounds.
    pub pointer_leave: HandlerList<PointerEvent>,
}

/// Runs observers in subscription order.
pub(crate) fn invoke<E: RoutedEvent>(handlers: &[Handler<E>], event: &mut E) {
    for handler in handlers {
        handler(event);
    }
}
