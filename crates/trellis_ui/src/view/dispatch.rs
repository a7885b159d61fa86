//! Pointer and button event routing.
//!
//! Events travel from the root toward the deepest hit view. At each level the
//! front-most hit child (highest z-index) with pointer events enabled gets the event
//! first, re-offset into its own coordinates; the view's own observers run only if no
//! descendant handled it. Every view borrow is released before observers run, so an
//! observer may freely mutate any view, including the one it is attached to.

use super::events::{
    invoke, ButtonEvent, ClickEvent, PointerEvent, PointerMoveEvent, RoutedEvent, WheelEvent,
};
use super::{same_view, ViewChild, ViewHandle};

/// Offers `event` to hit children in z order until one handles it.
///
/// Returns `false` if the view itself is hidden or missed, and should not see the event.
fn route_to_children<E: RoutedEvent>(
    view: &ViewHandle,
    event: &mut E,
    dispatch: fn(&ViewHandle, &mut E),
) -> bool {
    let children = {
        let node = view.borrow();
        if !node.state().is_visible() || !node.contains_point(event.position()) {
            return false;
        }
        node.children_at(event.position())
    };
    for child in children {
        if !child.view.borrow().state().pointer_events_enabled() {
            continue;
        }
        if offer(&child, event, dispatch) {
            break;
        }
    }
    true
}

fn offer<E: RoutedEvent>(
    child: &ViewChild,
    event: &mut E,
    dispatch: fn(&ViewHandle, &mut E),
) -> bool {
    let mut child_event = event.offset(-child.position);
    dispatch(&child.view, &mut child_event);
    if child_event.is_handled() {
        event.set_handled(true);
    }
    event.is_handled()
}

/// Routes a click.
///
/// Observer order on the handling view: `click`, then `left_click` or `right_click`.
pub fn dispatch_click(view: &ViewHandle, event: &mut ClickEvent) {
    if !route_to_children(view, event, dispatch_click) || event.is_handled() {
        return;
    }
    let (click, side) = {
        let node = view.borrow();
        let handlers = node.state().handlers();
        let side = if event.is_primary() {
            handlers.left_click.snapshot()
        } else if event.is_secondary() {
            handlers.right_click.snapshot()
        } else {
            Vec::new()
        };
        (handlers.click.snapshot(), side)
    };
    invoke(&click, event);
    invoke(&side, event);
}

/// Routes a button press.
pub fn dispatch_button(view: &ViewHandle, event: &mut ButtonEvent) {
    if !route_to_children(view, event, dispatch_button) || event.is_handled() {
        return;
    }
    let handlers = view.borrow().state().handlers().button_press.snapshot();
    invoke(&handlers, event);
}

/// Routes wheel movement.
///
/// If observers leave the event unhandled, the view's built-in
/// [`on_wheel`](super::View::on_wheel) behavior runs.
pub fn dispatch_wheel(view: &ViewHandle, event: &mut WheelEvent) {
    if !route_to_children(view, event, dispatch_wheel) || event.is_handled() {
        return;
    }
    let handlers = view.borrow().state().handlers().wheel.snapshot();
    invoke(&handlers, event);
    if !event.is_handled() {
        view.borrow_mut().on_wheel(event);
    }
}

/// Routes pointer movement, raising enter/leave on views whose bounds were crossed.
///
/// The child under the previous position hears about the move first, so it can
/// raise its leave before the new child raises its enter.
pub fn dispatch_pointer_move(view: &ViewHandle, event: &mut PointerMoveEvent) {
    let (previous_target, current_target, was_inside, is_inside) = {
        let node = view.borrow();
        if !node.state().is_visible() {
            return;
        }
        let first_enabled = |children: Vec<ViewChild>| {
            children
                .into_iter()
                .find(|child| child.view.borrow().state().pointer_events_enabled())
        };
        (
            first_enabled(node.children_at(event.previous_position)),
            first_enabled(node.children_at(event.position)),
            node.contains_point(event.previous_position),
            node.contains_point(event.position),
        )
    };

    if let Some(previous) = &previous_target {
        let changed = current_target
            .as_ref()
            .map_or(true, |current| !same_view(&current.view, &previous.view));
        if changed && offer(previous, event, dispatch_pointer_move) {
            return;
        }
    }
    if let Some(current) = &current_target {
        if offer(current, event, dispatch_pointer_move) {
            return;
        }
    }

    if is_inside == was_inside {
        return;
    }
    let handlers = {
        let node = view.borrow();
        let handlers = node.state().handlers();
        if is_inside {
            handlers.pointer_enter.snapshot()
        } else {
            handlers.pointer_leave.snapshot()
        }
    };
    let mut pointer = PointerEvent::new(event.position);
    invoke(&handlers, &mut pointer);
    if pointer.is_handled() {
        event.set_handled(true);
    }
}

/// `true` if `view` is one of the views in `path`.
#[must_use]
pub(crate) fn path_contains(path: &[ViewChild], view: &ViewHandle) -> bool {
    path.iter().any(|child| same_view(&child.view, view))
}
