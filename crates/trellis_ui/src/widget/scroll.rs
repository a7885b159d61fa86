//! Scrollable viewport over a single child.

use std::rc::Rc;

use tracing::trace;
use trellis_core::{Bounds, Direction, LayoutParameters, Orientation, Vec2};

use crate::render::SpriteBatch;
use crate::view::{
    path_to_view, FocusSearchResult, RoutedEvent, View, ViewChild, ViewHandle, ViewState,
    WheelEvent,
};

/// Default distance moved by one wheel notch.
pub const DEFAULT_SCROLL_STEP: f32 = 32.0;

/// Shows a window onto content that is longer than the container along one axis.
///
/// ```text
///        ┌ content ┐
///        │         │ ▲ scroll_offset
///      ┌─┼─────────┼─┐
///      │ │ visible │ │  viewport = content size of the container
///      └─┼─────────┼─┘
///        │         │
///        └─────────┘
/// ```
///
/// Drawing and hit-testing are clipped to the viewport.
#[derive(Debug)]
pub struct ScrollContainer {
    state: ViewState,
    orientation: Orientation,
    content: Option<ViewHandle>,
    scroll_offset: f32,
    scroll_step: f32,
    peeking: f32,
    content_length: f32,
    content_dirty: bool,
}

impl ScrollContainer {
    /// Creates an empty container scrolling along `orientation`.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            state: ViewState::new("ScrollContainer"),
            orientation,
            content: None,
            scroll_offset: 0.0,
            scroll_step: DEFAULT_SCROLL_STEP,
            peeking: 0.0,
            content_length: 0.0,
            content_dirty: true,
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.state.set_layout(layout);
        self
    }

    /// Sets the content view.
    #[must_use]
    pub fn with_content(mut self, content: ViewHandle) -> Self {
        self.set_content(Some(content));
        self
    }

    /// The scrolled view.
    #[must_use]
    pub fn content(&self) -> Option<&ViewHandle> {
        self.content.as_ref()
    }

    /// Replaces the scrolled view.
    pub fn set_content(&mut self, content: Option<ViewHandle>) {
        self.content = content;
        self.content_dirty = true;
    }

    /// Scroll axis.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Distance scrolled from the start, in `[0, scroll_size]`.
    #[must_use]
    pub const fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    /// Maximum scroll offset.
    #[must_use]
    pub fn scroll_size(&self) -> f32 {
        (self.content_length - self.orientation.get(self.state.content_size())).max(0.0)
    }

    /// Distance moved by one step.
    #[must_use]
    pub const fn scroll_step(&self) -> f32 {
        self.scroll_step
    }

    /// Changes the step distance.
    pub fn set_scroll_step(&mut self, step: f32) {
        self.scroll_step = step;
    }

    /// Extra space kept visible around a view scrolled into view.
    pub fn set_peeking(&mut self, peeking: f32) {
        self.peeking = peeking;
    }

    /// Moves to `offset`, clamped. Returns `true` if the offset changed.
    pub fn set_scroll_offset(&mut self, offset: f32) -> bool {
        let clamped = offset.clamp(0.0, self.scroll_size());
        if (clamped - self.scroll_offset).abs() <= f32::EPSILON {
            return false;
        }
        self.scroll_offset = clamped;
        true
    }

    /// Scrolls by `distance`, clamped. Returns `true` if the offset changed.
    pub fn scroll_by(&mut self, distance: f32) -> bool {
        self.set_scroll_offset(self.scroll_offset + distance)
    }

    /// Scrolls one step toward the end.
    pub fn scroll_forward(&mut self) -> bool {
        self.scroll_by(self.scroll_step)
    }

    /// Scrolls one step toward the start.
    pub fn scroll_backward(&mut self) -> bool {
        self.scroll_by(-self.scroll_step)
    }

    /// Scrolls so that `view`, anywhere under the content, is fully visible.
    ///
    /// Returns `true` if the offset changed; `false` also when `view` is not part
    /// of the content.
    pub fn scroll_to_view(&mut self, view: &ViewHandle) -> bool {
        let Some(content) = self.children().into_iter().next() else {
            return false;
        };
        let Some(path) = path_to_view(&content.view, view) else {
            return false;
        };
        let origin = path.iter().fold(content.position, |origin, child| origin + child.position);
        let size = view.borrow().outer_size();
        self.scroll_into_view(Bounds::from_pos_size(origin, size)) != Vec2::ZERO
    }

    fn scroll_origin(&self) -> Vec2 {
        self.orientation.vec(self.scroll_offset, 0.0)
    }

    fn viewport_inset(&self) -> Vec2 {
        self.state.margin().top_left() + self.state.padding().top_left()
    }
}

impl View for ScrollContainer {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let orientation = self.orientation;
        let container_limits = layout.limits(available);
        let mut content_limits = container_limits;
        orientation.set(&mut content_limits, f32::INFINITY);

        let content_outer = self.content.as_ref().map_or(Vec2::ZERO, |content| {
            let mut content = content.borrow_mut();
            content.measure(content_limits);
            content.outer_size()
        });
        self.content_length = orientation.get(content_outer);

        let mut viewport = layout.resolve(available, content_outer);
        let max_length = orientation.get(container_limits);
        if max_length.is_finite() {
            orientation.set(&mut viewport, max_length);
        }
        let viewport = layout.resolve(available, viewport);

        let max_offset = (self.content_length - orientation.get(viewport)).max(0.0);
        self.scroll_offset = self.scroll_offset.clamp(0.0, max_offset);
        viewport
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        let Some(content) = &self.content else {
            return;
        };
        let mut clip = batch.clip(Bounds::from_pos_size(Vec2::ZERO, self.state.content_size()));
        clip.translate(-self.scroll_origin());
        content.borrow().draw(&mut *clip);
    }

    fn local_children(&self) -> Vec<ViewChild> {
        self.content
            .iter()
            .map(|content| ViewChild::new(Rc::clone(content), Vec2::ZERO))
            .collect()
    }

    fn children_at(&self, position: Vec2) -> Vec<ViewChild> {
        let viewport = Bounds::from_pos_size(self.viewport_inset(), self.state.content_size());
        if !viewport.contains(position) {
            return Vec::new();
        }
        let offset = self.content_offset();
        self.local_children()
            .into_iter()
            .filter(|child| {
                child.view.borrow().state().is_visible() && child.contains_point(position - offset)
            })
            .map(|child| child.offset(offset))
            .collect()
    }

    fn is_content_dirty(&self) -> bool {
        self.content_dirty
            || self.content.as_ref().is_some_and(|content| content.borrow().is_dirty())
    }

    fn reset_content_dirty(&mut self) {
        self.content_dirty = false;
    }

    fn find_focusable_descendant(
        &self,
        position: Vec2,
        direction: Direction,
    ) -> Option<FocusSearchResult> {
        let content = self.content.as_ref()?;
        ViewChild::new(Rc::clone(content), Vec2::ZERO).focus_search(position, direction)
    }

    fn layout_offset(&self) -> Vec2 {
        -self.scroll_origin()
    }

    fn on_wheel(&mut self, event: &mut WheelEvent) {
        if event.direction.orientation() != self.orientation {
            return;
        }
        let scrolled = if event.direction.is_backward() {
            self.scroll_backward()
        } else {
            self.scroll_forward()
        };
        if scrolled {
            trace!("'{}' scrolled to {}", self.state.name(), self.scroll_offset);
            event.set_handled(true);
        }
    }

    fn scroll_into_view(&mut self, target: Bounds) -> Vec2 {
        let orientation = self.orientation;
        let inset = orientation.get(self.viewport_inset());
        let viewport_length = orientation.get(self.state.content_size());
        let start = orientation.get(target.position()) - inset;
        let end = start + orientation.get(target.size());

        let distance = if start < self.peeking {
            start - self.peeking
        } else if end > viewport_length - self.peeking {
            end - viewport_length + self.peeking
        } else {
            0.0
        };
        let previous = self.scroll_offset;
        if !self.scroll_by(distance) {
            return Vec2::ZERO;
        }
        orientation.vec(previous - self.scroll_offset, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderCommand, UiRenderer};
    use crate::view::{dispatch_wheel, handle, path_to_position, scroll_into_view};
    use crate::widget::{Lane, Spacer};
    use trellis_core::Length;

    fn rows(count: usize) -> Vec<ViewHandle> {
        (0..count)
            .map(|_| {
                let mut row = Spacer::new(LayoutParameters::fixed_size(50.0, 20.0));
                row.state_mut().set_focusable(true);
                handle(row)
            })
            .collect()
    }

    fn scroller(children: Vec<ViewHandle>) -> ScrollContainer {
        ScrollContainer::new(Orientation::Vertical)
            .with_layout(LayoutParameters::new(Length::Px(50.0), Length::Px(50.0)))
            .with_content(handle(Lane::new(Orientation::Vertical).with_children(children)))
    }

    #[test]
    fn test_offset_clamped_to_scroll_size() {
        let mut scroll = scroller(rows(5));
        scroll.measure(Vec2::new(200.0, 200.0));
        assert_eq!(scroll.scroll_size(), 50.0);

        assert!(scroll.scroll_by(30.0));
        assert_eq!(scroll.scroll_offset(), 30.0);
        assert!(scroll.scroll_by(100.0));
        assert_eq!(scroll.scroll_offset(), 50.0);
        assert!(!scroll.scroll_forward());
        assert!(scroll.set_scroll_offset(-10.0));
        assert_eq!(scroll.scroll_offset(), 0.0);
    }

    #[test]
    fn test_short_content_does_not_scroll() {
        let mut scroll = scroller(rows(1));
        scroll.measure(Vec2::new(200.0, 200.0));
        assert_eq!(scroll.scroll_size(), 0.0);
        assert!(!scroll.scroll_forward());
    }

    #[test]
    fn test_draw_clips_and_offsets_content() {
        let mut scroll = scroller(rows(5));
        scroll.measure(Vec2::new(200.0, 200.0));
        scroll.scroll_by(25.0);

        let mut renderer = UiRenderer::new();
        scroll.draw(&mut renderer);
        assert_eq!(
            renderer.commands().first(),
            Some(&RenderCommand::PushClip {
                bounds: Bounds::new(0.0, 0.0, 50.0, 50.0)
            })
        );
        assert_eq!(renderer.commands().last(), Some(&RenderCommand::PopClip));
        assert_eq!(renderer.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_hit_testing_follows_scroll_and_clip() {
        let children = rows(5);
        let third = Rc::clone(&children[2]);
        let scroll = handle(scroller(children));
        scroll.borrow_mut().measure(Vec2::new(200.0, 200.0));
        assert!(scroll.borrow().children_at(Vec2::new(10.0, 60.0)).is_empty());

        let mut wheel = WheelEvent::new(Vec2::new(10.0, 10.0), Direction::South);
        dispatch_wheel(&scroll, &mut wheel);
        assert!(wheel.is_handled());
        assert_eq!(wheel.position, Vec2::new(10.0, 10.0));

        // Scrolled by one step, so y = 10 now lands 42 into the content.
        let path = path_to_position(&scroll, Vec2::new(10.0, 10.0));
        assert!(crate::view::same_view(&path.last().unwrap().view, &third));
    }

    #[test]
    fn test_scroll_into_view_moves_target() {
        let children = rows(5);
        let last = Rc::clone(&children[4]);
        let scroll = handle(scroller(children));
        scroll.borrow_mut().measure(Vec2::new(200.0, 200.0));

        let mut result =
            crate::view::focus_search(&scroll, Vec2::new(10.0, 10.0), Direction::South).unwrap();
        // Walk to the last row, which starts below the viewport.
        for _ in 0..3 {
            let position = result.target.center();
            result = crate::view::focus_search(&scroll, position, Direction::South).unwrap();
        }
        assert!(crate::view::same_view(&result.target.view, &last));
        assert_eq!(result.target.position, Vec2::new(0.0, 80.0));

        let moved = scroll_into_view(&mut result);
        assert_eq!(moved, Vec2::new(0.0, -50.0));
        assert_eq!(result.target.position, Vec2::new(0.0, 30.0));
        assert_eq!(scroll.borrow().children()[0].position, Vec2::new(0.0, -50.0));
    }

    #[test]
    fn test_scroll_to_view_reveals_descendant() {
        let children = rows(5);
        let last = Rc::clone(&children[4]);
        let mut scroll = scroller(children);
        scroll.measure(Vec2::new(200.0, 200.0));

        assert!(scroll.scroll_to_view(&last));
        assert_eq!(scroll.scroll_offset(), 50.0);
        assert!(!scroll.scroll_to_view(&last));

        let stranger = handle(Spacer::new(LayoutParameters::fixed_size(5.0, 5.0)));
        assert!(!scroll.scroll_to_view(&stranger));
    }
}
