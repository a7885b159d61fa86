//! The view tree.
//!
//! Every node implements [`View`] and embeds a [`ViewState`]. Containers own their
//! children through [`ViewHandle`]s; nothing points back up the tree, so ancestry is
//! recovered with [`path_to_view`] when it is needed.
//!
//! ```text
//! ┌──────────────────────── outer size ───────────────────────┐
//! │ margin                                                    │
//! │  ┌──────────────────── border size ────────────────────┐  │
//! │  │ border                                              │  │
//! │  │  ┌───────────────── inner size ─────────────────┐   │  │
//! │  │  │ padding                                      │   │  │
//! │  │  │   ┌──────── content size ────────┐           │   │  │
//! │  │  │   │  on_measure / on_draw_content │           │   │  │
//! │  │  │   └──────────────────────────────┘           │   │  │
//! │  │  └──────────────────────────────────────────────┘   │  │
//! │  └─────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod dispatch;
mod events;
mod focus;

pub use dispatch::{dispatch_button, dispatch_click, dispatch_pointer_move, dispatch_wheel};
pub use events::{
    ButtonEvent, ClickEvent, EventHandlers, Handler, HandlerId, HandlerList, PointerEvent,
    PointerMoveEvent, RoutedEvent, WheelEvent,
};
pub use focus::{
    default_focus_child, focus_search, path_to_position, path_to_view, search_children,
    FocusSearchResult,
};

use std::cell::RefCell;
use std::cmp::Reverse;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use trellis_core::{Bounds, Direction, Edges, LayoutParameters, Vec2};

use crate::render::SpriteBatch;
use crate::style::Color;

/// Shared, mutable reference to any view.
pub type ViewHandle = Rc<RefCell<dyn View>>;

/// Wraps a view in a [`ViewHandle`].
pub fn handle<V: View + 'static>(view: V) -> ViewHandle {
    Rc::new(RefCell::new(view))
}

/// `true` if both handles refer to the same view.
#[must_use]
pub fn same_view(a: &ViewHandle, b: &ViewHandle) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl ViewId {
    /// Allocates a fresh identifier.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// View state flags (bitfield for efficiency).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewFlags(u32);

impl ViewFlags {
    /// View can receive focus.
    pub const FOCUSABLE: u32 = 1 << 0;
    /// View and its descendants receive pointer events.
    pub const POINTER_EVENTS: u32 = 1 << 1;
    /// Layout must be recomputed.
    pub const DIRTY: u32 = 1 << 2;

    /// Default flags for a new view.
    pub const DEFAULT: Self = Self(Self::POINTER_EVENTS | Self::DIRTY);

    /// Returns true if the flag is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    /// Sets a flag.
    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    /// Clears a flag.
    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    /// Sets or clears a flag.
    #[inline]
    pub fn assign(&mut self, flag: u32, value: bool) {
        if value {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether a view is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Drawn and hit-tested.
    #[default]
    Visible,
    /// Still takes up space in layout, but is neither drawn nor hit-tested.
    Hidden,
}

/// State common to every view.
#[derive(Debug)]
pub struct ViewState {
    id: ViewId,
    name: String,
    layout: LayoutParameters,
    margin: Edges,
    padding: Edges,
    visibility: Visibility,
    flags: ViewFlags,
    z_index: i32,
    tooltip: String,
    tint: Color,
    content_size: Vec2,
    last_available: Option<Vec2>,
    handlers: EventHandlers,
}

impl ViewState {
    /// Creates state for a content-sized view.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ViewId::next(),
            name: name.into(),
            layout: LayoutParameters::fit_content(),
            margin: Edges::NONE,
            padding: Edges::NONE,
            visibility: Visibility::Visible,
            flags: ViewFlags::DEFAULT,
            z_index: 0,
            tooltip: String::new(),
            tint: Color::WHITE,
            content_size: Vec2::ZERO,
            last_available: None,
            handlers: EventHandlers::default(),
        }
    }

    /// Sets the layout parameters.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the margin.
    #[must_use]
    pub fn with_margin(mut self, margin: Edges) -> Self {
        self.margin = margin;
        self
    }

    /// Sets the padding.
    #[must_use]
    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding = padding;
        self
    }

    /// Makes the view focusable.
    #[must_use]
    pub fn with_focusable(mut self, focusable: bool) -> Self {
        self.flags.assign(ViewFlags::FOCUSABLE, focusable);
        self
    }

    /// Unique identifier.
    #[must_use]
    pub const fn id(&self) -> ViewId {
        self.id
    }

    /// Display name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the view.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Layout parameters.
    #[must_use]
    pub const fn layout(&self) -> &LayoutParameters {
        &self.layout
    }

    /// Changes the layout, marking the view dirty if it differs.
    pub fn set_layout(&mut self, layout: LayoutParameters) {
        if layout != self.layout {
            self.layout = layout;
            self.mark_dirty();
        }
    }

    /// Space outside the border.
    #[must_use]
    pub const fn margin(&self) -> Edges {
        self.margin
    }

    /// Changes the margin, marking the view dirty if it differs.
    pub fn set_margin(&mut self, margin: Edges) {
        if margin != self.margin {
            self.margin = margin;
            self.mark_dirty();
        }
    }

    /// Space between the border and the content.
    #[must_use]
    pub const fn padding(&self) -> Edges {
        self.padding
    }

    /// Changes the padding, marking the view dirty if it differs.
    pub fn set_padding(&mut self, padding: Edges) {
        if padding != self.padding {
            self.padding = padding;
            self.mark_dirty();
        }
    }

    /// Current visibility.
    #[must_use]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// `true` when drawn and hit-tested.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    /// Shows or hides the view. Hidden views keep their layout space.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    /// `true` if the view can hold focus.
    #[must_use]
    pub const fn is_focusable(&self) -> bool {
        self.flags.has(ViewFlags::FOCUSABLE)
    }

    /// Changes whether the view can hold focus.
    pub fn set_focusable(&mut self, focusable: bool) {
        self.flags.assign(ViewFlags::FOCUSABLE, focusable);
    }

    /// `true` if pointer events reach this view and its descendants.
    #[must_use]
    pub const fn pointer_events_enabled(&self) -> bool {
        self.flags.has(ViewFlags::POINTER_EVENTS)
    }

    /// Enables or disables pointer events.
    pub fn set_pointer_events_enabled(&mut self, enabled: bool) {
        self.flags.assign(ViewFlags::POINTER_EVENTS, enabled);
    }

    /// Stacking order among siblings; higher draws later and hit-tests first.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Changes the stacking order.
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    /// Tooltip text; empty for none.
    #[must_use]
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Changes the tooltip.
    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = tooltip.into();
    }

    /// Tint applied to drawn sprites.
    #[must_use]
    pub const fn tint(&self) -> Color {
        self.tint
    }

    /// Changes the tint.
    pub fn set_tint(&mut self, tint: Color) {
        self.tint = tint;
    }

    /// Content size from the last measure.
    #[must_use]
    pub const fn content_size(&self) -> Vec2 {
        self.content_size
    }

    /// Available size passed to the last measure.
    #[must_use]
    pub const fn last_available(&self) -> Option<Vec2> {
        self.last_available
    }

    /// `true` if the layout must be recomputed.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.flags.has(ViewFlags::DIRTY)
    }

    /// Forces the next measure to run.
    pub fn mark_dirty(&mut self) {
        self.flags.set(ViewFlags::DIRTY);
    }

    /// Observer lists.
    #[must_use]
    pub const fn handlers(&self) -> &EventHandlers {
        &self.handlers
    }

    /// Mutable observer lists, for subscribing.
    pub fn handlers_mut(&mut self) -> &mut EventHandlers {
        &mut self.handlers
    }

    fn finish_measure(&mut self, available: Vec2, content_size: Vec2) {
        if !content_size.is_finite() {
            tracing::warn!(
                "View '{}' measured a non-finite content size {:?}",
                self.name,
                content_size
            );
        }
        self.content_size = content_size;
        self.last_available = Some(available);
        self.flags.clear(ViewFlags::DIRTY);
    }
}

/// A child view and its position relative to the parent.
#[derive(Debug, Clone)]
pub struct ViewChild {
    /// The child.
    pub view: ViewHandle,
    /// Position of the child's outer box within the parent.
    pub position: Vec2,
}

impl ViewChild {
    /// Pairs a view with a position.
    #[must_use]
    pub fn new(view: ViewHandle, position: Vec2) -> Self {
        Self { view, position }
    }

    /// The same child moved by `distance`.
    #[must_use]
    pub fn offset(&self, distance: Vec2) -> Self {
        Self::new(Rc::clone(&self.view), self.position + distance)
    }

    /// `true` if a parent-relative point lies within the child.
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.view.borrow().contains_point(point - self.position)
    }

    /// Parent-relative bounds of the child's drawn area.
    #[must_use]
    pub fn actual_bounds(&self) -> Bounds {
        self.view.borrow().actual_bounds().offset(self.position)
    }

    /// Parent-relative center of the child's content.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.view.borrow().content_bounds().center()
    }

    /// Focus search in parent coordinates.
    #[must_use]
    pub fn focus_search(&self, position: Vec2, direction: Direction) -> Option<FocusSearchResult> {
        focus_search(&self.view, position - self.position, direction)
            .map(|result| result.offset(self.position))
    }

    /// `true` if the child is reachable by moving from `origin` toward `direction`.
    #[must_use]
    pub fn is_in_direction(&self, origin: Vec2, direction: Direction) -> bool {
        let relative = origin - self.position;
        let bounds = self.view.borrow().actual_bounds();
        match direction {
            Direction::North => relative.y >= bounds.y,
            Direction::South => relative.y < bounds.bottom(),
            Direction::West => relative.x >= bounds.x,
            Direction::East => relative.x < bounds.right(),
        }
    }
}

impl PartialEq for ViewChild {
    fn eq(&self, other: &Self) -> bool {
        same_view(&self.view, &other.view) && self.position == other.position
    }
}

/// A node in the view tree.
///
/// Implementors provide the `on_*` hooks; the provided methods implement the shared
/// box model, lazy measurement and drawing.
pub trait View {
    /// Shared state.
    fn state(&self) -> &ViewState;

    /// Mutable shared state.
    fn state_mut(&mut self) -> &mut ViewState;

    /// Lays out content within `available` (already reduced by margin, border and
    /// padding) and returns the content size.
    fn on_measure(&mut self, available: Vec2) -> Vec2;

    /// Draws content with the origin at the content box's top-left corner.
    fn on_draw_content(&self, batch: &mut dyn SpriteBatch);

    /// Draws the border with the origin at the border box's top-left corner.
    fn on_draw_border(&self, _batch: &mut dyn SpriteBatch) {}

    /// Thickness of the border drawn by [`on_draw_border`](Self::on_draw_border).
    fn border_thickness(&self) -> Edges {
        Edges::NONE
    }

    /// Children, positioned relative to the content box.
    fn local_children(&self) -> Vec<ViewChild> {
        Vec::new()
    }

    /// `true` if view-specific properties changed, or any child is dirty.
    fn is_content_dirty(&self) -> bool {
        false
    }

    /// Clears view-specific dirty tracking after a measure.
    fn reset_content_dirty(&mut self) {}

    /// Searches descendants for the next focusable view.
    ///
    /// `position` is relative to the content box.
    fn find_focusable_descendant(
        &self,
        _position: Vec2,
        _direction: Direction,
    ) -> Option<FocusSearchResult> {
        None
    }

    /// Per-frame update. Children are updated by [`update_tree`].
    fn on_update(&mut self, _elapsed: Duration) {}

    /// Extra content offset, e.g. a scroll position.
    fn layout_offset(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Built-in wheel behavior, run after observers leave the event unhandled.
    fn on_wheel(&mut self, _event: &mut WheelEvent) {}

    /// Scrolls so that `target`, relative to the outer top-left corner, is visible.
    ///
    /// Returns how far the content moved; zero for views that do not scroll.
    fn scroll_into_view(&mut self, _target: Bounds) -> Vec2 {
        Vec2::ZERO
    }

    /// `true` if any layout-relevant state changed since the last measure.
    fn is_dirty(&self) -> bool {
        self.state().is_dirty() || self.is_content_dirty()
    }

    /// Measures the view against `available` (its outer size limit).
    ///
    /// Returns `false` without doing anything if nothing changed since the last call.
    fn measure(&mut self, available: Vec2) -> bool {
        if !self.is_dirty() && self.state().last_available() == Some(available) {
            return false;
        }
        let state = self.state();
        let adjusted = available
            - state.margin().total()
            - state.padding().total()
            - self.border_thickness().total();
        let content_size = self.on_measure(adjusted.max(Vec2::ZERO));
        self.state_mut().finish_measure(available, content_size);
        self.reset_content_dirty();
        true
    }

    /// Draws the view with the origin at its outer top-left corner.
    fn draw(&self, batch: &mut dyn SpriteBatch) {
        if !self.state().is_visible() {
            return;
        }
        batch.translate(self.state().margin().top_left());
        let mut scope = batch.save_transform();
        self.on_draw_border(&mut *scope);
        let inset = self.border_thickness().top_left() + self.state().padding().top_left();
        scope.translate(inset);
        self.on_draw_content(&mut *scope);
    }

    /// Content plus padding.
    fn inner_size(&self) -> Vec2 {
        self.state().content_size() + self.state().padding().total()
    }

    /// Inner size plus border.
    fn border_size(&self) -> Vec2 {
        self.inner_size() + self.border_thickness().total()
    }

    /// Border size plus margin; the space a parent reserves for this view.
    fn outer_size(&self) -> Vec2 {
        self.border_size() + self.state().margin().total()
    }

    /// Area actually drawn, relative to the outer top-left corner.
    ///
    /// Negative left/top margins move the view without shrinking it; positive margins
    /// are included.
    fn actual_bounds(&self) -> Bounds {
        let margin = self.state().margin();
        let border_size = self.border_size();
        #[allow(clippy::cast_precision_loss)]
        let (left, top, right, bottom) = (
            margin.left as f32,
            margin.top as f32,
            margin.right as f32,
            margin.bottom as f32,
        );
        Bounds::new(
            left.min(0.0),
            top.min(0.0),
            border_size.x + left.max(0.0) + right.max(0.0),
            border_size.y + top.max(0.0) + bottom.max(0.0),
        )
    }

    /// Content box, relative to the outer top-left corner.
    fn content_bounds(&self) -> Bounds {
        let actual = self.actual_bounds();
        let margin = self.state().margin();
        #[allow(clippy::cast_precision_loss)]
        let position =
            actual.position() + Vec2::new(margin.left.max(0) as f32, margin.top.max(0) as f32);
        Bounds::from_pos_size(position, self.state().content_size())
    }

    /// Offset from the outer top-left corner to the content origin.
    fn content_offset(&self) -> Vec2 {
        self.layout_offset()
            + self.state().margin().top_left()
            + self.border_thickness().top_left()
            + self.state().padding().top_left()
    }

    /// Children, positioned relative to the outer top-left corner.
    fn children(&self) -> Vec<ViewChild> {
        let offset = self.content_offset();
        self.local_children().iter().map(|child| child.offset(offset)).collect()
    }

    /// Visible children containing `position`, highest z-index first.
    fn children_at(&self, position: Vec2) -> Vec<ViewChild> {
        let offset = self.content_offset();
        let local = position - offset;
        let mut hits: Vec<ViewChild> = self
            .local_children()
            .into_iter()
            .filter(|child| child.view.borrow().state().is_visible() && child.contains_point(local))
            .collect();
        hits.sort_by_key(|child| Reverse(child.view.borrow().state().z_index()));
        hits.iter().map(|child| child.offset(offset)).collect()
    }

    /// `true` if `point` (relative to the outer top-left corner) is within the view.
    fn contains_point(&self, point: Vec2) -> bool {
        self.actual_bounds().contains(point)
    }
}

impl fmt::Debug for dyn View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("id", &self.state().id())
            .field("name", &self.state().name())
            .finish()
    }
}

/// Draws children in ascending z-index, each under its own saved transform.
pub fn draw_children(children: &[ViewChild], batch: &mut dyn SpriteBatch) {
    let mut ordered: Vec<&ViewChild> = children.iter().collect();
    ordered.sort_by_key(|child| child.view.borrow().state().z_index());
    for child in ordered {
        let mut scope = batch.save_transform();
        scope.translate(child.position);
        child.view.borrow().draw(&mut *scope);
    }
}

/// Scrolls every ancestor on `result`'s path so its target is visible, innermost
/// first, and moves the result's positions to match.
///
/// Returns the total distance the target moved.
pub fn scroll_into_view(result: &mut FocusSearchResult) -> Vec2 {
    let target_size = result.target.view.borrow().outer_size();
    let mut target = Bounds::from_pos_size(result.target.position, target_size);
    let origins: Vec<Vec2> = result
        .path
        .iter()
        .scan(Vec2::ZERO, |origin, child| {
            *origin += child.position;
            Some(*origin)
        })
        .collect();

    let mut total = Vec2::ZERO;
    for index in (0..result.path.len()).rev() {
        let local = target.offset(-origins[index]);
        let moved = result.path[index].view.borrow_mut().scroll_into_view(local);
        if moved == Vec2::ZERO {
            continue;
        }
        target = target.offset(moved);
        total += moved;
        if let Some(child) = result.path.get_mut(index + 1) {
            child.position += moved;
        }
    }
    result.target.position = target.position();
    total
}

/// Runs `on_update` on a view and then on all of its descendants.
///
/// No borrow is held while descending, so updates may reach back into the tree.
pub fn update_tree(view: &ViewHandle, elapsed: Duration) {
    let children = {
        let mut view = view.borrow_mut();
        view.on_update(elapsed);
        view.local_children()
    };
    for child in &children {
        update_tree(&child.view, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderCommand, UiRenderer};
    use crate::widget::Spacer;
    use trellis_core::Length;

    #[test]
    fn test_flags() {
        let mut flags = ViewFlags::DEFAULT;
        assert!(flags.has(ViewFlags::POINTER_EVENTS));
        assert!(flags.has(ViewFlags::DIRTY));
        assert!(!flags.has(ViewFlags::FOCUSABLE));
        flags.assign(ViewFlags::FOCUSABLE, true);
        flags.clear(ViewFlags::DIRTY);
        assert!(flags.has(ViewFlags::FOCUSABLE));
        assert!(!flags.has(ViewFlags::DIRTY));
    }

    #[test]
    fn test_setters_mark_dirty_only_on_change() {
        let mut spacer = Spacer::new(LayoutParameters::fixed_size(10.0, 10.0));
        assert!(spacer.measure(Vec2::new(100.0, 100.0)));
        assert!(!spacer.measure(Vec2::new(100.0, 100.0)));

        spacer.state_mut().set_margin(Edges::NONE);
        assert!(!spacer.is_dirty());
        spacer.state_mut().set_margin(Edges::all(2));
        assert!(spacer.is_dirty());
        assert!(spacer.measure(Vec2::new(100.0, 100.0)));

        assert!(spacer.measure(Vec2::new(50.0, 100.0)));
    }

    #[test]
    fn test_box_model_sizes() {
        let mut spacer = Spacer::new(LayoutParameters::new(Length::Stretch, Length::Px(10.0)));
        spacer.state_mut().set_margin(Edges::all(5));
        spacer.state_mut().set_padding(Edges::symmetric(2, 1));
        spacer.measure(Vec2::new(100.0, 100.0));

        assert_eq!(spacer.state().content_size(), Vec2::new(86.0, 10.0));
        assert_eq!(spacer.inner_size(), Vec2::new(90.0, 12.0));
        assert_eq!(spacer.outer_size(), Vec2::new(100.0, 22.0));
        assert_eq!(spacer.content_offset(), Vec2::new(7.0, 6.0));
        assert!(spacer.contains_point(Vec2::new(99.0, 21.0)));
        assert!(!spacer.contains_point(Vec2::new(100.0, 0.0)));
    }

    #[test]
    fn test_negative_margin_bounds() {
        let mut spacer = Spacer::new(LayoutParameters::fixed_size(50.0, 10.0));
        spacer.state_mut().set_margin(Edges::new(-20, 0, 0, 0));
        spacer.measure(Vec2::new(100.0, 100.0));
        assert_eq!(spacer.outer_size(), Vec2::new(30.0, 10.0));
        assert_eq!(spacer.actual_bounds(), Bounds::new(-20.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn test_hidden_view_draws_nothing() {
        let mut spacer = Spacer::new(LayoutParameters::fixed_size(10.0, 10.0));
        spacer.state_mut().set_visibility(Visibility::Hidden);
        let mut renderer = UiRenderer::new();
        spacer.draw(&mut renderer);
        assert_eq!(renderer.offset(), Vec2::ZERO);
        assert!(renderer
            .commands()
            .iter()
            .all(|command| !matches!(command, RenderCommand::Texture { .. })));
    }

    #[test]
    fn test_same_view() {
        let a = handle(Spacer::new(LayoutParameters::fit_content()));
        let b = handle(Spacer::new(LayoutParameters::fit_content()));
        let a2 = Rc::clone(&a);
        assert!(same_view(&a, &a2));
        assert!(!same_view(&a, &b));
        assert_eq!(ViewChild::new(a, Vec2::ZERO), ViewChild::new(a2, Vec2::ZERO));
    }
}
