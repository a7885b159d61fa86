//! Linear layout along one axis.

use std::rc::Rc;

use tracing::trace;
use trellis_core::{Alignment, Direction, LayoutParameters, Length, Orientation, Vec2};

use crate::render::SpriteBatch;
use crate::view::{
    draw_children, same_view, FocusSearchResult, View, ViewChild, ViewHandle, ViewState,
};

/// Arranges children one after another, horizontally or vertically.
///
/// ```text
/// horizontal:  ┌───┬──────┬──┬─────────────┐   fixed and content children first,
///              │ a │  b   │c │  stretch ⟶  │   then stretched children take the
///              └───┴──────┴──┴─────────────┘   remaining length
/// ```
#[derive(Debug)]
pub struct Lane {
    state: ViewState,
    orientation: Orientation,
    horizontal_content_alignment: Alignment,
    vertical_content_alignment: Alignment,
    children: Vec<ViewHandle>,
    content_dirty: bool,
    positions: Vec<ViewChild>,
    children_size: Vec2,
}

impl Lane {
    /// Creates an empty, content-sized lane.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            state: ViewState::new("Lane"),
            orientation,
            horizontal_content_alignment: Alignment::Start,
            vertical_content_alignment: Alignment::Start,
            children: Vec::new(),
            content_dirty: true,
            positions: Vec::new(),
            children_size: Vec2::ZERO,
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.state.set_layout(layout);
        self
    }

    /// Sets the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<ViewHandle>) -> Self {
        self.set_children(children);
        self
    }

    /// Sets both content alignments.
    #[must_use]
    pub fn with_alignment(mut self, horizontal: Alignment, vertical: Alignment) -> Self {
        self.set_horizontal_content_alignment(horizontal);
        self.set_vertical_content_alignment(vertical);
        self
    }

    /// Layout axis.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Changes the layout axis.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if orientation != self.orientation {
            self.orientation = orientation;
            self.content_dirty = true;
        }
    }

    /// Horizontal placement of children within the content box.
    #[must_use]
    pub const fn horizontal_content_alignment(&self) -> Alignment {
        self.horizontal_content_alignment
    }

    /// Changes horizontal placement.
    pub fn set_horizontal_content_alignment(&mut self, alignment: Alignment) {
        if alignment != self.horizontal_content_alignment {
            self.horizontal_content_alignment = alignment;
            self.content_dirty = true;
        }
    }

    /// Vertical placement of children within the content box.
    #[must_use]
    pub const fn vertical_content_alignment(&self) -> Alignment {
        self.vertical_content_alignment
    }

    /// Changes vertical placement.
    pub fn set_vertical_content_alignment(&mut self, alignment: Alignment) {
        if alignment != self.vertical_content_alignment {
            self.vertical_content_alignment = alignment;
            self.content_dirty = true;
        }
    }

    /// Child views in layout order.
    #[must_use]
    pub fn child_views(&self) -> &[ViewHandle] {
        &self.children
    }

    /// Replaces all children.
    pub fn set_children(&mut self, children: Vec<ViewHandle>) {
        self.children = children;
        self.content_dirty = true;
    }

    /// Appends a child.
    pub fn add_child(&mut self, child: ViewHandle) {
        self.children.push(child);
        self.content_dirty = true;
    }

    /// Removes a child. Returns `false` if it was not present.
    pub fn remove_child(&mut self, child: &ViewHandle) -> bool {
        let before = self.children.len();
        self.children.retain(|existing| !same_view(existing, child));
        let removed = self.children.len() != before;
        self.content_dirty |= removed;
        removed
    }

    fn measure_child(
        &self,
        child: &ViewHandle,
        mut child_limits: Vec2,
        deferred: bool,
        limits: &mut Vec2,
        children_size: &mut Vec2,
    ) {
        let orientation = self.orientation;
        let cross = orientation.swap();
        let mut child = child.borrow_mut();
        let cross_stretch = cross.length(child.state().layout()).is_stretch();
        if cross_stretch && (!deferred || cross.length(self.state.layout()).is_content()) {
            let cross_length = cross.get(*children_size);
            if cross_length > 0.0 {
                cross.set(&mut child_limits, cross_length);
            }
        }
        child.measure(child_limits);
        let outer = child.outer_size();
        let main_length = orientation.get(outer);
        orientation.update(limits, |value| value - main_length);
        orientation.update(children_size, |value| value + main_length);
        if !cross_stretch {
            cross.update(children_size, |value| value.max(cross.get(outer)));
        }
    }

    fn update_positions(&mut self, content_size: Vec2) {
        self.positions.clear();
        let horizontal = self.horizontal_content_alignment;
        let vertical = self.vertical_content_alignment;
        match self.orientation {
            Orientation::Horizontal => {
                let mut x = horizontal.align(self.children_size.x, content_size.x);
                for child in &self.children {
                    let outer = child.borrow().outer_size();
                    let y = vertical.align(outer.y, content_size.y);
                    self.positions.push(ViewChild::new(Rc::clone(child), Vec2::new(x, y)));
                    x += outer.x;
                }
            }
            Orientation::Vertical => {
                let mut y = vertical.align(self.children_size.y, content_size.y);
                for child in &self.children {
                    let outer = child.borrow().outer_size();
                    let x = horizontal.align(outer.x, content_size.x);
                    self.positions.push(ViewChild::new(Rc::clone(child), Vec2::new(x, y)));
                    y += outer.y;
                }
            }
        }
    }

    fn nearest_child_index(&self, position: Vec2) -> Option<usize> {
        let axis_position = self.orientation.get(position);
        let mut best = None;
        let mut best_distance = f32::INFINITY;
        for (index, child) in self.positions.iter().enumerate() {
            let min_extent = self.orientation.get(child.position);
            let max_extent =
                self.orientation.get(child.position + child.view.borrow().outer_size());
            let distance = if axis_position >= min_extent && axis_position < max_extent {
                0.0
            } else {
                (axis_position - min_extent).abs().min((axis_position - max_extent).abs())
            };
            if distance < best_distance {
                best_distance = distance;
                best = Some(index);
            }
        }
        best
    }

    fn result_distance(&self, position: Vec2, result: Option<&FocusSearchResult>) -> f32 {
        result.map_or(f32::INFINITY, |found| {
            axis_distance(position, &found.target, self.orientation).abs()
        })
    }

    /// Fans out from `nearest` in one direction, keeping the closest match and
    /// stopping once results start getting farther away.
    fn closest_in_sequence(
        &self,
        indices: impl Iterator<Item = usize>,
        position: Vec2,
        direction: Direction,
        mut best: (f32, Option<FocusSearchResult>),
    ) -> (f32, Option<FocusSearchResult>) {
        for index in indices {
            let child = &self.positions[index];
            let result = child.focus_search(position, direction);
            let distance = self.result_distance(position, result.as_ref());
            if distance < best.0 {
                best = (distance, result);
            } else if distance.is_finite() {
                break;
            }
        }
        best
    }
}

/// Signed distance along `orientation` from `target` to `position`; zero inside.
fn axis_distance(position: Vec2, target: &ViewChild, orientation: Orientation) -> f32 {
    let axis_position = orientation.get(position);
    let min_extent = orientation.get(target.position);
    let max_extent = orientation.get(target.position + target.view.borrow().outer_size());
    if axis_position >= min_extent && axis_position < max_extent {
        return 0.0;
    }
    let to_min = axis_position - min_extent;
    let to_max = axis_position - max_extent;
    if to_min.abs() < to_max.abs() {
        to_min
    } else {
        to_max
    }
}

fn is_correct_direction(position: Vec2, target: &ViewChild, direction: Direction) -> bool {
    let distance = axis_distance(position, target, direction.orientation());
    distance.is_sign_negative() ^ direction.is_backward()
}

impl View for Lane {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let orientation = self.orientation;
        let cross = orientation.swap();
        let mut limits = layout.limits(available);
        let mut children_size = Vec2::ZERO;

        let mut deferred = Vec::new();
        for child in &self.children {
            let child_layout = *child.borrow().state().layout();
            if child_layout.width.is_stretch() || child_layout.height.is_stretch() {
                deferred.push(Rc::clone(child));
                continue;
            }
            self.measure_child(child, limits, false, &mut limits, &mut children_size);
        }

        if !deferred.is_empty() {
            let mut deferred_limits = limits;
            if children_size != Vec2::ZERO {
                let cross_limit = cross
                    .length(&layout)
                    .resolve(cross.get(available), || cross.get(children_size));
                cross.set(&mut deferred_limits, cross_limit);
            }
            for child in &deferred {
                orientation.set(&mut deferred_limits, orientation.get(limits));
                self.measure_child(child, deferred_limits, true, &mut limits, &mut children_size);
            }
        }

        if cross.get(children_size) <= 0.0 && !self.children.is_empty() {
            let widest = self
                .children
                .iter()
                .map(|child| cross.get(child.borrow().outer_size()))
                .fold(0.0_f32, f32::max);
            cross.set(&mut children_size, widest);
        }

        self.children_size = children_size;
        let content_size = layout.resolve(available, children_size);
        self.update_positions(content_size);
        content_size
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        draw_children(&self.positions, batch);
    }

    fn local_children(&self) -> Vec<ViewChild> {
        self.positions.clone()
    }

    fn is_content_dirty(&self) -> bool {
        self.content_dirty || self.children.iter().any(|child| child.borrow().is_dirty())
    }

    fn reset_content_dirty(&mut self) {
        self.content_dirty = false;
    }

    fn find_focusable_descendant(
        &self,
        position: Vec2,
        direction: Direction,
    ) -> Option<FocusSearchResult> {
        let Some(nearest_index) = self.nearest_child_index(position) else {
            trace!("'{}' has no children to search", self.state.name());
            return None;
        };
        let nearest = &self.positions[nearest_index];
        let nearest_result = nearest.focus_search(position, direction);

        // Inside the nearest child, its own answer is final.
        if nearest_result.is_some() && nearest.contains_point(position) {
            return nearest_result;
        }

        if direction.orientation() == self.orientation {
            if let Some(result) = &nearest_result {
                if is_correct_direction(position, &result.target, direction) {
                    return nearest_result;
                }
            }
            let found = if direction.is_backward() {
                (0..nearest_index)
                    .rev()
                    .find_map(|index| self.positions[index].focus_search(position, direction))
            } else {
                (nearest_index + 1..self.positions.len())
                    .find_map(|index| self.positions[index].focus_search(position, direction))
            };
            if found.is_none() {
                trace!("'{}' found no match along its axis", self.state.name());
            }
            return found;
        }

        // Moving across the lane from inside a child would jump sideways.
        if nearest.contains_point(position) {
            return None;
        }

        let nearest_distance = self.result_distance(position, nearest_result.as_ref());
        let start = (nearest_distance, nearest_result);
        let after = nearest_index + 1..self.positions.len();
        let ahead = self.closest_in_sequence(after, position, direction, start.clone());
        let behind =
            self.closest_in_sequence((0..nearest_index).rev(), position, direction, start);
        match (ahead, behind) {
            ((_, None), (_, None)) => None,
            ((ahead_distance, ahead), (behind_distance, behind)) => {
                if ahead_distance < behind_distance {
                    ahead
                } else {
                    behind
                }
            }
        }
    }
}
