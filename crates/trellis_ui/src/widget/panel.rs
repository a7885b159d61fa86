//! Overlapping children.

use std::rc::Rc;

use trellis_core::{Alignment, Direction, LayoutParameters, Vec2};

use crate::render::SpriteBatch;
use crate::view::{
    draw_children, same_view, search_children, FocusSearchResult, View, ViewChild, ViewHandle,
    ViewState,
};

/// Draws all children on top of each other, each aligned within the content area.
///
/// Children with a stretched dimension are measured last, against the size of the
/// largest fixed child (or the panel's own size, if that is not content-based).
#[derive(Debug)]
pub struct Panel {
    state: ViewState,
    horizontal_content_alignment: Alignment,
    vertical_content_alignment: Alignment,
    children: Vec<ViewHandle>,
    content_dirty: bool,
    positions: Vec<ViewChild>,
}

impl Panel {
    /// Creates an empty, content-sized panel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ViewState::new("Panel"),
            horizontal_content_alignment: Alignment::Start,
            vertical_content_alignment: Alignment::Start,
            children: Vec::new(),
            content_dirty: true,
            positions: Vec::new(),
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
        self.set_alignment(horizontal, vertical);
        self
    }

    /// Horizontal placement of each child.
    #[must_use]
    pub const fn horizontal_content_alignment(&self) -> Alignment {
        self.horizontal_content_alignment
    }

    /// Vertical placement of each child.
    #[must_use]
    pub const fn vertical_content_alignment(&self) -> Alignment {
        self.vertical_content_alignment
    }

    /// Changes both content alignments.
    pub fn set_alignment(&mut self, horizontal: Alignment, vertical: Alignment) {
        let current = (self.horizontal_content_alignment, self.vertical_content_alignment);
        if (horizontal, vertical) != current {
            self.horizontal_content_alignment = horizontal;
            self.vertical_content_alignment = vertical;
            self.content_dirty = true;
        }
    }

    /// Child views in insertion order.
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
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl View for Panel {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let limits = layout.limits(available);
        let mut max_size = Vec2::ZERO;

        let mut deferred = Vec::new();
        for child in &self.children {
            let mut child_view = child.borrow_mut();
            let child_layout = *child_view.state().layout();
            if child_layout.width.is_stretch() || child_layout.height.is_stretch() {
                deferred.push(Rc::clone(child));
                continue;
            }
            child_view.measure(limits);
            max_size = max_size.max(child_view.outer_size());
        }

        if !deferred.is_empty() {
            let deferred_limits = layout.resolve(available, max_size);
            for child in &deferred {
                let mut child_view = child.borrow_mut();
                child_view.measure(deferred_limits);
                max_size = max_size.max(child_view.outer_size());
            }
        }

        let content_size = layout.resolve(available, max_size);
        let horizontal = self.horizontal_content_alignment;
        let vertical = self.vertical_content_alignment;
        self.positions = self
            .children
            .iter()
            .map(|child| {
                let outer = child.borrow().outer_size();
                let position = Vec2::new(
                    horizontal.align(outer.x, content_size.x),
                    vertical.align(outer.y, content_size.y),
                );
                ViewChild::new(Rc::clone(child), position)
            })
            .collect();
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
        search_children(&self.positions, position, direction)
    }
}
