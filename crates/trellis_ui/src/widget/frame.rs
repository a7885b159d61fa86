//! Single child with a border and background.

use std::rc::Rc;

use trellis_core::{Alignment, Bounds, Direction, Edges, LayoutParameters, SimpleRotation, Vec2};

use crate::nine_slice::NineSlice;
use crate::render::SpriteBatch;
use crate::sprite::Sprite;
use crate::style::Color;
use crate::view::{FocusSearchResult, View, ViewChild, ViewHandle, ViewState};

/// Wraps one content view in an optional nine-sliced border and background.
///
/// ```text
/// ┌─ border (border_thickness) ─────┐
/// │ ┌─ background (inner size) ───┐ │
/// │ │  padding                    │ │
/// │ │    content, aligned         │ │
/// │ └─────────────────────────────┘ │
/// └─────────────────────────────────┘
/// ```
#[derive(Debug)]
pub struct Frame {
    state: ViewState,
    border: Option<NineSlice>,
    border_thickness: Edges,
    background: Option<NineSlice>,
    background_tint: Color,
    horizontal_content_alignment: Alignment,
    vertical_content_alignment: Alignment,
    content: Option<ViewHandle>,
    content_position: Vec2,
    content_dirty: bool,
}

impl Frame {
    /// Creates an empty frame with no border or background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ViewState::new("Frame"),
            border: None,
            border_thickness: Edges::NONE,
            background: None,
            background_tint: Color::WHITE,
            horizontal_content_alignment: Alignment::Start,
            vertical_content_alignment: Alignment::Start,
            content: None,
            content_position: Vec2::ZERO,
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

    /// Sets the border sprite and thickness.
    #[must_use]
    pub fn with_border(mut self, border: Sprite, thickness: Edges) -> Self {
        self.set_border(Some(border));
        self.set_border_thickness(thickness);
        self
    }

    /// Sets the background sprite.
    #[must_use]
    pub fn with_background(mut self, background: Sprite) -> Self {
        self.set_background(Some(background));
        self
    }

    /// The content view.
    #[must_use]
    pub fn content(&self) -> Option<&ViewHandle> {
        self.content.as_ref()
    }

    /// Replaces the content view.
    pub fn set_content(&mut self, content: Option<ViewHandle>) {
        self.content = content;
        self.content_dirty = true;
    }

    /// Border sprite.
    #[must_use]
    pub fn border(&self) -> Option<&Sprite> {
        self.border.as_ref().map(NineSlice::sprite)
    }

    /// Changes the border sprite.
    pub fn set_border(&mut self, border: Option<Sprite>) {
        if border.as_ref() != self.border() {
            self.border = border.map(NineSlice::new);
            self.content_dirty = true;
        }
    }

    /// Changes how much space the border takes.
    pub fn set_border_thickness(&mut self, thickness: Edges) {
        if thickness != self.border_thickness {
            self.border_thickness = thickness;
            self.content_dirty = true;
        }
    }

    /// Background sprite.
    #[must_use]
    pub fn background(&self) -> Option<&Sprite> {
        self.background.as_ref().map(NineSlice::sprite)
    }

    /// Changes the background sprite.
    pub fn set_background(&mut self, background: Option<Sprite>) {
        if background.as_ref() != self.background() {
            self.background = background.map(NineSlice::new);
            self.content_dirty = true;
        }
    }

    /// Tint applied to the background only.
    #[must_use]
    pub const fn background_tint(&self) -> Color {
        self.background_tint
    }

    /// Changes the background tint. Does not affect layout.
    pub fn set_background_tint(&mut self, tint: Color) {
        self.background_tint = tint;
    }

    /// Changes where the content sits when the frame is larger than it.
    pub fn set_alignment(&mut self, horizontal: Alignment, vertical: Alignment) {
        let current = (self.horizontal_content_alignment, self.vertical_content_alignment);
        if (horizontal, vertical) != current {
            self.horizontal_content_alignment = horizontal;
            self.vertical_content_alignment = vertical;
            self.content_dirty = true;
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl View for Frame {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let content_outer = self.content.as_ref().map_or(Vec2::ZERO, |content| {
            let mut content = content.borrow_mut();
            content.measure(layout.limits(available));
            content.outer_size()
        });
        let content_size = layout.resolve(available, content_outer);
        self.content_position = Vec2::new(
            self.horizontal_content_alignment.align(content_outer.x, content_size.x),
            self.vertical_content_alignment.align(content_outer.y, content_size.y),
        );

        let inner_size = content_size + self.state.padding().total();
        let border_size = inner_size + self.border_thickness.total();
        if let Some(border) = &mut self.border {
            let destination = Bounds::from_pos_size(Vec2::ZERO, border_size).to_pixels();
            border.layout(destination, SimpleRotation::None);
        }
        if let Some(background) = &mut self.background {
            let destination = Bounds::from_pos_size(Vec2::ZERO, inner_size).to_pixels();
            background.layout(destination, SimpleRotation::None);
        }
        content_size
    }

    fn on_draw_border(&self, batch: &mut dyn SpriteBatch) {
        if let Some(background) = &self.background {
            let mut scope = batch.save_transform();
            scope.translate(self.border_thickness.top_left());
            background.draw(&mut *scope, self.background_tint);
        }
        if let Some(border) = &self.border {
            border.draw(batch, self.state.tint());
        }
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        let Some(content) = &self.content else {
            return;
        };
        batch.translate(self.content_position);
        content.borrow().draw(batch);
    }

    fn border_thickness(&self) -> Edges {
        self.border_thickness
    }

    fn local_children(&self) -> Vec<ViewChild> {
        self.content
            .iter()
            .map(|content| ViewChild::new(Rc::clone(content), self.content_position))
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
        ViewChild::new(Rc::clone(content), self.content_position).focus_search(position, direction)
    }
}
