//! Sprite display.

use trellis_core::{Alignment, Bounds, LayoutParameters, SimpleRotation, Vec2};

use crate::nine_slice::NineSlice;
use crate::render::SpriteBatch;
use crate::sprite::Sprite;
use crate::view::{View, ViewState};

/// How an image adapts to a content area whose size or aspect ratio differs
/// from the sprite's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImageFit {
    /// Draw at the sprite's own size.
    None,
    /// Scale uniformly until the whole image fits.
    #[default]
    Contain,
    /// Scale uniformly until the content area is covered; the overflow is clipped.
    Cover,
    /// Scale each axis independently to match the content area exactly.
    Stretch,
}

/// Displays a single sprite, nine-sliced if it has fixed edges.
#[derive(Debug)]
pub struct Image {
    state: ViewState,
    sprite: Option<Sprite>,
    slice: Option<NineSlice>,
    fit: ImageFit,
    rotation: SimpleRotation,
    scale: f32,
    horizontal_alignment: Alignment,
    vertical_alignment: Alignment,
    destination: Bounds,
    content_dirty: bool,
}

impl Image {
    /// Creates a content-sized image.
    #[must_use]
    pub fn new(sprite: Option<Sprite>) -> Self {
        Self {
            state: ViewState::new("Image"),
            sprite,
            slice: None,
            fit: ImageFit::default(),
            rotation: SimpleRotation::None,
            scale: 1.0,
            horizontal_alignment: Alignment::Start,
            vertical_alignment: Alignment::Start,
            destination: Bounds::ZERO,
            content_dirty: true,
        }
    }

    /// Sets the layout.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutParameters) -> Self {
        self.state.set_layout(layout);
        self
    }

    /// Sets the fit mode.
    #[must_use]
    pub fn with_fit(mut self, fit: ImageFit) -> Self {
        self.set_fit(fit);
        self
    }

    /// The displayed sprite.
    #[must_use]
    pub const fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    /// Changes the displayed sprite.
    pub fn set_sprite(&mut self, sprite: Option<Sprite>) {
        if sprite != self.sprite {
            self.sprite = sprite;
            self.slice = None;
            self.content_dirty = true;
        }
    }

    /// Fit mode.
    #[must_use]
    pub const fn fit(&self) -> ImageFit {
        self.fit
    }

    /// Changes the fit mode.
    pub fn set_fit(&mut self, fit: ImageFit) {
        if fit != self.fit {
            self.fit = fit;
            self.content_dirty = true;
        }
    }

    /// Rotation applied to the sprite.
    #[must_use]
    pub const fn rotation(&self) -> SimpleRotation {
        self.rotation
    }

    /// Changes the rotation. Quarter turns swap the image's width and height.
    pub fn set_rotation(&mut self, rotation: SimpleRotation) {
        if rotation != self.rotation {
            self.rotation = rotation;
            self.content_dirty = true;
        }
    }

    /// Draw-time scale around the image center.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Changes the draw-time scale.
    ///
    /// Scaling never affects layout; the image grows or shrinks around its center
    /// and may overlap its neighbors.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.update_slice();
    }

    /// Changes where the image sits inside a larger content area.
    pub fn set_alignment(&mut self, horizontal: Alignment, vertical: Alignment) {
        if (horizontal, vertical) != (self.horizontal_alignment, self.vertical_alignment) {
            self.horizontal_alignment = horizontal;
            self.vertical_alignment = vertical;
            self.content_dirty = true;
        }
    }

    fn image_size(&self, mut limits: Vec2) -> Vec2 {
        let Some(sprite) = &self.sprite else {
            return Vec2::ZERO;
        };
        let source = if self.rotation.is_quarter() {
            sprite.size().swap()
        } else {
            sprite.size()
        };
        let slice_scale = sprite.slice_settings.map_or(1.0, |settings| settings.scale);
        let scaled = source * slice_scale;
        let layout = self.state.layout();
        let width_content = layout.width.is_content();
        let height_content = layout.height.is_content();

        let contain = self.fit == ImageFit::Contain;
        if width_content && (!contain || height_content) && scaled.x < limits.x {
            limits.x = scaled.x;
        }
        if height_content && (!contain || width_content) && scaled.y < limits.y {
            limits.y = scaled.y;
        }
        if self.fit == ImageFit::Stretch {
            return limits;
        }
        if self.fit == ImageFit::None || (width_content && height_content) {
            return scaled;
        }
        let max_scale_x = limits.x / source.x;
        let max_scale_y = limits.y / source.y;
        let uniform = if self.fit == ImageFit::Cover {
            max_scale_x.max(max_scale_y)
        } else {
            max_scale_x.min(max_scale_y)
        };
        source * uniform
    }

    fn update_slice(&mut self) {
        let Some(slice) = &mut self.slice else {
            return;
        };
        let mut destination = self.destination;
        if (self.scale - 1.0).abs() > f32::EPSILON {
            let delta = destination.size() * ((self.scale - 1.0) / 2.0);
            destination = Bounds::from_pos_size(
                destination.position() - delta,
                destination.size() + delta * 2.0,
            );
        }
        slice.layout(destination.to_pixels(), self.rotation);
    }
}

impl View for Image {
    fn state(&self) -> &ViewState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    fn on_measure(&mut self, available: Vec2) -> Vec2 {
        let layout = *self.state.layout();
        let image_size = self.image_size(layout.limits(available));
        let content_size = layout.resolve(available, image_size);
        if self.slice.is_none() {
            self.slice = self.sprite.map(NineSlice::new);
        }
        let left = self.horizontal_alignment.align(image_size.x, content_size.x);
        let top = self.vertical_alignment.align(image_size.y, content_size.y);
        self.destination = Bounds::from_pos_size(Vec2::new(left, top), image_size);
        self.update_slice();
        content_size
    }

    fn on_draw_content(&self, batch: &mut dyn SpriteBatch) {
        let Some(slice) = &self.slice else {
            return;
        };
        if self.fit == ImageFit::Cover {
            let mut clip = batch.clip(Bounds::from_pos_size(Vec2::ZERO, self.state.content_size()));
            slice.draw(&mut *clip, self.state.tint());
        } else {
            slice.draw(batch, self.state.tint());
        }
    }

    fn is_content_dirty(&self) -> bool {
        self.content_dirty
    }

    fn reset_content_dirty(&mut self) {
        self.content_dirty = false;
    }
}
