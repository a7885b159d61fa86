//! Drawing surface abstraction.
//!
//! Views never talk to a GPU. They draw through a [`SpriteBatch`], which the host
//! implements (or which [`UiRenderer`] records for later submission).
//!
//! ```text
//! view.draw(batch)
//!   └─ batch.save_transform()   ─┐  RAII scope: popped on drop,
//!        batch.translate(..)      │  including during unwinding
//!        batch.clip(bounds)     ─┐│
//!          draw_rect / draw_at   ││
//!                               ─┘┘
//! ```

mod recorder;

pub use recorder::{RenderCommand, UiBatch, UiRenderer, UiVertex};

use std::ops::{Deref, DerefMut};

use trellis_core::{Bounds, PixelRect, Vec2};

use crate::style::Color;

/// Host-owned texture handle.
///
/// The engine never loads or frees textures; it only needs an identifier and the
/// pixel dimensions for source-rectangle math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Texture {
    /// Host identifier.
    pub id: u32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Texture {
    /// Creates a new texture handle.
    #[must_use]
    pub const fn new(id: u32, width: i32, height: i32) -> Self {
        Self { id, width, height }
    }

    /// The full texture area.
    #[must_use]
    pub const fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width, self.height)
    }
}

/// Host-owned font used for measuring and drawing text.
pub trait Font {
    /// Size of `text` when drawn on a single line.
    fn measure(&self, text: &str) -> Vec2;

    /// Distance between consecutive baselines.
    fn line_height(&self) -> f32;

    /// Host identifier, recorded in render commands.
    fn id(&self) -> u32 {
        0
    }
}

/// Fixed-advance font for hosts without glyph metrics, and for tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceFont {
    /// Host identifier.
    pub id: u32,
    /// Advance per character.
    pub char_width: f32,
    /// Line height.
    pub line_height: f32,
}

impl MonospaceFont {
    /// Creates a monospace font.
    #[must_use]
    pub const fn new(id: u32, char_width: f32, line_height: f32) -> Self {
        Self { id, char_width, line_height }
    }
}

impl Default for MonospaceFont {
    fn default() -> Self {
        Self::new(0, 8.0, 16.0)
    }
}

impl Font for MonospaceFont {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * self.char_width, self.line_height)
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn id(&self) -> u32 {
        self.id
    }
}

/// Color blending mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Standard alpha blending.
    #[default]
    Alpha,
    /// Source added to destination.
    Additive,
    /// Source multiplied with destination.
    Multiply,
    /// No blending.
    Opaque,
}

/// Mirroring applied when drawing a sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SpriteEffects {
    /// Mirror left-right.
    pub flip_horizontal: bool,
    /// Mirror top-bottom.
    pub flip_vertical: bool,
}

impl SpriteEffects {
    /// No mirroring.
    pub const NONE: Self = Self {
        flip_horizontal: false,
        flip_vertical: false,
    };
}

/// Parameters for the point overload of [`SpriteBatch::draw_at`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransform {
    /// Rotation in radians, clockwise.
    pub rotation: f32,
    /// Origin within the source rectangle, in source pixels.
    pub origin: Vec2,
    /// Per-axis scale.
    pub scale: Vec2,
    /// Mirroring.
    pub effects: SpriteEffects,
}

impl Default for DrawTransform {
    fn default() -> Self {
        Self {
            rotation: 0.0,
            origin: Vec2::ZERO,
            scale: Vec2::ONE,
            effects: SpriteEffects::NONE,
        }
    }
}

/// A drawing surface with a local coordinate system.
///
/// All positions are relative to the current transform. The `push_*`/`pop_*`
/// primitives must be balanced; prefer the scoped wrappers on `dyn SpriteBatch`
/// ([`clip`](#method.clip), [`blend`](#method.blend),
/// [`save_transform`](#method.save_transform)) which pop on drop.
pub trait SpriteBatch {
    /// Draws `source` (or the whole texture) at `position`, transformed about `origin`.
    fn draw_at(
        &mut self,
        texture: Texture,
        position: Vec2,
        source: Option<PixelRect>,
        tint: Color,
        transform: DrawTransform,
    );

    /// Draws `source` (or the whole texture) stretched into `destination`.
    fn draw_rect(
        &mut self,
        texture: Texture,
        destination: Bounds,
        source: Option<PixelRect>,
        tint: Color,
    );

    /// Draws a single line of text with its top-left corner at `position`.
    fn draw_string(&mut self, font: &dyn Font, text: &str, position: Vec2, color: Color);

    /// Moves the local origin.
    fn translate(&mut self, offset: Vec2);

    /// Saves the current transform.
    fn push_transform(&mut self);

    /// Restores the last saved transform.
    fn pop_transform(&mut self);

    /// Restricts drawing to `bounds` (local coordinates), intersected with any active clip.
    fn push_clip(&mut self, bounds: Bounds);

    /// Removes the last clip.
    fn pop_clip(&mut self);

    /// Switches the blend mode.
    fn push_blend(&mut self, mode: BlendMode);

    /// Restores the previous blend mode.
    fn pop_blend(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Clip,
    Blend,
    Transform,
}

/// RAII guard returned by the scoped batch operations.
///
/// Dereferences to the underlying batch; the matching `pop_*` runs on drop.
pub struct RenderScope<'a> {
    batch: &'a mut dyn SpriteBatch,
    kind: ScopeKind,
}

impl<'a> Deref for RenderScope<'a> {
    type Target = dyn SpriteBatch + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.batch
    }
}

impl<'a> DerefMut for RenderScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.batch
    }
}

impl Drop for RenderScope<'_> {
    fn drop(&mut self) {
        match self.kind {
            ScopeKind::Clip => self.batch.pop_clip(),
            ScopeKind::Blend => self.batch.pop_blend(),
            ScopeKind::Transform => self.batch.pop_transform(),
        }
    }
}

impl<'b> dyn SpriteBatch + 'b {
    /// Clips drawing to `bounds` until the returned scope is dropped.
    pub fn clip(&mut self, bounds: Bounds) -> RenderScope<'_> {
        self.push_clip(bounds);
        RenderScope {
            batch: self,
            kind: ScopeKind::Clip,
        }
    }

    /// Uses `mode` until the returned scope is dropped.
    pub fn blend(&mut self, mode: BlendMode) -> RenderScope<'_> {
        self.push_blend(mode);
        RenderScope {
            batch: self,
            kind: ScopeKind::Blend,
        }
    }

    /// Restores the current transform when the returned scope is dropped.
    pub fn save_transform(&mut self) -> RenderScope<'_> {
        self.push_transform();
        RenderScope {
            batch: self,
            kind: ScopeKind::Transform,
        }
    }
}
