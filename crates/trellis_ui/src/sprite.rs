//! Sprites, slice settings and keyed sprite sheets.

use std::collections::BTreeMap;

use trellis_core::{Edges, PixelRect, Vec2};

use crate::error::{UiError, UiResult};
use crate::render::Texture;

/// Which side of the center cell a slice override positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SliceCenterPosition {
    /// The override sets where the center starts.
    #[default]
    Start,
    /// The override sets where the center ends.
    End,
}

/// Nine-slice adjustments for sprites with irregular borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceSettings {
    /// Absolute texture X coordinate overriding one horizontal center boundary.
    pub center_x: Option<i32>,
    /// Which boundary `center_x` replaces.
    pub center_x_position: SliceCenterPosition,
    /// Absolute texture Y coordinate overriding one vertical center boundary.
    pub center_y: Option<i32>,
    /// Which boundary `center_y` replaces.
    pub center_y_position: SliceCenterPosition,
    /// Scale applied to the fixed edges at the destination only.
    pub scale: f32,
    /// Skip the center cell, drawing only the border.
    pub edges_only: bool,
}

impl SliceSettings {
    /// Returns a copy with a different destination scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            center_x: None,
            center_x_position: SliceCenterPosition::Start,
            center_y: None,
            center_y_position: SliceCenterPosition::Start,
            scale: 1.0,
            edges_only: false,
        }
    }
}

/// A region of a host texture, optionally nine-sliced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    /// Texture handle.
    pub texture: Texture,
    /// Source region; `None` means the whole texture.
    pub source: Option<PixelRect>,
    /// Border thickness that never stretches.
    pub fixed_edges: Option<Edges>,
    /// Slice overrides.
    pub slice_settings: Option<SliceSettings>,
}

impl Sprite {
    /// A sprite covering the whole texture.
    #[must_use]
    pub const fn new(texture: Texture) -> Self {
        Self {
            texture,
            source: None,
            fixed_edges: None,
            slice_settings: None,
        }
    }

    /// A sprite covering `source` within the texture.
    #[must_use]
    pub const fn from_rect(texture: Texture, source: PixelRect) -> Self {
        Self {
            texture,
            source: Some(source),
            fixed_edges: None,
            slice_settings: None,
        }
    }

    /// Sets the nine-slice border thickness.
    #[must_use]
    pub const fn with_fixed_edges(mut self, edges: Edges) -> Self {
        self.fixed_edges = Some(edges);
        self
    }

    /// Sets slice overrides.
    #[must_use]
    pub const fn with_slice_settings(mut self, settings: SliceSettings) -> Self {
        self.slice_settings = Some(settings);
        self
    }

    /// The effective source rectangle.
    #[must_use]
    pub fn source_rect(&self) -> PixelRect {
        self.source.unwrap_or_else(|| self.texture.bounds())
    }

    /// Natural size in pixels.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.source_rect().size()
    }
}

/// Sprites looked up by key, with a placeholder for missing keys.
#[derive(Debug, Clone)]
pub struct SpriteMap<K: Ord> {
    sprites: BTreeMap<K, Sprite>,
    placeholder: Sprite,
}

impl<K: Ord + std::fmt::Debug> SpriteMap<K> {
    /// Creates a map from existing sprites.
    #[must_use]
    pub fn new(sprites: BTreeMap<K, Sprite>, placeholder: Sprite) -> Self {
        Self { sprites, placeholder }
    }

    /// Returns the sprite for `key` and whether it is the placeholder.
    #[must_use]
    pub fn get(&self, key: &K) -> (Sprite, bool) {
        match self.sprites.get(key) {
            Some(sprite) => (*sprite, false),
            None => {
                tracing::warn!("No sprite mapped for {:?}, using placeholder", key);
                (self.placeholder, true)
            }
        }
    }

    /// Number of mapped keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Returns `true` if no keys are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// Builds a [`SpriteMap`] by walking a cursor across a sprite sheet.
///
/// ```text
/// ┌────┬────┬────┐   add(a) add(b) add(c): cursor moves right by
/// │ a  │ b  │ c  │   width + padding, wrapping to the next row
/// ├────┼────┼────┤   when it reaches the texture's right edge.
/// │ d  │    │    │
/// └────┴────┴────┘
/// ```
#[derive(Debug)]
pub struct SpriteMapBuilder<K: Ord> {
    texture: Texture,
    sprites: BTreeMap<K, Sprite>,
    placeholder: Option<Sprite>,
    cursor: (i32, i32),
    sprite_size: (i32, i32),
    padding: (i32, i32),
}

impl<K: Ord + Clone + std::fmt::Debug> SpriteMapBuilder<K> {
    /// Starts a builder over `texture` with the cursor at the origin.
    #[must_use]
    pub fn new(texture: Texture) -> Self {
        Self {
            texture,
            sprites: BTreeMap::new(),
            placeholder: None,
            cursor: (0, 0),
            sprite_size: (0, 0),
            padding: (0, 0),
        }
    }

    /// Sets the default size used by [`add_next`](Self::add_next).
    pub fn size(&mut self, width: i32, height: i32) -> &mut Self {
        self.sprite_size = (width, height);
        self
    }

    /// Sets the gap left between consecutive sprites.
    pub fn padding(&mut self, x: i32, y: i32) -> &mut Self {
        self.padding = (x, y);
        self
    }

    /// Moves the cursor to an absolute position.
    pub fn move_to(&mut self, x: i32, y: i32) -> &mut Self {
        self.cursor = (x, y);
        self
    }

    /// Moves the cursor by a relative amount.
    pub fn move_by(&mut self, x: i32, y: i32) -> &mut Self {
        self.cursor = (self.cursor.0 + x, self.cursor.1 + y);
        self
    }

    /// Adds a sprite at the cursor using the default size.
    ///
    /// # Errors
    ///
    /// Fails if the default size is not positive or the region leaves the texture.
    pub fn add_next(&mut self, key: K) -> UiResult<&mut Self> {
        let (x, y) = self.cursor;
        let (width, height) = self.sprite_size;
        let rect = PixelRect::new(x, y, width, height);
        self.add(key, rect)
    }

    /// Adds several sprites in sequence at the cursor.
    ///
    /// # Errors
    ///
    /// Fails on the first region that is empty or out of bounds.
    pub fn add_all(&mut self, keys: impl IntoIterator<Item = K>) -> UiResult<&mut Self> {
        for key in keys {
            self.add_next(key)?;
        }
        Ok(self)
    }

    /// Adds a sprite with an explicit source rectangle and advances the cursor past it.
    ///
    /// # Errors
    ///
    /// Returns [`UiError::EmptySpriteRect`] for zero or negative sizes and
    /// [`UiError::SpriteOutOfBounds`] for regions outside the texture.
    pub fn add(&mut self, key: K, rect: PixelRect) -> UiResult<&mut Self> {
        if rect.is_empty() {
            return Err(UiError::EmptySpriteRect { rect });
        }
        if !self.texture.bounds().contains_rect(&rect) {
            return Err(UiError::SpriteOutOfBounds {
                rect,
                width: self.texture.width,
                height: self.texture.height,
            });
        }

        self.sprites.insert(key, Sprite::from_rect(self.texture, rect));
        self.cursor = (rect.right() + self.padding.0, rect.y);
        if self.cursor.0 >= self.texture.width {
            self.cursor = (0, self.cursor.1 + rect.height + self.padding.1);
        }
        Ok(self)
    }

    /// Uses an already-added sprite as the placeholder.
    ///
    /// Unknown keys leave the current placeholder unchanged.
    pub fn placeholder_key(&mut self, key: &K) -> &mut Self {
        if let Some(sprite) = self.sprites.get(key) {
            self.placeholder = Some(*sprite);
        }
        self
    }

    /// Uses an arbitrary sprite as the placeholder.
    pub fn placeholder(&mut self, sprite: Sprite) -> &mut Self {
        self.placeholder = Some(sprite);
        self
    }

    /// Finishes the map. Without an explicit placeholder, the whole texture is used.
    #[must_use]
    pub fn build(&self) -> SpriteMap<K> {
        SpriteMap::new(
            self.sprites.clone(),
            self.placeholder.unwrap_or_else(|| Sprite::new(self.texture)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: Texture = Texture::new(1, 64, 32);

    #[test]
    fn test_sprite_size() {
        assert_eq!(Sprite::new(SHEET).size(), Vec2::new(64.0, 32.0));
        assert_eq!(
            Sprite::from_rect(SHEET, PixelRect::new(0, 0, 16, 8)).size(),
            Vec2::new(16.0, 8.0)
        );
    }

    #[test]
    fn test_builder_cursor_wraps() {
        let mut builder = SpriteMapBuilder::new(SHEET);
        builder.size(16, 16).padding(0, 0);
        builder.add_all(["a", "b", "c", "d", "e"]).unwrap();
        let map = builder.build();

        assert_eq!(map.len(), 5);
        assert_eq!(map.get(&"d").0.source, Some(PixelRect::new(48, 0, 16, 16)));
        assert_eq!(map.get(&"e").0.source, Some(PixelRect::new(0, 16, 16, 16)));
    }

    #[test]
    fn test_builder_rejects_bad_rects() {
        let mut builder = SpriteMapBuilder::new(SHEET);
        assert!(matches!(
            builder.add("zero", PixelRect::new(0, 0, 0, 10)),
            Err(UiError::EmptySpriteRect { .. })
        ));
        assert!(matches!(
            builder.add("outside", PixelRect::new(60, 0, 8, 8)),
            Err(UiError::SpriteOutOfBounds { width: 64, height: 32, .. })
        ));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_placeholder_lookup() {
        let mut builder = SpriteMapBuilder::new(SHEET);
        builder.add("known", PixelRect::new(0, 0, 8, 8)).unwrap();
        builder.placeholder_key(&"known");
        let map = builder.build();

        let (sprite, placeholder) = map.get(&"known");
        assert!(!placeholder);
        assert_eq!(sprite.size(), Vec2::new(8.0, 8.0));

        let (fallback, placeholder) = map.get(&"missing");
        assert!(placeholder);
        assert_eq!(fallback, sprite);
    }
}
