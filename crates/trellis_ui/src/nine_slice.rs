//! Nine-slice sprite drawing.
//!
//! ```text
//!   source                     destination
//! ┌──┬──────┬──┐          ┌──┬────────────────┬──┐
//! │TL│  T   │TR│          │TL│       T        │TR│   corners keep their size,
//! ├──┼──────┼──┤    →     ├──┼────────────────┼──┤   edges stretch along one
//! │L │  C   │R │          │L │       C        │R │   axis, the center along
//! ├──┼──────┼──┤          │  │                │  │   both
//! │BL│  B   │BR│          ├──┼────────────────┼──┤
//! └──┴──────┴──┘          │BL│       B        │BR│
//!                         └──┴────────────────┴──┘
//! ```

use trellis_core::{Edges, PixelRect, SimpleRotation, Vec2};

use crate::render::{DrawTransform, SpriteBatch};
use crate::sprite::{SliceCenterPosition, SliceSettings, Sprite};
use crate::style::Color;

/// A 3×3 grid of cells, indexed `[row][column]`.
pub type SliceGrid = [[PixelRect; 3]; 3];

/// Draws a sprite into an arbitrary rectangle using its fixed edges.
///
/// Call [`layout`](Self::layout) whenever the destination changes, then
/// [`draw`](Self::draw) every frame. Drawing before the first layout does nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct NineSlice {
    sprite: Sprite,
    source_grid: SliceGrid,
    destination_grid: Option<SliceGrid>,
    rotation: SimpleRotation,
}

impl NineSlice {
    /// Prepares the source grid for `sprite`.
    #[must_use]
    pub fn new(sprite: Sprite) -> Self {
        let source_grid = grid(
            sprite.source_rect(),
            sprite.fixed_edges.unwrap_or(Edges::NONE),
            sprite.slice_settings.as_ref(),
            1.0,
        );
        Self {
            sprite,
            source_grid,
            destination_grid: None,
            rotation: SimpleRotation::None,
        }
    }

    /// The sprite being drawn.
    #[must_use]
    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    /// Source cells.
    #[must_use]
    pub fn source_grid(&self) -> &SliceGrid {
        &self.source_grid
    }

    /// Destination cells from the last layout.
    #[must_use]
    pub fn destination_grid(&self) -> Option<&SliceGrid> {
        self.destination_grid.as_ref()
    }

    /// Computes destination cells for `destination`.
    ///
    /// Fixed edges are rotated with the sprite and scaled by the slice scale; the
    /// center-position overrides only apply to the source.
    pub fn layout(&mut self, destination: PixelRect, rotation: SimpleRotation) {
        let edges = self.sprite.fixed_edges.unwrap_or(Edges::NONE).rotate(rotation);
        let slice_scale = self.sprite.slice_settings.map_or(1.0, |settings| settings.scale);
        self.rotation = rotation;
        self.destination_grid = Some(grid(destination, edges, None, slice_scale));
    }

    /// Draws every non-empty cell.
    pub fn draw(&self, batch: &mut dyn SpriteBatch, tint: Color) {
        let Some(destination_grid) = &self.destination_grid else {
            return;
        };
        let edges_only = self.sprite.slice_settings.is_some_and(|settings| settings.edges_only);
        let texture = self.sprite.texture;

        for (source_y, row) in self.source_grid.iter().enumerate() {
            for (source_x, source) in row.iter().enumerate() {
                if edges_only && source_x == 1 && source_y == 1 {
                    continue;
                }
                if source.width == 0 || source.height == 0 {
                    continue;
                }
                let (destination_x, destination_y) =
                    rotate_indices(source_x, source_y, self.rotation);
                let destination = destination_grid[destination_y][destination_x];

                if self.rotation == SimpleRotation::None {
                    batch.draw_rect(texture, destination.to_bounds(), Some(*source), tint);
                } else {
                    let size = if self.rotation.is_quarter() {
                        destination.size().swap()
                    } else {
                        destination.size()
                    };
                    let source_size = source.size();
                    let transform = DrawTransform {
                        rotation: self.rotation.angle(),
                        origin: source_size * 0.5,
                        scale: Vec2::new(size.x / source_size.x, size.y / source_size.y),
                        ..DrawTransform::default()
                    };
                    batch.draw_at(texture, destination.center(), Some(*source), tint, transform);
                }
            }
        }
    }
}

/// Where a source cell at `(x, y)` lands after rotating the whole grid.
const fn rotate_indices(x: usize, y: usize, rotation: SimpleRotation) -> (usize, usize) {
    match rotation {
        SimpleRotation::None => (x, y),
        SimpleRotation::QuarterClockwise => (2 - y, x),
        SimpleRotation::QuarterCounterclockwise => (y, 2 - x),
        SimpleRotation::Half => (2 - x, 2 - y),
    }
}

fn grid(
    bounds: PixelRect,
    edges: Edges,
    settings: Option<&SliceSettings>,
    slice_scale: f32,
) -> SliceGrid {
    #[allow(clippy::float_cmp)]
    let edges = if slice_scale == 1.0 { edges } else { edges * slice_scale };
    let left = bounds.x;
    let top = bounds.y;
    let mut center_start_x = left + edges.left;
    let mut center_start_y = top + edges.top;
    let mut center_end_x = bounds.right() - edges.right;
    let mut center_end_y = bounds.bottom() - edges.bottom;

    if let Some(settings) = settings {
        if let Some(center_x) = settings.center_x {
            match settings.center_x_position {
                SliceCenterPosition::Start => center_start_x = center_x,
                SliceCenterPosition::End => center_end_x = center_x,
            }
        }
        if let Some(center_y) = settings.center_y {
            match settings.center_y_position {
                SliceCenterPosition::Start => center_start_y = center_y,
                SliceCenterPosition::End => center_end_y = center_y,
            }
        }
    }

    let inner_width = center_end_x - center_start_x;
    let inner_height = center_end_y - center_start_y;
    let start_right = bounds.right() - edges.right;
    let start_bottom = bounds.bottom() - edges.bottom;

    [
        [
            PixelRect::new(left, top, edges.left, edges.top),
            PixelRect::new(center_start_x, top, inner_width, edges.top),
            PixelRect::new(start_right, top, edges.right, edges.top),
        ],
        [
            PixelRect::new(left, center_start_y, edges.left, inner_height),
            PixelRect::new(center_start_x, center_start_y, inner_width, inner_height),
            PixelRect::new(start_right, center_start_y, edges.right, inner_height),
        ],
        [
            PixelRect::new(left, start_bottom, edges.left, edges.bottom),
            PixelRect::new(center_start_x, start_bottom, inner_width, edges.bottom),
            PixelRect::new(start_right, start_bottom, edges.right, edges.bottom),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RenderCommand, Texture, UiRenderer};
    use trellis_core::Bounds;

    const TEXTURE: Texture = Texture::new(3, 48, 48);

    fn bordered() -> Sprite {
        Sprite::from_rect(TEXTURE, PixelRect::new(0, 0, 24, 24)).with_fixed_edges(Edges::all(4))
    }

    #[test]
    fn test_layout_is_idempotent() {
        let mut slice = NineSlice::new(bordered());
        let destination = PixelRect::new(10, 10, 100, 60);

        slice.layout(destination, SimpleRotation::None);
        let first = *slice.destination_grid().unwrap();
        slice.layout(destination, SimpleRotation::None);
        assert_eq!(*slice.destination_grid().unwrap(), first);

        assert_eq!(first[0][0], PixelRect::new(10, 10, 4, 4));
        assert_eq!(first[1][1], PixelRect::new(14, 14, 92, 52));
        assert_eq!(first[2][2], PixelRect::new(106, 66, 4, 4));
    }

    #[test]
    fn test_zero_edges_draw_single_stretched_blit() {
        let sprite =
            Sprite::from_rect(TEXTURE, PixelRect::new(8, 8, 16, 16)).with_fixed_edges(Edges::NONE);
        let mut slice = NineSlice::new(sprite);
        slice.layout(PixelRect::new(0, 0, 200, 100), SimpleRotation::None);

        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);

        assert_eq!(
            renderer.commands(),
            &[RenderCommand::Texture {
                texture: TEXTURE,
                destination: Bounds::new(0.0, 0.0, 200.0, 100.0),
                source: PixelRect::new(8, 8, 16, 16),
                tint: Color::WHITE,
            }]
        );
    }

    #[test]
    fn test_draw_before_layout_is_noop() {
        let slice = NineSlice::new(bordered());
        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);
        assert_eq!(renderer.command_count(), 0);
    }

    #[test]
    fn test_edges_only_skips_center() {
        let sprite = bordered().with_slice_settings(SliceSettings {
            edges_only: true,
            ..SliceSettings::default()
        });
        let mut slice = NineSlice::new(sprite);
        slice.layout(PixelRect::new(0, 0, 50, 50), SimpleRotation::None);

        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);
        assert_eq!(renderer.command_count(), 8);
    }

    #[test]
    fn test_slice_scale_applies_to_destination_only() {
        let sprite = bordered().with_slice_settings(SliceSettings::default().with_scale(2.0));
        let mut slice = NineSlice::new(sprite);
        slice.layout(PixelRect::new(0, 0, 40, 40), SimpleRotation::None);

        assert_eq!(slice.source_grid()[0][0], PixelRect::new(0, 0, 4, 4));
        assert_eq!(slice.destination_grid().unwrap()[0][0], PixelRect::new(0, 0, 8, 8));
    }

    #[test]
    fn test_center_override_moves_source_center() {
        let sprite = bordered().with_slice_settings(SliceSettings {
            center_x: Some(10),
            center_x_position: SliceCenterPosition::Start,
            ..SliceSettings::default()
        });
        let slice = NineSlice::new(sprite);
        assert_eq!(slice.source_grid()[1][1], PixelRect::new(10, 4, 10, 16));
    }

    #[test]
    fn test_quarter_rotation_uses_point_overload() {
        let sprite = Sprite::from_rect(TEXTURE, PixelRect::new(0, 0, 24, 12))
            .with_fixed_edges(Edges::new(2, 0, 6, 0));
        let mut slice = NineSlice::new(sprite);
        slice.layout(PixelRect::new(0, 0, 12, 48), SimpleRotation::QuarterClockwise);

        // Rotated clockwise, the sprite's left edge sits along the destination top.
        let grid = slice.destination_grid().unwrap();
        assert_eq!(grid[0][1], PixelRect::new(0, 0, 12, 2));

        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);
        assert_eq!(renderer.command_count(), 3);
        let (position, source, transform) = first_placement(&renderer);
        assert_eq!(source, PixelRect::new(0, 0, 2, 12));
        assert_eq!(position, Vec2::new(6.0, 1.0));
        assert_eq!(transform.origin, Vec2::new(1.0, 6.0));
        assert_eq!(transform.scale, Vec2::ONE);
    }

    fn uneven() -> NineSlice {
        let sprite = Sprite::from_rect(TEXTURE, PixelRect::new(0, 0, 24, 24))
            .with_fixed_edges(Edges::new(1, 2, 3, 4));
        NineSlice::new(sprite)
    }

    fn first_placement(renderer: &UiRenderer) -> (Vec2, PixelRect, DrawTransform) {
        let RenderCommand::TransformedTexture { position, source, transform, .. } =
            &renderer.commands()[0]
        else {
            panic!("expected point overload");
        };
        (*position, *source, *transform)
    }

    #[test]
    fn test_counterclockwise_rotation_moves_top_left_to_bottom_left() {
        let mut slice = uneven();
        slice.layout(PixelRect::new(0, 0, 40, 30), SimpleRotation::QuarterCounterclockwise);

        // The sprite's top edge now runs down the destination's left side.
        let grid = slice.destination_grid().unwrap();
        assert_eq!(grid[0][0], PixelRect::new(0, 0, 2, 3));
        assert_eq!(grid[1][1], PixelRect::new(2, 3, 34, 26));
        assert_eq!(grid[2][2], PixelRect::new(36, 29, 4, 1));

        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);
        assert_eq!(renderer.command_count(), 9);
        let (position, source, transform) = first_placement(&renderer);
        assert_eq!(source, PixelRect::new(0, 0, 1, 2));
        assert_eq!(position, Vec2::new(1.0, 29.5));
        assert_eq!(transform.scale, Vec2::ONE);
        assert_eq!(transform.rotation, SimpleRotation::QuarterCounterclockwise.angle());
    }

    #[test]
    fn test_half_rotation_moves_top_left_to_bottom_right() {
        let mut slice = uneven();
        slice.layout(PixelRect::new(0, 0, 40, 30), SimpleRotation::Half);

        let grid = slice.destination_grid().unwrap();
        assert_eq!(grid[0][0], PixelRect::new(0, 0, 3, 4));
        assert_eq!(grid[2][2], PixelRect::new(39, 28, 1, 2));

        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);
        assert_eq!(renderer.command_count(), 9);
        let (position, source, transform) = first_placement(&renderer);
        assert_eq!(source, PixelRect::new(0, 0, 1, 2));
        assert_eq!(position, Vec2::new(39.5, 29.0));
        assert_eq!(transform.scale, Vec2::ONE);
    }

    #[test]
    fn test_single_zero_edge_skips_its_row() {
        let sprite = Sprite::from_rect(TEXTURE, PixelRect::new(0, 0, 24, 24))
            .with_fixed_edges(Edges::new(4, 0, 4, 4));
        let mut slice = NineSlice::new(sprite);
        slice.layout(PixelRect::new(0, 0, 50, 50), SimpleRotation::None);

        let mut renderer = UiRenderer::new();
        slice.draw(&mut renderer, Color::WHITE);
        assert_eq!(renderer.command_count(), 6);
        assert!(renderer.commands().iter().all(|command| matches!(
            command,
            RenderCommand::Texture { destination, .. }
                if destination.y >= 0.0 && destination.height > 0.0
        )));
    }
}
