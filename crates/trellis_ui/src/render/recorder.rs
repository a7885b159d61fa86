//! Command-recording sprite batch.
//!
//! Applies transforms at record time so every command is in screen coordinates,
//! then groups commands into batches sharing clip and blend state.

use trellis_core::{Bounds, PixelRect, Vec2};

use super::{BlendMode, DrawTransform, Font, SpriteBatch, Texture};
use crate::style::Color;

/// A render command in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Textured quad stretched into a rectangle.
    Texture {
        /// Texture handle.
        texture: Texture,
        /// Destination rectangle.
        destination: Bounds,
        /// Source rectangle within the texture.
        source: PixelRect,
        /// Tint color.
        tint: Color,
    },
    /// Textured quad placed by position, origin, rotation and scale.
    TransformedTexture {
        /// Texture handle.
        texture: Texture,
        /// Screen position of the origin.
        position: Vec2,
        /// Source rectangle within the texture.
        source: PixelRect,
        /// Tint color.
        tint: Color,
        /// Rotation, origin, scale and mirroring.
        transform: DrawTransform,
    },
    /// Text.
    Text {
        /// Host font identifier.
        font_id: u32,
        /// Text content.
        text: String,
        /// Top-left position.
        position: Vec2,
        /// Text color.
        color: Color,
    },
    /// Scissor rect (clip children).
    PushClip {
        /// Clip bounds, already intersected with the enclosing clip.
        bounds: Bounds,
    },
    /// Pop scissor rect.
    PopClip,
    /// Blend state change.
    SetBlend {
        /// New blend mode.
        mode: BlendMode,
    },
}

/// Draw commands sharing the same clip and blend state.
#[derive(Debug, Clone, PartialEq)]
pub struct UiBatch {
    /// Commands in this batch (draws only).
    pub commands: Vec<RenderCommand>,
    /// Clip rect (if any).
    pub clip: Option<Bounds>,
    /// Blend mode.
    pub blend: BlendMode,
}

/// Sprite batch that records commands for later GPU submission.
#[derive(Debug, Default)]
pub struct UiRenderer {
    /// All commands from the frame.
    commands: Vec<RenderCommand>,
    /// Current translation.
    offset: Vec2,
    /// Saved translations.
    transform_stack: Vec<Vec2>,
    /// Clip stack, in screen coordinates.
    clip_stack: Vec<Bounds>,
    /// Blend stack.
    blend_stack: Vec<BlendMode>,
}

impl UiRenderer {
    /// Creates a new UI renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(1024),
            ..Self::default()
        }
    }

    /// Begins a new frame.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
        self.offset = Vec2::ZERO;
        self.transform_stack.clear();
        self.clip_stack.clear();
        self.blend_stack.clear();
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Returns the total command count.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    /// Current translation from local to screen coordinates.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Returns the current clip rect.
    #[must_use]
    pub fn current_clip(&self) -> Option<Bounds> {
        self.clip_stack.last().copied()
    }

    /// Returns the current blend mode.
    #[must_use]
    pub fn current_blend(&self) -> BlendMode {
        self.blend_stack.last().copied().unwrap_or_default()
    }

    /// Ends the frame, grouping draw commands by clip and blend state.
    pub fn end_frame(&mut self) -> Vec<UiBatch> {
        let mut batches = Vec::new();
        let mut clips: Vec<Bounds> = Vec::new();
        let mut blend = BlendMode::default();
        let mut current = UiBatch {
            commands: Vec::new(),
            clip: None,
            blend,
        };

        for command in self.commands.drain(..) {
            match command {
                RenderCommand::PushClip { bounds } => clips.push(bounds),
                RenderCommand::PopClip => {
                    clips.pop();
                }
                RenderCommand::SetBlend { mode } => blend = mode,
                draw => {
                    let clip = clips.last().copied();
                    if current.clip != clip || current.blend != blend {
                        if !current.commands.is_empty() {
                            batches.push(current);
                        }
                        current = UiBatch {
                            commands: Vec::new(),
                            clip,
                            blend,
                        };
                    }
                    current.commands.push(draw);
                }
            }
        }
        if !current.commands.is_empty() {
            batches.push(current);
        }
        batches
    }

    /// Builds two triangles per textured command.
    ///
    /// UVs are normalized against each command's texture size.
    #[must_use]
    pub fn vertices(&self) -> Vec<UiVertex> {
        let mut vertices = Vec::with_capacity(self.commands.len() * 6);
        for command in &self.commands {
            let (texture, source, tint, corners) = match command {
                RenderCommand::Texture {
                    texture,
                    destination,
                    source,
                    tint,
                } => {
                    let corners = [
                        Vec2::new(destination.x, destination.y),
                        Vec2::new(destination.right(), destination.y),
                        Vec2::new(destination.right(), destination.bottom()),
                        Vec2::new(destination.x, destination.bottom()),
                    ];
                    (*texture, *source, *tint, corners)
                }
                RenderCommand::TransformedTexture {
                    texture,
                    position,
                    source,
                    tint,
                    transform,
                } => (*texture, *source, *tint, transformed_corners(*position, *source, transform)),
                _ => continue,
            };
            let [u0, v0, u1, v1] = uv_rect(texture, source);
            let color = tint.to_array();
            let quad = [
                UiVertex::new(corners[0], [u0, v0], color),
                UiVertex::new(corners[1], [u1, v0], color),
                UiVertex::new(corners[2], [u1, v1], color),
                UiVertex::new(corners[3], [u0, v1], color),
            ];
            vertices.extend_from_slice(&[quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]);
        }
        vertices
    }

    fn resolve_source(texture: Texture, source: Option<PixelRect>) -> PixelRect {
        source.unwrap_or_else(|| texture.bounds())
    }
}

#[allow(clippy::cast_precision_loss)]
fn uv_rect(texture: Texture, source: PixelRect) -> [f32; 4] {
    if texture.width <= 0 || texture.height <= 0 {
        return [0.0, 0.0, 1.0, 1.0];
    }
    let width = texture.width as f32;
    let height = texture.height as f32;
    [
        source.x as f32 / width,
        source.y as f32 / height,
        source.right() as f32 / width,
        source.bottom() as f32 / height,
    ]
}

fn transformed_corners(position: Vec2, source: PixelRect, transform: &DrawTransform) -> [Vec2; 4] {
    let size = source.size();
    let (sin, cos) = transform.rotation.sin_cos();
    let mut local = [
        Vec2::ZERO,
        Vec2::new(size.x, 0.0),
        size,
        Vec2::new(0.0, size.y),
    ];
    if transform.effects.flip_horizontal {
        local.swap(0, 1);
        local.swap(2, 3);
    }
    if transform.effects.flip_vertical {
        local.swap(0, 3);
        local.swap(1, 2);
    }
    local.map(|corner| {
        let scaled = (corner - transform.origin).scale(transform.scale);
        position + Vec2::new(scaled.x * cos - scaled.y * sin, scaled.x * sin + scaled.y * cos)
    })
}

impl SpriteBatch for UiRenderer {
    fn draw_at(
        &mut self,
        texture: Texture,
        position: Vec2,
        source: Option<PixelRect>,
        tint: Color,
        transform: DrawTransform,
    ) {
        self.commands.push(RenderCommand::TransformedTexture {
            texture,
            position: position + self.offset,
            source: Self::resolve_source(texture, source),
            tint,
            transform,
        });
    }

    fn draw_rect(
        &mut self,
        texture: Texture,
        destination: Bounds,
        source: Option<PixelRect>,
        tint: Color,
    ) {
        self.commands.push(RenderCommand::Texture {
            texture,
            destination: destination.offset(self.offset),
            source: Self::resolve_source(texture, source),
            tint,
        });
    }

    fn draw_string(&mut self, font: &dyn Font, text: &str, position: Vec2, color: Color) {
        self.commands.push(RenderCommand::Text {
            font_id: font.id(),
            text: text.to_string(),
            position: position + self.offset,
            color,
        });
    }

    fn translate(&mut self, offset: Vec2) {
        self.offset += offset;
    }

    fn push_transform(&mut self) {
        self.transform_stack.push(self.offset);
    }

    fn pop_transform(&mut self) {
        if let Some(offset) = self.transform_stack.pop() {
            self.offset = offset;
        }
    }

    fn push_clip(&mut self, bounds: Bounds) {
        let bounds = bounds.offset(self.offset);
        // Intersect with current clip if any
        let actual_clip = if let Some(current) = self.clip_stack.last() {
            current.intersection(&bounds).unwrap_or(Bounds::ZERO)
        } else {
            bounds
        };

        self.clip_stack.push(actual_clip);
        self.commands.push(RenderCommand::PushClip { bounds: actual_clip });
    }

    fn pop_clip(&mut self) {
        self.clip_stack.pop();
        self.commands.push(RenderCommand::PopClip);
    }

    fn push_blend(&mut self, mode: BlendMode) {
        self.blend_stack.push(mode);
        self.commands.push(RenderCommand::SetBlend { mode });
    }

    fn pop_blend(&mut self) {
        self.blend_stack.pop();
        let mode = self.current_blend();
        self.commands.push(RenderCommand::SetBlend { mode });
    }
}

/// Vertex for UI rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UiVertex {
    /// Position (x, y).
    pub position: [f32; 2],
    /// UV coordinates.
    pub uv: [f32; 2],
    /// Color (RGBA).
    pub color: [f32; 4],
}

impl UiVertex {
    /// Creates a new vertex.
    #[must_use]
    pub const fn new(position: Vec2, uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position: [position.x, position.y],
            uv,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTURE: Texture = Texture::new(7, 64, 32);

    #[test]
    fn test_renderer_applies_translation() {
        let mut renderer = UiRenderer::new();
        renderer.translate(Vec2::new(10.0, 20.0));
        renderer.draw_rect(TEXTURE, Bounds::new(1.0, 2.0, 8.0, 8.0), None, Color::WHITE);

        assert_eq!(
            renderer.commands()[0],
            RenderCommand::Texture {
                texture: TEXTURE,
                destination: Bounds::new(11.0, 22.0, 8.0, 8.0),
                source: PixelRect::new(0, 0, 64, 32),
                tint: Color::WHITE,
            }
        );
    }

    #[test]
    fn test_scopes_restore_state() {
        let mut renderer = UiRenderer::new();
        {
            let batch: &mut dyn SpriteBatch = &mut renderer;
            let mut saved = batch.save_transform();
            saved.translate(Vec2::new(5.0, 5.0));
            let mut clipped = saved.clip(Bounds::new(0.0, 0.0, 10.0, 10.0));
            let _blended = clipped.blend(BlendMode::Additive);
        }
        assert_eq!(renderer.offset(), Vec2::ZERO);
        assert!(renderer.current_clip().is_none());
        assert_eq!(renderer.current_blend(), BlendMode::Alpha);
    }

    #[test]
    fn test_clip_scope_restored_on_unwind() {
        let mut renderer = UiRenderer::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let batch: &mut dyn SpriteBatch = &mut renderer;
            let _clip = batch.clip(Bounds::new(0.0, 0.0, 10.0, 10.0));
            panic!("draw failed");
        }));
        assert!(result.is_err());
        assert!(renderer.current_clip().is_none());
        assert_eq!(renderer.commands().last(), Some(&RenderCommand::PopClip));
    }

    #[test]
    fn test_nested_clip_intersects() {
        let mut renderer = UiRenderer::new();
        renderer.push_clip(Bounds::new(0.0, 0.0, 100.0, 100.0));
        renderer.translate(Vec2::new(50.0, 50.0));
        renderer.push_clip(Bounds::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(renderer.current_clip(), Some(Bounds::new(50.0, 50.0, 50.0, 50.0)));
    }

    #[test]
    fn test_end_frame_groups_by_clip() {
        let mut renderer = UiRenderer::new();
        renderer.draw_rect(TEXTURE, Bounds::new(0.0, 0.0, 1.0, 1.0), None, Color::WHITE);
        renderer.push_clip(Bounds::new(0.0, 0.0, 10.0, 10.0));
        renderer.draw_rect(TEXTURE, Bounds::new(0.0, 0.0, 1.0, 1.0), None, Color::WHITE);
        renderer.draw_rect(TEXTURE, Bounds::new(1.0, 0.0, 1.0, 1.0), None, Color::WHITE);
        renderer.pop_clip();

        let batches = renderer.end_frame();
        assert_eq!(batches.len(), 2);
        assert!(batches[0].clip.is_none());
        assert_eq!(batches[1].commands.len(), 2);
        assert_eq!(batches[1].clip, Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(renderer.command_count(), 0);
    }

    #[test]
    fn test_vertex_export() {
        let mut renderer = UiRenderer::new();
        renderer.draw_rect(
            TEXTURE,
            Bounds::new(0.0, 0.0, 16.0, 16.0),
            Some(PixelRect::new(32, 0, 32, 16)),
            Color::WHITE,
        );
        let vertices = renderer.vertices();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].uv, [0.5, 0.0]);
        assert_eq!(vertices[2].position, [16.0, 16.0]);
        assert_eq!(vertices[2].uv, [1.0, 0.5]);

        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 6 * std::mem::size_of::<UiVertex>());
    }

    #[test]
    fn test_transformed_vertices_rotate_about_origin() {
        let mut renderer = UiRenderer::new();
        renderer.draw_at(
            TEXTURE,
            Vec2::new(100.0, 100.0),
            Some(PixelRect::new(0, 0, 10, 20)),
            Color::WHITE,
            DrawTransform {
                rotation: std::f32::consts::PI,
                origin: Vec2::new(5.0, 10.0),
                ..DrawTransform::default()
            },
        );
        let vertices = renderer.vertices();
        // Top-left corner lands at bottom-right after a half turn.
        assert!((vertices[0].position[0] - 105.0).abs() < 1e-3);
        assert!((vertices[0].position[1] - 110.0).abs() < 1e-3);
    }
}
