use tracing::warn;

use super::{
    BatchCore, DrawBatch, FlushHooks, NoHooks, SpriteBatchBase, SpriteOptions, DEFAULT_CAPACITY,
};
use crate::{
    buffer::{BufferLayout, PrimitiveKind},
    effect::Effect,
    graphics::Graphics,
    math::{Angle, Point, Rect, Size, Vector},
    sprite::{Sprite, SpriteColor, SpritesGroup},
    texture::Texture,
    vertex::Vertex,
    Result,
};

/// Builds a [`SpriteBatch`].
#[derive(Debug, Clone, Copy)]
#[must_use]
pub struct SpriteBatchBuilder {
    capacity: usize,
    layout: BufferLayout,
}

impl Default for SpriteBatchBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            layout: BufferLayout {
                texture_coords: true,
                colors: true,
                ..BufferLayout::default()
            },
        }
    }
}

impl SpriteBatchBuilder {
    /// Sets how many quads fit before the batch flushes.
    pub const fn capacity(mut self, quads: usize) -> Self {
        self.capacity = quads;
        self
    }

    /// Enables or disables the color stream. Enabled by default.
    pub const fn vertex_color(mut self, enabled: bool) -> Self {
        self.layout.colors = enabled;
        self
    }

    /// Enables or disables the normal stream.
    pub const fn normals(mut self, enabled: bool) -> Self {
        self.layout.normals = enabled;
        self
    }

    /// Enables or disables the binormal stream.
    pub const fn binormals(mut self, enabled: bool) -> Self {
        self.layout.binormals = enabled;
        self
    }

    /// Enables or disables the tangent stream.
    pub const fn tangents(mut self, enabled: bool) -> Self {
        self.layout.tangents = enabled;
        self
    }

    pub(crate) const fn parts(self) -> (usize, BufferLayout) {
        (self.capacity, self.layout)
    }

    /// Allocates the batch's buffers on `graphics`.
    #[must_use]
    pub fn finish(self, graphics: &Graphics) -> SpriteBatch {
        SpriteBatch {
            core: BatchCore::new(
                graphics,
                PrimitiveKind::Quads,
                self.capacity,
                self.layout,
                true,
            ),
            options: SpriteOptions::default(),
        }
    }
}

/// Batches textured 2d quads.
#[derive(Debug)]
pub struct SpriteBatch {
    core: BatchCore,
    /// Placement options.
    pub options: SpriteOptions,
}

impl SpriteBatch {
    /// Creates a batch holding [`DEFAULT_CAPACITY`] quads with vertex colors.
    #[must_use]
    pub fn new(graphics: &Graphics) -> Self {
        Self::build().finish(graphics)
    }

    /// Returns a builder for a batch with custom capacity or streams.
    pub fn build() -> SpriteBatchBuilder {
        SpriteBatchBuilder::default()
    }

    /// Draws a sprite built from the arguments.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_quad(
        &mut self,
        texture: &Texture,
        position: Point,
        size: Size,
        source: Option<Rect>,
        color: impl Into<SpriteColor>,
        rotation: Angle,
        origin: Option<Point>,
        skew: Option<Vector>,
    ) -> Result<()> {
        let mut sprite = Sprite::new(Some(texture.clone()), position, size).with_color(color);
        sprite.source_rectangle = source;
        sprite.rotation = rotation;
        sprite.skew = skew;
        if let Some(origin) = origin {
            sprite.origin = origin;
        }
        self.draw_sprite(&sprite, None, None)
    }

    /// Draws `texture` stretched over `destination`. The quad is anchored at
    /// `origin` (a fraction of the destination size), or its center.
    pub fn draw_rectangle(
        &mut self,
        texture: &Texture,
        destination: Rect,
        source: Option<Rect>,
        color: impl Into<SpriteColor>,
        origin: Option<Point>,
    ) -> Result<()> {
        let origin = origin.unwrap_or_else(|| Point::new(0.5, 0.5));
        let size = destination.size;
        let position =
            destination.origin + Vector::new(size.width * origin.x, size.height * origin.y);
        self.draw_quad(
            texture,
            position,
            size,
            source,
            color,
            Angle::zero(),
            Some(origin),
            None,
        )
    }

    /// Draws every sprite in `group` using the group's transform.
    pub fn draw_sprite_group(
        &mut self,
        group: &SpritesGroup,
        cull_out_of_screen: Option<bool>,
    ) -> Result<()> {
        let transform = group.transform();
        self.draw_sprites(group.sprites(), transform.as_ref(), cull_out_of_screen)
    }

    /// Appends raw vertices sampling `texture`, four per quad. Writes nothing
    /// and logs a warning if the vertex count isn't a multiple of four.
    pub fn draw_vertices(&mut self, texture: &Texture, vertices: &[Vertex]) -> Result<()> {
        self.core.validate_drawing(true)?;
        if vertices.len() % 4 != 0 {
            warn!(
                count = vertices.len(),
                "sprite vertices must come in groups of 4"
            );
            return Ok(());
        }

        self.core.update_texture(&NoHooks, Some(texture))?;
        for quad in vertices.chunks_exact(4) {
            self.core.push(&NoHooks, quad, 1)?;
        }
        Ok(())
    }
}

impl DrawBatch for SpriteBatch {
    fn core(&self) -> &BatchCore {
        &self.core
    }

    fn parts_mut(&mut self) -> (&mut BatchCore, &dyn FlushHooks) {
        (&mut self.core, &NoHooks)
    }

    fn default_effect(&self) -> Effect {
        let effects = self.core.graphics().builtin_effects();
        if self.supports_vertex_color() {
            effects.sprites
        } else {
            effects.sprites_no_vertex_color
        }
    }
}

impl SpriteBatchBase for SpriteBatch {
    fn sprite_options(&self) -> SpriteOptions {
        self.options
    }
}
