use super::{BatchCore, DrawBatch, FlushHooks};
use crate::{
    color::Color,
    math::{is_identity, Box2D, Point, Rect, Transform},
    sprite::{Corners, Sprite},
    texture::Texture,
    vertex::Vertex,
    Result,
};

/// Placement options shared by the sprite based batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpriteOptions {
    /// Floors every corner to a whole pixel.
    pub snap_pixels: bool,
    /// Skips sprites outside of the rendering region when a draw call
    /// doesn't say otherwise.
    pub cull_out_of_screen: bool,
}

/// Drawing textured quads into a batch that holds four vertices per quad.
pub trait SpriteBatchBase: DrawBatch {
    /// The batch's placement options.
    fn sprite_options(&self) -> SpriteOptions;

    /// Draws one sprite. See [`Self::draw_sprites`].
    fn draw_sprite(
        &mut self,
        sprite: &Sprite,
        transform: Option<&Transform>,
        cull_out_of_screen: Option<bool>,
    ) -> Result<()> {
        self.draw_sprites(std::slice::from_ref(sprite), transform, cull_out_of_screen)
    }

    /// Appends `sprites` in order. A sprite using a different texture than
    /// the one already in the batch flushes the batch first, and a full batch
    /// is flushed as soon as its last quad is written.
    ///
    /// `transform` is applied to every corner. When culling, which defaults
    /// to [`SpriteOptions::cull_out_of_screen`], sprites entirely outside of
    /// the rendering region are skipped.
    fn draw_sprites(
        &mut self,
        sprites: &[Sprite],
        transform: Option<&Transform>,
        cull_out_of_screen: Option<bool>,
    ) -> Result<()> {
        let options = self.sprite_options();
        let (core, hooks) = self.parts_mut();
        push_sprites(core, hooks, options, sprites, transform, cull_out_of_screen)
    }

    /// The number of quads written since the last flush.
    fn quads_in_batch(&self) -> usize {
        self.core().primitives()
    }

    /// The number of quads the batch holds before flushing.
    fn max_quads_count(&self) -> usize {
        self.core().capacity()
    }

    /// Returns true if the batch reached its capacity.
    fn is_full(&self) -> bool {
        self.quads_in_batch() >= self.max_quads_count()
    }

    /// Returns true if the batch allocated a color stream.
    fn supports_vertex_color(&self) -> bool {
        self.core()
            .buffers()
            .map_or(false, |buffers| buffers.has_colors())
    }
}

/// Applies `transform` to every corner, unless it is the identity.
pub(crate) fn transform_corners(corners: &mut Corners, transform: Option<&Transform>) {
    if let Some(transform) = transform.filter(|transform| !is_identity(transform)) {
        for corner in corners.iter_mut() {
            if let Some(moved) = transform.transform_point2d(*corner) {
                *corner = moved;
            }
        }
    }
}

/// Floors every corner to a whole pixel.
pub(crate) fn snap_corners(corners: &mut Corners) {
    for corner in corners.iter_mut() {
        *corner = corner.floor();
    }
}

fn culling_region(core: &BatchCore) -> Box2D {
    let size = core.graphics().rendering_size();
    Rect::new(Point::zero(), size).to_box2d()
}

pub(crate) fn push_sprites(
    core: &mut BatchCore,
    hooks: &dyn FlushHooks,
    options: SpriteOptions,
    sprites: &[Sprite],
    transform: Option<&Transform>,
    cull_out_of_screen: Option<bool>,
) -> Result<()> {
    core.validate_drawing(true)?;
    let region = if cull_out_of_screen.unwrap_or(options.cull_out_of_screen) {
        Some(culling_region(core))
    } else {
        None
    };

    for sprite in sprites {
        let mut corners = sprite.corners();
        transform_corners(&mut corners, transform);

        if let Some(region) = &region {
            let bounds = Box2D::from_points(corners.iter().copied());
            if !bounds.intersects(region) {
                continue;
            }
        }

        if options.snap_pixels {
            snap_corners(&mut corners);
        }

        push_quad(
            core,
            hooks,
            sprite.texture.as_ref(),
            &corners,
            (sprite.z, sprite.z + sprite.depth),
            &sprite.texture_coords(),
            &sprite.color.corners(),
        )?;
    }
    Ok(())
}

/// Writes one quad. The top corners are placed at the first depth and the
/// bottom corners at the second.
pub(crate) fn push_quad(
    core: &mut BatchCore,
    hooks: &dyn FlushHooks,
    texture: Option<&Texture>,
    corners: &Corners,
    (top_z, bottom_z): (f32, f32),
    texture_coords: &Corners,
    colors: &[Color; 4],
) -> Result<()> {
    core.update_texture(hooks, texture)?;

    let mut vertices = [Vertex::new(Point::zero().to_3d(), Color::WHITE); 4];
    for (index, vertex) in vertices.iter_mut().enumerate() {
        let z = if index < 2 { top_z } else { bottom_z };
        *vertex = Vertex::new(corners[index].extend(z), colors[index])
            .with_texture_coord(texture_coords[index]);
    }
    core.push(hooks, &vertices, 1)
}
