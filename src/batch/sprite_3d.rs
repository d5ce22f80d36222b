use super::{BatchCore, DrawBatch, FlushHooks, SpriteBatchBase, SpriteBatchBuilder, SpriteOptions};
use crate::{
    buffer::{BufferLayout, PrimitiveKind},
    camera::Camera,
    device::MatrixUniform,
    effect::Effect,
    graphics::{Graphics, GraphicsState},
    math::{Angle, Point3D},
    texture::Texture,
};

/// Vertical field of view of the default 3d camera.
pub const DEFAULT_FIELD_OF_VIEW: f32 = 45.;
/// Near plane of the default 3d camera.
pub const DEFAULT_NEAR: f32 = 0.1;
/// Far plane of the default 3d camera.
pub const DEFAULT_FAR: f32 = 10_000.;

/// Applies the batch's camera whenever it flushes.
#[derive(Debug, Clone)]
pub struct Sprite3DHooks {
    /// The camera used for every draw call of the batch.
    pub camera: Camera,
}

impl FlushHooks for Sprite3DHooks {
    fn on_set_effect(
        &self,
        graphics: &mut GraphicsState,
        effect: &Effect,
        _texture: Option<&Texture>,
    ) {
        if let Some(view) = self.camera.view() {
            graphics.set_matrix(effect, MatrixUniform::View, view);
        }
        graphics.apply_camera(&self.camera);
    }
}

/// Batches textured quads placed in 3d space and drawn through the batch's
/// own perspective camera.
#[derive(Debug)]
pub struct SpriteBatch3D {
    core: BatchCore,
    hooks: Sprite3DHooks,
    /// Placement options.
    pub options: SpriteOptions,
}

impl SpriteBatch3D {
    /// Creates a batch holding the default number of quads, without
    /// normals, binormals, or tangents.
    #[must_use]
    pub fn new(graphics: &Graphics) -> Self {
        Self::with_builder(graphics, SpriteBatchBuilder::default())
    }

    /// Creates a batch using the capacity and optional streams of `builder`.
    /// Vertex colors are always enabled.
    #[must_use]
    pub fn with_builder(graphics: &Graphics, builder: SpriteBatchBuilder) -> Self {
        let (capacity, layout) = builder.parts();
        let layout = BufferLayout {
            colors: true,
            ..layout
        };
        let mut batch = Self {
            core: BatchCore::new(graphics, PrimitiveKind::Quads, capacity, layout, true),
            hooks: Sprite3DHooks {
                camera: Camera::perspective(
                    Angle::degrees(DEFAULT_FIELD_OF_VIEW),
                    1.,
                    DEFAULT_NEAR,
                    DEFAULT_FAR,
                ),
            },
            options: SpriteOptions::default(),
        };
        batch.set_perspective_camera(None, None, None, None);
        batch
            .hooks
            .camera
            .set_view_look_at(Point3D::new(0., 0., -500.), Point3D::origin());
        batch
    }

    /// The camera used when drawing.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.hooks.camera
    }

    /// Mutable access to the camera used when drawing.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.hooks.camera
    }

    /// Replaces the camera used when drawing.
    pub fn set_camera(&mut self, camera: Camera) {
        self.hooks.camera = camera;
    }

    /// Gives the camera a perspective projection. Missing values default to
    /// a 45 degree field of view, the aspect ratio of the rendering region,
    /// and clip planes at 0.1 and 10000.
    pub fn set_perspective_camera(
        &mut self,
        field_of_view: Option<Angle>,
        aspect_ratio: Option<f32>,
        near: Option<f32>,
        far: Option<f32>,
    ) {
        let aspect_ratio = aspect_ratio.unwrap_or_else(|| {
            let size = self.core.graphics().rendering_size();
            if size.height > 0. {
                size.width / size.height
            } else {
                1.
            }
        });
        self.hooks.camera.set_perspective(
            field_of_view.unwrap_or_else(|| Angle::degrees(DEFAULT_FIELD_OF_VIEW)),
            aspect_ratio,
            near.unwrap_or(DEFAULT_NEAR),
            far.unwrap_or(DEFAULT_FAR),
        );
    }
}

impl DrawBatch for SpriteBatch3D {
    fn core(&self) -> &BatchCore {
        &self.core
    }

    fn parts_mut(&mut self) -> (&mut BatchCore, &dyn FlushHooks) {
        (&mut self.core, &self.hooks)
    }

    fn default_effect(&self) -> Effect {
        self.core.graphics().builtin_effects().sprites_3d
    }
}

impl SpriteBatchBase for SpriteBatch3D {
    fn sprite_options(&self) -> SpriteOptions {
        self.options
    }

    fn supports_vertex_color(&self) -> bool {
        true
    }
}
