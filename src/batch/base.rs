use std::fmt;

use tracing::{debug, instrument};

use crate::{
    blend::{BlendMode, BufferUsage},
    buffer::{BatchBuffers, BufferLayout, PrimitiveKind},
    device::{MatrixUniform, Topology},
    effect::{Effect, EffectFlags},
    graphics::{Graphics, GraphicsState},
    math::Transform,
    texture::Texture,
    vertex::Vertex,
    Error, Result,
};

/// Per-batch behavior run while a flush sets up device state.
pub trait FlushHooks {
    /// Called after the effect, blend mode, world matrix, and texture are
    /// applied and before any vertex data is bound.
    fn on_set_effect(
        &self,
        _graphics: &mut GraphicsState,
        _effect: &Effect,
        _texture: Option<&Texture>,
    ) {
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl FlushHooks for NoHooks {}

/// The state captured by `begin()`.
#[derive(Debug, Clone)]
pub struct DrawingParams {
    /// How the batch blends into the target.
    pub blend_mode: BlendMode,
    /// The effect everything in the scope is drawn with.
    pub effect: Effect,
    /// The world matrix.
    pub transform: Transform,
    /// Render state overrides applied with the effect.
    pub override_flags: EffectFlags,
    /// Whether vertex colors are written and bound.
    pub has_vertex_color: bool,
    /// The texture every vertex currently in the buffers samples.
    pub texture: Option<Texture>,
}

/// The state machine, buffers, and flush protocol shared by every batch.
pub struct BatchCore {
    graphics: Graphics,
    buffers: Option<BatchBuffers>,
    params: Option<DrawingParams>,
    topology: Topology,
    usage: BufferUsage,
    drawing: bool,
    frozen: bool,
    dirty: bool,
    textured: bool,
    on_overflow: Option<Box<dyn FnMut()>>,
}

impl fmt::Debug for BatchCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchCore")
            .field("buffers", &self.buffers)
            .field("params", &self.params)
            .field("topology", &self.topology)
            .field("usage", &self.usage)
            .field("drawing", &self.drawing)
            .field("frozen", &self.frozen)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl BatchCore {
    /// Allocates buffers for `capacity` primitives of `kind`. Textured batches
    /// skip draw calls while their texture is missing or not loaded.
    pub fn new(
        graphics: &Graphics,
        kind: PrimitiveKind,
        capacity: usize,
        layout: BufferLayout,
        textured: bool,
    ) -> Self {
        let buffers = {
            let mut state = graphics.state_mut();
            BatchBuffers::new(state.device_mut(), kind, capacity, layout)
        };
        let topology = match kind {
            PrimitiveKind::Quads | PrimitiveKind::Triangles => Topology::Triangles,
            PrimitiveKind::Lines => Topology::Lines,
        };
        Self {
            graphics: graphics.clone(),
            buffers: Some(buffers),
            params: None,
            topology,
            usage: BufferUsage::default(),
            drawing: false,
            frozen: false,
            dirty: false,
            textured,
            on_overflow: None,
        }
    }

    /// The graphics instance this batch draws through.
    #[must_use]
    pub const fn graphics(&self) -> &Graphics {
        &self.graphics
    }

    /// The buffers, unless the batch was destroyed.
    #[must_use]
    pub const fn buffers(&self) -> Option<&BatchBuffers> {
        self.buffers.as_ref()
    }

    /// The parameters captured by `begin()`.
    #[must_use]
    pub const fn params(&self) -> Option<&DrawingParams> {
        self.params.as_ref()
    }

    /// Returns true between `begin()` and `end()`.
    #[must_use]
    pub const fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Returns true once `make_static()` froze the batch.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.frozen
    }

    /// Returns true once `destroy()` released the buffers.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.buffers.is_none()
    }

    /// The upload hint passed to the device.
    #[must_use]
    pub const fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// The number of primitives written since the last flush.
    #[must_use]
    pub fn primitives(&self) -> usize {
        self.buffers.as_ref().map_or(0, BatchBuffers::primitives)
    }

    /// The number of primitives that fit before a flush is forced.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffers.as_ref().map_or(0, BatchBuffers::capacity)
    }

    /// Returns true if the buffers have a color stream and the current effect
    /// reads it.
    #[must_use]
    pub fn writes_colors(&self) -> bool {
        let has_stream = self.buffers.as_ref().map_or(false, BatchBuffers::has_colors);
        has_stream
            && self
                .params
                .as_ref()
                .map_or(false, |params| params.has_vertex_color)
    }

    pub(crate) fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }

    pub(crate) fn set_usage(&mut self, usage: BufferUsage) {
        self.usage = usage;
    }

    pub(crate) fn set_on_overflow(&mut self, callback: Option<Box<dyn FnMut()>>) {
        self.on_overflow = callback;
    }

    /// Fails unless the batch is still alive.
    pub fn validate_alive(&self) -> Result<()> {
        if self.is_destroyed() {
            Err(Error::Destroyed)
        } else {
            Ok(())
        }
    }

    /// Fails unless the batch is drawing, and when `writable`, also unless it
    /// can still accept new primitives.
    pub fn validate_drawing(&self, writable: bool) -> Result<()> {
        self.validate_alive()?;
        if !self.drawing {
            return Err(Error::NotDrawing);
        }
        if writable && self.frozen {
            return Err(Error::Static);
        }
        Ok(())
    }

    pub(crate) fn begin(
        &mut self,
        blend_mode: Option<BlendMode>,
        effect: Effect,
        transform: Option<Transform>,
        override_flags: EffectFlags,
    ) -> Result<()> {
        if self.drawing {
            return Err(Error::AlreadyDrawing);
        }
        self.validate_alive()?;

        let texture = self.params.take().and_then(|params| params.texture);
        let blend_mode = blend_mode.unwrap_or_else(|| self.graphics.default_blend_mode());
        self.params = Some(DrawingParams {
            blend_mode,
            has_vertex_color: effect.has_vertex_color(),
            effect,
            transform: transform.unwrap_or_else(Transform::identity),
            override_flags,
            texture,
        });
        self.drawing = true;
        Ok(())
    }

    pub(crate) fn end(&mut self, hooks: &dyn FlushHooks, draw: bool) -> Result<()> {
        self.validate_drawing(false)?;
        if draw {
            self.draw(hooks)?;
        }
        if !self.frozen {
            self.reset_buffers();
            self.params = None;
        }
        self.drawing = false;
        Ok(())
    }

    pub(crate) fn clear(&mut self) -> Result<()> {
        self.validate_alive()?;
        if self.frozen {
            return Err(Error::Static);
        }
        self.reset_buffers();
        Ok(())
    }

    pub(crate) fn make_static(&mut self) -> Result<()> {
        self.validate_drawing(false)?;
        self.usage = BufferUsage::Static;
        self.frozen = true;
        Ok(())
    }

    pub(crate) fn destroy(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            let mut state = self.graphics.state_mut();
            buffers.destroy(state.device_mut());
        }
        self.params = None;
        self.drawing = false;
    }

    fn reset_buffers(&mut self) {
        if let Some(buffers) = &mut self.buffers {
            buffers.clear();
        }
        self.dirty = false;
    }

    /// Makes `texture` the active texture, flushing whatever was drawn with a
    /// different one first. Regions of the same atlas count as the same
    /// texture.
    pub fn update_texture(
        &mut self,
        hooks: &dyn FlushHooks,
        texture: Option<&Texture>,
    ) -> Result<()> {
        let changed = match self.params.as_ref().and_then(|params| params.texture.as_ref()) {
            Some(current) => texture.map_or(true, |texture| !current.same_source(texture)),
            None => false,
        };
        if changed {
            debug!("texture changed, flushing batch");
            self.draw(hooks)?;
            self.reset_buffers();
        }
        if let Some(params) = &mut self.params {
            params.texture = texture.cloned();
        }
        Ok(())
    }

    /// Appends `vertices` as `primitives` new primitives. The write is atomic:
    /// if the vertices don't fit nothing is written. Once the primitive count
    /// reaches capacity the overflow protocol runs.
    pub fn push(
        &mut self,
        hooks: &dyn FlushHooks,
        vertices: &[Vertex],
        primitives: usize,
    ) -> Result<()> {
        let write_colors = self.writes_colors();
        let buffers = self.buffers.as_mut().ok_or(Error::Destroyed)?;
        buffers.write(vertices, write_colors)?;
        buffers.add_primitives(primitives);
        self.dirty = true;
        if buffers.is_full() {
            self.overflow(hooks)?;
        }
        Ok(())
    }

    /// Notifies the overflow callback, then draws and clears the buffers.
    /// The scope stays open.
    pub fn overflow(&mut self, hooks: &dyn FlushHooks) -> Result<()> {
        debug!(primitives = self.primitives(), "batch full, flushing");
        if let Some(callback) = &mut self.on_overflow {
            callback();
        }
        self.draw(hooks)?;
        self.reset_buffers();
        Ok(())
    }

    /// Issues one draw call for everything written since the last flush.
    #[instrument(name = "BatchCore::draw", level = "trace", skip(self, hooks))]
    pub fn draw(&mut self, hooks: &dyn FlushHooks) -> Result<()> {
        self.validate_drawing(false)?;
        let (params, buffers) = match (&self.params, &mut self.buffers) {
            (Some(params), Some(buffers)) => (params, buffers),
            _ => return Err(Error::NotDrawing),
        };

        if self.textured && !params.texture.as_ref().map_or(false, Texture::is_valid) {
            return Ok(());
        }
        // A re-seeded line strip holds one vertex and no primitives.
        let vertices = buffers.vertices();
        if vertices == 0 || buffers.primitives() == 0 {
            return Ok(());
        }

        let mut state = self.graphics.state_mut();
        state.use_effect(&params.effect, params.override_flags);
        state.set_blend_mode(params.blend_mode);
        state.set_matrix(&params.effect, MatrixUniform::World, &params.transform);
        if let Some(texture) = &params.texture {
            state.set_active_texture(texture);
        }
        hooks.on_set_effect(&mut state, &params.effect, params.texture.as_ref());

        let use_colors = params.has_vertex_color;
        buffers.bind(
            state.device_mut(),
            &params.effect,
            self.usage,
            self.dirty,
            use_colors,
        );

        let primitives = buffers.primitives();
        let (count, quads, polygons) = match buffers.kind() {
            PrimitiveKind::Quads => (primitives * 6, primitives, 0),
            PrimitiveKind::Triangles => (vertices, 0, primitives),
            PrimitiveKind::Lines => (vertices, 0, vertices / 2),
        };
        let indices = buffers.indices();
        let (index_buffer, format) = (indices.gpu_buffer(), indices.format());
        state
            .device_mut()
            .draw_elements(self.topology, index_buffer, format, count);
        state.record_draw(quads, polygons);
        drop(state);

        self.dirty = false;
        if self.frozen {
            buffers.release_mirrors();
        }
        Ok(())
    }
}

impl Drop for BatchCore {
    fn drop(&mut self) {
        self.destroy();
    }
}
