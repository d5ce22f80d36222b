use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    blend::BlendMode,
    camera::Camera,
    color::Color,
    device::{Device, MatrixUniform},
    effect::{BuiltinEffects, Effect, EffectFlags},
    math::{Point, Rect, Size, Transform},
    texture::{Texture, TextureFilter, TextureWrap},
};

/// Settings a [`Graphics`] instance starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphicsConfig {
    /// Blend mode batches use when `begin()` isn't given one.
    pub default_blend_mode: BlendMode,
    /// Filter used for textures without their own filter.
    pub default_texture_filter: TextureFilter,
    /// Wrap mode used for textures without their own wrap mode.
    pub default_texture_wrap: TextureWrap,
    /// Size of the render target in pixels.
    pub target_size: Size<u32>,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            default_blend_mode: BlendMode::AlphaBlend,
            default_texture_filter: TextureFilter::Nearest,
            default_texture_wrap: TextureWrap::Clamp,
            target_size: Size::new(800, 600),
        }
    }
}

/// Counters accumulated by every batch sharing a [`Graphics`] instance.
/// Reset by [`Graphics::start_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Number of draw calls issued.
    pub draw_calls: usize,
    /// Number of sprite quads drawn.
    pub quads_drawn: usize,
    /// Number of shape triangles and line segments drawn.
    pub shape_polygons_drawn: usize,
}

/// Device-wide render state shared by every batch created from the same
/// [`Graphics`].
pub struct GraphicsState {
    device: Box<dyn Device>,
    config: GraphicsConfig,
    builtin_effects: BuiltinEffects,
    active_effect: Option<(Effect, EffectFlags)>,
    last_blend_mode: Option<BlendMode>,
    bound_texture: Option<u64>,
    projection: Transform,
    viewport: Option<Rect>,
    target_size: Size<u32>,
    stats: FrameStats,
}

impl fmt::Debug for GraphicsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsState")
            .field("config", &self.config)
            .field("active_effect", &self.active_effect)
            .field("last_blend_mode", &self.last_blend_mode)
            .field("bound_texture", &self.bound_texture)
            .field("viewport", &self.viewport)
            .field("target_size", &self.target_size)
            .field("stats", &self.stats)
            .finish()
    }
}

impl GraphicsState {
    /// Direct access to the device.
    pub fn device_mut(&mut self) -> &mut dyn Device {
        self.device.as_mut()
    }

    /// The effects created with this instance.
    #[must_use]
    pub const fn builtin_effects(&self) -> &BuiltinEffects {
        &self.builtin_effects
    }

    /// The settings this instance was created with.
    #[must_use]
    pub const fn config(&self) -> &GraphicsConfig {
        &self.config
    }

    /// The current projection matrix.
    #[must_use]
    pub const fn projection(&self) -> &Transform {
        &self.projection
    }

    /// The currently active effect, if any.
    #[must_use]
    pub fn active_effect(&self) -> Option<&Effect> {
        self.active_effect.as_ref().map(|(effect, _)| effect)
    }

    /// Activates `effect` with `flags`. Nothing is sent to the device if the
    /// same effect is already active with the same flags. Switching effects
    /// uploads the current projection to the new effect.
    pub fn use_effect(&mut self, effect: &Effect, flags: EffectFlags) {
        if let Some((active, active_flags)) = &self.active_effect {
            if active == effect && *active_flags == flags {
                return;
            }
        }

        self.device.use_effect(effect, flags);
        self.device
            .set_matrix(effect, MatrixUniform::Projection, &self.projection);
        self.active_effect = Some((effect.clone(), flags));
        self.bound_texture = None;
    }

    /// Applies `mode` unless it is already the active blend mode.
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        if self.last_blend_mode == Some(mode) {
            return;
        }
        self.device.set_blend_mode(mode);
        self.last_blend_mode = Some(mode);
    }

    /// Binds `texture` to the active effect unless its source is already
    /// bound.
    pub fn set_active_texture(&mut self, texture: &Texture) {
        let effect = match &self.active_effect {
            Some((effect, _)) => effect.clone(),
            None => return,
        };
        if self.bound_texture == Some(texture.id()) {
            return;
        }

        let filter = texture
            .filter()
            .unwrap_or(self.config.default_texture_filter);
        let wrap = texture.wrap().unwrap_or(self.config.default_texture_wrap);
        self.device.bind_texture(&effect, texture, filter, wrap);
        self.bound_texture = Some(texture.id());
    }

    /// Uploads a matrix uniform to `effect`.
    pub fn set_matrix(&mut self, effect: &Effect, uniform: MatrixUniform, matrix: &Transform) {
        self.device.set_matrix(effect, uniform, matrix);
    }

    /// Uploads outline uniforms to `effect`.
    pub fn set_outline(&mut self, effect: &Effect, weight: f32, color: Color) {
        self.device.set_outline(effect, weight, color);
    }

    /// Applies the camera's viewport and projection. The active effect, if
    /// any, receives the new projection immediately.
    pub fn apply_camera(&mut self, camera: &Camera) {
        self.viewport = camera.viewport();
        let region = self.rendering_region();
        self.device.set_viewport(region);
        self.projection = *camera.projection();
        if let Some((effect, _)) = &self.active_effect {
            self.device
                .set_matrix(effect, MatrixUniform::Projection, &self.projection);
        }
    }

    /// The region batches render into. This is the viewport when one is set,
    /// otherwise the whole target.
    #[must_use]
    pub fn rendering_region(&self) -> Rect {
        self.viewport.unwrap_or_else(|| {
            Rect::new(Point::zero(), self.target_size.to_f32())
        })
    }

    /// The counters accumulated since the last [`Graphics::start_frame`].
    #[must_use]
    pub const fn stats(&self) -> FrameStats {
        self.stats
    }

    pub(crate) fn record_draw(&mut self, quads: usize, polygons: usize) {
        self.stats.draw_calls += 1;
        self.stats.quads_drawn += quads;
        self.stats.shape_polygons_drawn += polygons;
    }
}

/// A handle to the device and its shared render state. Every batch is
/// created from a `Graphics` and draws through it. Cheap to clone; clones
/// share state.
///
/// Independent instances share nothing, so separate devices or tests never
/// observe each other's cached effect, blend mode, or counters.
#[derive(Clone, Debug)]
pub struct Graphics(Rc<RefCell<GraphicsState>>);

impl Graphics {
    /// Wraps `device` with default settings.
    pub fn new<D: Device + 'static>(device: D) -> Self {
        Self::with_config(device, GraphicsConfig::default())
    }

    /// Wraps `device` using `config`. The default orthographic camera
    /// covering the whole target is applied immediately.
    pub fn with_config<D: Device + 'static>(device: D, config: GraphicsConfig) -> Self {
        let graphics = Self(Rc::new(RefCell::new(GraphicsState {
            device: Box::new(device),
            config,
            builtin_effects: BuiltinEffects::new(),
            active_effect: None,
            last_blend_mode: None,
            bound_texture: None,
            projection: Transform::identity(),
            viewport: None,
            target_size: config.target_size,
            stats: FrameStats::default(),
        })));
        graphics.reset_camera();
        graphics
    }

    /// Borrows the shared state.
    #[must_use]
    pub fn state(&self) -> Ref<'_, GraphicsState> {
        self.0.borrow()
    }

    /// Mutably borrows the shared state.
    #[must_use]
    pub fn state_mut(&self) -> RefMut<'_, GraphicsState> {
        self.0.borrow_mut()
    }

    /// Returns a copy of the builtin effects.
    #[must_use]
    pub fn builtin_effects(&self) -> BuiltinEffects {
        self.state().builtin_effects.clone()
    }

    /// The blend mode batches use when none is given to `begin()`.
    #[must_use]
    pub fn default_blend_mode(&self) -> BlendMode {
        self.state().config.default_blend_mode
    }

    /// Resets per-frame state and counters. Call once at the start of every
    /// frame.
    pub fn start_frame(&self) {
        let mut state = self.state_mut();
        state.last_blend_mode = None;
        state.stats = FrameStats::default();
    }

    /// The counters accumulated since the last [`Graphics::start_frame`].
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.state().stats
    }

    /// Applies `camera` to the device.
    pub fn apply_camera(&self, camera: &Camera) {
        self.state_mut().apply_camera(camera);
    }

    /// Applies an orthographic camera covering the whole target.
    pub fn reset_camera(&self) {
        let size = self.state().target_size.to_f32();
        let camera = Camera::orthographic(Rect::new(Point::zero(), size));
        self.apply_camera(&camera);
    }

    /// Changes the size of the render target and resets the camera.
    pub fn set_target_size(&self, size: Size<u32>) {
        self.state_mut().target_size = size;
        self.reset_camera();
    }

    /// The region batches render into.
    #[must_use]
    pub fn rendering_region(&self) -> Rect {
        self.state().rendering_region()
    }

    /// The size of the region batches render into.
    #[must_use]
    pub fn rendering_size(&self) -> Size {
        self.rendering_region().size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, RecordingDevice};

    #[test]
    fn redundant_state_changes_are_skipped() {
        let device = RecordingDevice::new();
        let log = device.log();
        let graphics = Graphics::new(device);
        let effects = graphics.builtin_effects();
        log.clear();

        let mut state = graphics.state_mut();
        state.use_effect(&effects.sprites, EffectFlags::default());
        state.use_effect(&effects.sprites, EffectFlags::default());
        state.set_blend_mode(BlendMode::Additive);
        state.set_blend_mode(BlendMode::Additive);
        drop(state);

        assert_eq!(
            log.count(|c| matches!(c, DeviceCommand::UseEffect { .. })),
            1
        );
        assert_eq!(
            log.count(|c| matches!(c, DeviceCommand::SetBlendMode(_))),
            1
        );

        // Different override flags activate the effect again.
        graphics
            .state_mut()
            .use_effect(&effects.sprites, EffectFlags::depth());
        assert_eq!(
            log.count(|c| matches!(c, DeviceCommand::UseEffect { .. })),
            2
        );
    }

    #[test]
    fn start_frame_resets_blend_mode_cache() {
        let device = RecordingDevice::new();
        let log = device.log();
        let graphics = Graphics::new(device);
        graphics.state_mut().set_blend_mode(BlendMode::Opaque);
        graphics.start_frame();
        graphics.state_mut().set_blend_mode(BlendMode::Opaque);
        assert_eq!(
            log.count(|c| matches!(c, DeviceCommand::SetBlendMode(_))),
            2
        );
    }

    #[test]
    fn rendering_region_follows_viewport() {
        let graphics = Graphics::new(RecordingDevice::new());
        assert_eq!(graphics.rendering_size(), Size::new(800., 600.));

        let mut camera = Camera::orthographic(Rect::new(Point::zero(), Size::new(100., 100.)));
        let viewport = Rect::new(Point::new(10., 10.), Size::new(100., 100.));
        camera.set_viewport(Some(viewport));
        graphics.apply_camera(&camera);
        assert_eq!(graphics.rendering_region(), viewport);

        graphics.set_target_size(Size::new(320, 200));
        assert_eq!(graphics.rendering_size(), Size::new(320., 200.));
    }
}
