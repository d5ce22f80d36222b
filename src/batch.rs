use crate::{
    blend::{BlendMode, BufferUsage},
    effect::{Effect, EffectFlags},
    math::Transform,
    Result,
};

mod base;
mod lines;
mod shapes;
mod sprite;
mod sprite_3d;
mod sprite_base;
mod text;

pub use self::{
    base::{BatchCore, DrawingParams, FlushHooks, NoHooks},
    lines::LinesBatch,
    shapes::{ShapesBatch, DEFAULT_CIRCLE_SEGMENTS},
    sprite::{SpriteBatch, SpriteBatchBuilder},
    sprite_3d::{Sprite3DHooks, SpriteBatch3D, DEFAULT_FAR, DEFAULT_FIELD_OF_VIEW, DEFAULT_NEAR},
    sprite_base::{SpriteBatchBase, SpriteOptions},
    text::{TextHooks, TextSpriteBatch},
};

/// The number of primitives a batch holds when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 500;

/// The lifecycle every batch shares: `begin()`, any number of draws and
/// `present()` calls, then `end()`.
///
/// Implementors only provide access to their [`BatchCore`], their
/// [`FlushHooks`], and their default effect.
pub trait DrawBatch {
    /// The shared batch state.
    fn core(&self) -> &BatchCore;

    /// The shared batch state and the hooks run when flushing.
    fn parts_mut(&mut self) -> (&mut BatchCore, &dyn FlushHooks);

    /// The effect `begin()` uses when none is given.
    fn default_effect(&self) -> Effect;

    /// Opens a drawing scope. Anything left as `None` uses the batch
    /// defaults: the configured default blend mode, [`Self::default_effect`],
    /// the identity transform, and no effect overrides.
    fn begin(
        &mut self,
        blend_mode: Option<BlendMode>,
        effect: Option<&Effect>,
        transform: Option<Transform>,
        override_flags: Option<EffectFlags>,
    ) -> Result<()> {
        let effect = effect.cloned().unwrap_or_else(|| self.default_effect());
        let (core, _) = self.parts_mut();
        core.begin(
            blend_mode,
            effect,
            transform,
            override_flags.unwrap_or_default(),
        )
    }

    /// Opens a drawing scope with every default.
    fn begin_default(&mut self) -> Result<()> {
        self.begin(None, None, None, None)
    }

    /// Draws what remains and closes the scope. Unless the batch is static,
    /// the buffers are cleared.
    fn end(&mut self) -> Result<()> {
        let (core, hooks) = self.parts_mut();
        core.end(hooks, true)
    }

    /// Closes the scope without drawing. Unless the batch is static, the
    /// buffers are cleared.
    fn end_without_draw(&mut self) -> Result<()> {
        let (core, hooks) = self.parts_mut();
        core.end(hooks, false)
    }

    /// Draws everything written so far without closing the scope or clearing
    /// the buffers.
    fn present(&mut self) -> Result<()> {
        let (core, hooks) = self.parts_mut();
        core.draw(hooks)
    }

    /// Discards everything written since the last flush.
    fn clear(&mut self) -> Result<()> {
        self.parts_mut().0.clear()
    }

    /// Freezes the batch contents. Only legal while drawing. After the next
    /// flush the CPU copies are released and the batch can be drawn again
    /// with new parameters, but no longer written to or cleared.
    fn make_static(&mut self) -> Result<()> {
        self.parts_mut().0.make_static()
    }

    /// Releases the GPU buffers. Every later call fails with
    /// [`Error::Destroyed`](crate::Error::Destroyed).
    fn destroy(&mut self) {
        self.parts_mut().0.destroy();
    }

    /// Returns true once [`Self::destroy`] was called.
    fn is_destroyed(&self) -> bool {
        self.core().is_destroyed()
    }

    /// Returns true once [`Self::make_static`] was called.
    fn is_static(&self) -> bool {
        self.core().is_static()
    }

    /// Returns true between `begin()` and `end()`.
    fn is_drawing(&self) -> bool {
        self.core().is_drawing()
    }

    /// Changes the upload hint given to the device.
    fn set_buffers_usage(&mut self, usage: BufferUsage) {
        self.parts_mut().0.set_usage(usage);
    }

    /// The upload hint given to the device.
    fn buffers_usage(&self) -> BufferUsage {
        self.core().usage()
    }

    /// Registers a callback invoked each time the buffers fill up, right
    /// before they are flushed.
    fn on_overflow<F: FnMut() + 'static>(&mut self, callback: F)
    where
        Self: Sized,
    {
        self.parts_mut().0.set_on_overflow(Some(Box::new(callback)));
    }

    /// Removes the overflow callback.
    fn clear_on_overflow(&mut self) {
        self.parts_mut().0.set_on_overflow(None);
    }
}
