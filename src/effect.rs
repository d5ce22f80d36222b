use std::{
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use lazy_static::lazy_static;

lazy_static! {
    static ref EFFECT_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// Render state toggles that override an effect's own defaults while a batch
/// is drawing. `None` leaves the device's current setting alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EffectFlags {
    /// Enables or disables depth testing.
    pub depth_test: Option<bool>,
    /// Enables or disables back face culling.
    pub face_culling: Option<bool>,
    /// Enables or disables the stencil test.
    pub stencil_test: Option<bool>,
    /// Enables or disables dithering.
    pub dithering: Option<bool>,
}

impl EffectFlags {
    /// Returns flags that enable depth testing and face culling, which is what
    /// 3d sprites usually want.
    #[must_use]
    pub const fn depth() -> Self {
        Self {
            depth_test: Some(true),
            face_culling: Some(true),
            stencil_test: None,
            dithering: None,
        }
    }
}

struct EffectData {
    id: u64,
    name: String,
    has_vertex_color: bool,
    supports_outline: bool,
}

/// A compiled shader program as far as batching is concerned. Shader source
/// and compilation belong to the device. Cheap to clone; clones compare equal.
#[derive(Clone)]
pub struct Effect(Rc<EffectData>);

impl Effect {
    /// Creates a new effect handle.
    #[must_use]
    pub fn new(name: impl Into<String>, has_vertex_color: bool) -> Self {
        Self::with_outline(name, has_vertex_color, false)
    }

    /// Creates a new effect handle that may also support outline uniforms.
    #[must_use]
    pub fn with_outline(
        name: impl Into<String>,
        has_vertex_color: bool,
        supports_outline: bool,
    ) -> Self {
        Self(Rc::new(EffectData {
            id: EFFECT_ID_CELL.fetch_add(1, Ordering::SeqCst),
            name: name.into(),
            has_vertex_color,
            supports_outline,
        }))
    }

    /// The unique ID of this effect.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// The effect's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns true if the effect reads the color vertex stream.
    #[must_use]
    pub fn has_vertex_color(&self) -> bool {
        self.0.has_vertex_color
    }

    /// Returns true if the effect accepts outline weight and color uniforms.
    #[must_use]
    pub fn supports_outline(&self) -> bool {
        self.0.supports_outline
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Effect {}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .finish()
    }
}

/// The effects every [`Graphics`](crate::Graphics) provides out of the box.
#[derive(Debug, Clone)]
pub struct BuiltinEffects {
    /// Textured sprites tinted by vertex color.
    pub sprites: Effect,
    /// Textured sprites without a color stream.
    pub sprites_no_vertex_color: Effect,
    /// Textured sprites in 3d space.
    pub sprites_3d: Effect,
    /// Untextured colored geometry.
    pub shapes: Effect,
    /// Text rendered from multi-channel signed distance field fonts.
    pub msdf_font: Effect,
    /// Textured sprites with an outline.
    pub sprites_with_outline: Effect,
}

impl BuiltinEffects {
    pub(crate) fn new() -> Self {
        Self {
            sprites: Effect::new("sprites", true),
            sprites_no_vertex_color: Effect::new("sprites-no-vertex-color", false),
            sprites_3d: Effect::new("sprites-3d", true),
            shapes: Effect::new("shapes", true),
            msdf_font: Effect::new("msdf-font", true),
            sprites_with_outline: Effect::with_outline("sprites-with-outline", true, true),
        }
    }
}
