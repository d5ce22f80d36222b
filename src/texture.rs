use std::{
    cell::Cell,
    fmt,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use lazy_static::lazy_static;

use crate::math::{Rect, Size};

lazy_static! {
    static ref GLOBAL_ID_CELL: AtomicU64 = AtomicU64::new(0);
}

/// What a texture's pixels are meant to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// A regular image.
    Image,
    /// Glyphs rasterized as plain bitmaps.
    BitmapFont,
    /// Glyphs encoded as a multi-channel signed distance field.
    MsdfFont,
}

/// How texels are sampled when a texture is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureFilter {
    /// Sample the closest texel.
    Nearest,
    /// Interpolate between neighboring texels.
    Linear,
}

/// How texture coordinates outside of 0..1 are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum TextureWrap {
    /// Clamp to the edge texel.
    Clamp,
    /// Repeat the texture.
    Repeat,
    /// Repeat the texture, mirroring every other repetition.
    MirroredRepeat,
}

struct TextureData {
    id: u64,
    kind: TextureKind,
    size: Cell<Size<u32>>,
    valid: Cell<bool>,
    filter: Cell<Option<TextureFilter>>,
    wrap: Cell<Option<TextureWrap>>,
}

/// A GPU texture, or a region of one. Cheap to clone.
///
/// Regions created with [`Texture::region`] share the underlying texture, so
/// batches don't need to flush when switching between regions of the same
/// atlas.
#[derive(Clone)]
pub struct Texture {
    data: Rc<TextureData>,
    region: Option<Rect<u32>>,
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("id", &self.data.id)
            .field("kind", &self.data.kind)
            .field("size", &self.data.size.get())
            .field("valid", &self.data.valid.get())
            .field("region", &self.region)
            .finish()
    }
}

impl Texture {
    /// Creates a loaded image texture of `size`.
    #[must_use]
    pub fn new(size: Size<u32>) -> Self {
        Self::with_kind(size, TextureKind::Image)
    }

    /// Creates a loaded texture of `size` holding `kind` data.
    #[must_use]
    pub fn with_kind(size: Size<u32>, kind: TextureKind) -> Self {
        let texture = Self::pending(kind);
        texture.mark_loaded(size);
        texture
    }

    /// Creates a texture whose pixels haven't been uploaded yet. Batches skip
    /// their draw calls while the active texture is pending.
    #[must_use]
    pub fn pending(kind: TextureKind) -> Self {
        let id = GLOBAL_ID_CELL.fetch_add(1, Ordering::SeqCst);
        Self {
            data: Rc::new(TextureData {
                id,
                kind,
                size: Cell::new(Size::zero()),
                valid: Cell::new(false),
                filter: Cell::new(None),
                wrap: Cell::new(None),
            }),
            region: None,
        }
    }

    /// Marks the texture as uploaded with the given size.
    pub fn mark_loaded(&self, size: Size<u32>) {
        self.data.size.set(size);
        self.data.valid.set(true);
    }

    /// Marks the texture as no longer usable, for example after its GPU
    /// storage was released.
    pub fn invalidate(&self) {
        self.data.valid.set(false);
    }

    /// Returns a texture referring to `rect` within this texture. The rect is
    /// relative to this texture's own region, if it has one.
    #[must_use]
    pub fn region(&self, rect: Rect<u32>) -> Self {
        let origin = self.region.map_or(rect.origin, |region| {
            region.origin + rect.origin.to_vector()
        });
        Self {
            data: self.data.clone(),
            region: Some(Rect::new(origin, rect.size)),
        }
    }

    /// The unique ID of the underlying texture. Regions share their parent's
    /// id. This depends on creation order and is not related to the image
    /// data in any way.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.data.id
    }

    /// Returns true if both textures refer to the same underlying GPU
    /// texture.
    #[must_use]
    pub fn same_source(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// Returns the size of the underlying texture.
    #[must_use]
    pub fn size(&self) -> Size<u32> {
        self.data.size.get()
    }

    /// Returns the region of the underlying texture this texture refers to.
    #[must_use]
    pub const fn source_rect(&self) -> Option<Rect<u32>> {
        self.region
    }

    /// Returns the kind of data stored in the texture.
    #[must_use]
    pub fn kind(&self) -> TextureKind {
        self.data.kind
    }

    /// Returns true once the texture's pixels are available.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.data.valid.get()
    }

    /// Returns the filter override for this texture.
    #[must_use]
    pub fn filter(&self) -> Option<TextureFilter> {
        self.data.filter.get()
    }

    /// Sets the filter used when this texture is bound.
    pub fn set_filter(&self, filter: Option<TextureFilter>) {
        self.data.filter.set(filter);
    }

    /// Returns the wrap override for this texture.
    #[must_use]
    pub fn wrap(&self) -> Option<TextureWrap> {
        self.data.wrap.get()
    }

    /// Sets the wrap mode used when this texture is bound.
    pub fn set_wrap(&self, wrap: Option<TextureWrap>) {
        self.data.wrap.set(wrap);
    }
}
