use crate::{
    color::Color,
    math::{rotate_around, Angle, Point, Rect, Size, Vector},
    texture::Texture,
};

mod group;

pub use self::group::SpritesGroup;

/// The corners of a quad in top-left, top-right, bottom-left, bottom-right
/// order.
pub type Corners = [Point; 4];

/// The color of a sprite.
#[derive(Debug, Clone, PartialEq)]
pub enum SpriteColor {
    /// One color for every corner.
    Uniform(Color),
    /// Colors for the top-left, top-right, bottom-left, and bottom-right
    /// corners. Missing trailing corners repeat the last color given, and an
    /// empty list is white.
    Corners(Vec<Color>),
}

impl Default for SpriteColor {
    fn default() -> Self {
        Self::Uniform(Color::WHITE)
    }
}

impl From<Color> for SpriteColor {
    fn from(color: Color) -> Self {
        Self::Uniform(color)
    }
}

impl From<[Color; 4]> for SpriteColor {
    fn from(colors: [Color; 4]) -> Self {
        Self::Corners(colors.to_vec())
    }
}

impl SpriteColor {
    /// Returns the color of each corner.
    #[must_use]
    pub fn corners(&self) -> [Color; 4] {
        match self {
            Self::Uniform(color) => [*color; 4],
            Self::Corners(colors) => {
                let mut last = colors.first().copied().unwrap_or(Color::WHITE);
                let mut corners = [last; 4];
                for (index, corner) in corners.iter_mut().enumerate() {
                    if let Some(color) = colors.get(index) {
                        last = *color;
                    }
                    *corner = last;
                }
                corners
            }
        }
    }
}

/// A textured quad to draw.
#[derive(Debug, Clone)]
pub struct Sprite {
    /// The texture to sample. Batches skip their draw call while the active
    /// texture is missing or not yet loaded.
    pub texture: Option<Texture>,
    /// Where the sprite's origin is placed.
    pub position: Point,
    /// Depth of the top edge.
    pub z: f32,
    /// Width and height.
    pub size: Size,
    /// Added to `z` for the bottom edge.
    pub depth: f32,
    /// The region of the texture to draw, in pixels. `None` draws the whole
    /// texture, or the texture's atlas region.
    pub source_rectangle: Option<Rect>,
    /// Tint.
    pub color: SpriteColor,
    /// Rotation around the origin.
    pub rotation: Angle,
    /// Anchor for positioning, rotation, and skew, as a fraction of `size`.
    pub origin: Point,
    /// Horizontal and vertical shear, in pixels.
    pub skew: Option<Vector>,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: None,
            position: Point::zero(),
            z: 0.,
            size: Size::new(100., 100.),
            depth: 0.,
            source_rectangle: None,
            color: SpriteColor::default(),
            rotation: Angle::zero(),
            origin: Point::new(0.5, 0.5),
            skew: None,
        }
    }
}

impl Sprite {
    /// Creates a sprite of `size` drawing `texture` at `position`.
    #[must_use]
    pub fn new(texture: Option<Texture>, position: Point, size: Size) -> Self {
        Self {
            texture,
            position,
            size,
            ..Self::default()
        }
    }

    /// Replaces the source rectangle.
    #[must_use]
    pub fn with_source(mut self, source: Rect) -> Self {
        self.source_rectangle = Some(source);
        self
    }

    /// Replaces the color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<SpriteColor>) -> Self {
        self.color = color.into();
        self
    }

    /// Replaces the rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Angle) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replaces the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    /// Replaces the skew.
    #[must_use]
    pub fn with_skew(mut self, skew: Vector) -> Self {
        self.skew = Some(skew);
        self
    }

    /// Replaces `z` and `depth`.
    #[must_use]
    pub fn with_depth(mut self, z: f32, depth: f32) -> Self {
        self.z = z;
        self.depth = depth;
        self
    }

    /// Sets the size to the source rectangle's size, or the texture's size
    /// when there is no source rectangle.
    #[must_use]
    pub fn sized_to_source(mut self) -> Self {
        if let Some(source) = self.source_rectangle {
            self.size = source.size;
        } else if let Some(texture) = &self.texture {
            let region = texture
                .source_rect()
                .map_or_else(|| texture.size(), |region| region.size);
            self.size = region.to_f32();
        }
        self
    }

    /// Returns the corners of the sprite before any batch transform.
    #[must_use]
    pub fn corners(&self) -> Corners {
        quad_corners(
            self.position,
            self.size,
            self.origin,
            self.rotation,
            self.skew,
        )
    }

    /// Returns the normalized texture coordinates of each corner.
    #[must_use]
    pub fn texture_coords(&self) -> Corners {
        let texture = match &self.texture {
            Some(texture) => texture,
            None => return unit_coords(),
        };
        let size = texture.size().to_f32();
        if size.width <= 0. || size.height <= 0. {
            return unit_coords();
        }
        let atlas = texture.source_rect().map(|region| region.to_f32());
        let source = match (self.source_rectangle, atlas) {
            (Some(source), Some(atlas)) => source.translate(atlas.origin.to_vector()),
            (Some(source), None) => source,
            (None, Some(atlas)) => atlas,
            (None, None) => return unit_coords(),
        };
        let left = source.min_x() / size.width;
        let right = source.max_x() / size.width;
        let top = source.min_y() / size.height;
        let bottom = source.max_y() / size.height;
        [
            Point::new(left, top),
            Point::new(right, top),
            Point::new(left, bottom),
            Point::new(right, bottom),
        ]
    }
}

fn unit_coords() -> Corners {
    [
        Point::new(0., 0.),
        Point::new(1., 0.),
        Point::new(0., 1.),
        Point::new(1., 1.),
    ]
}

/// Computes the corners of a quad of `size` anchored at `origin` (a fraction
/// of `size`), sheared by `skew`, rotated around the anchor, and placed at
/// `position`.
#[must_use]
pub fn quad_corners(
    position: Point,
    size: Size,
    origin: Point,
    rotation: Angle,
    skew: Option<Vector>,
) -> Corners {
    let left = -size.width * origin.x;
    let top = -size.height * origin.y;
    let mut corners = [
        Point::new(left, top),
        Point::new(left + size.width, top),
        Point::new(left, top + size.height),
        Point::new(left + size.width, top + size.height),
    ];

    if let Some(skew) = skew {
        if skew.x != 0. {
            corners[0].x += skew.x * origin.y;
            corners[1].x += skew.x * origin.y;
            corners[2].x -= skew.x * (1. - origin.y);
            corners[3].x -= skew.x * (1. - origin.y);
        }
        if skew.y != 0. {
            corners[0].y += skew.y * origin.x;
            corners[2].y += skew.y * origin.x;
            corners[1].y -= skew.y * (1. - origin.x);
            corners[3].y -= skew.y * (1. - origin.x);
        }
    }

    for corner in &mut corners {
        *corner = rotate_around(*corner, Point::zero(), rotation) + position.to_vector();
    }
    corners
}
