use super::Sprite;
use crate::{
    color::Color,
    math::{Angle, Point, Transform, Transform2D, Vector},
};

/// A list of sprites drawn together under one transform.
#[derive(Debug, Clone)]
pub struct SpritesGroup {
    sprites: Vec<Sprite>,
    /// Translation applied after rotation and scale.
    pub position: Point,
    /// Rotation around the group's origin, in the same direction as
    /// [`Sprite::rotation`].
    pub rotation: Angle,
    /// Scale applied first.
    pub scale: Vector,
}

impl Default for SpritesGroup {
    fn default() -> Self {
        Self {
            sprites: Vec::new(),
            position: Point::zero(),
            rotation: Angle::zero(),
            scale: Vector::new(1., 1.),
        }
    }
}

impl SpritesGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sprite.
    pub fn push(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }

    /// Removes and returns the first sprite.
    pub fn shift(&mut self) -> Option<Sprite> {
        if self.sprites.is_empty() {
            None
        } else {
            Some(self.sprites.remove(0))
        }
    }

    /// The sprites in the group.
    #[must_use]
    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    /// Mutable access to the sprites in the group.
    pub fn sprites_mut(&mut self) -> &mut Vec<Sprite> {
        &mut self.sprites
    }

    /// The number of sprites in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// Returns true if the group has no sprites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Tints every sprite with `color`.
    pub fn set_color(&mut self, color: Color) {
        for sprite in &mut self.sprites {
            sprite.color = color.into();
        }
    }

    /// Returns the group's transform, or `None` when position, rotation, and
    /// scale leave sprites where they are.
    #[must_use]
    pub fn transform(&self) -> Option<Transform> {
        let mut transform: Option<Transform2D> = None;
        let mut then = |next: Transform2D| {
            transform = Some(transform.map_or(next, |current| current.then(&next)));
        };

        if self.scale.x != 1. || self.scale.y != 1. {
            then(Transform2D::scale(self.scale.x, self.scale.y));
        }
        if self.rotation.radians != 0. {
            then(Transform2D::rotation(self.rotation));
        }
        if self.position.x != 0. || self.position.y != 0. {
            then(Transform2D::translation(self.position.x, self.position.y));
        }

        transform.map(|transform| transform.to_3d())
    }
}

impl Extend<Sprite> for SpritesGroup {
    fn extend<T: IntoIterator<Item = Sprite>>(&mut self, iter: T) {
        self.sprites.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Size;

    #[test]
    fn untransformed_group_has_no_transform() {
        assert!(SpritesGroup::new().transform().is_none());
    }

    #[test]
    fn scale_then_rotate_then_translate() {
        let mut group = SpritesGroup::new();
        group.push(Sprite::new(None, Point::zero(), Size::new(1., 1.)));
        group.scale = Vector::new(2., 2.);
        group.rotation = Angle::degrees(90.);
        group.position = Point::new(10., 0.);

        let transform = group.transform().unwrap();
        let moved = transform.transform_point2d(Point::new(1., 0.)).unwrap();
        assert_relative_eq!(moved.x, 10., epsilon = 0.0001);
        assert_relative_eq!(moved.y, 2., epsilon = 0.0001);
    }
}
