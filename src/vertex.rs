use crate::{
    color::Color,
    math::{Point, Point3D, Vector3D},
};

/// A single vertex handed to the batches that accept raw geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in world space. 2d geometry uses `z = 0`.
    pub position: Point3D,
    /// Texture coordinate in the 0..1 range.
    pub texture_coord: Point,
    /// Vertex color.
    pub color: Color,
    /// Optional normal, written as zeros when absent.
    pub normal: Option<Vector3D>,
    /// Optional binormal, written as zeros when absent.
    pub binormal: Option<Vector3D>,
    /// Optional tangent, written as zeros when absent.
    pub tangent: Option<Vector3D>,
}

impl Vertex {
    /// Creates a vertex at `position` with `color` and no texture
    /// coordinate.
    #[must_use]
    pub fn new(position: Point3D, color: Color) -> Self {
        Self {
            position,
            texture_coord: Point::zero(),
            color,
            normal: None,
            binormal: None,
            tangent: None,
        }
    }

    /// Creates a 2d vertex at `position` with `color`.
    #[must_use]
    pub fn flat(position: Point, color: Color) -> Self {
        Self::new(position.to_3d(), color)
    }

    /// Replaces the texture coordinate.
    #[must_use]
    pub const fn with_texture_coord(mut self, texture_coord: Point) -> Self {
        self.texture_coord = texture_coord;
        self
    }

    /// Replaces the normal.
    #[must_use]
    pub const fn with_normal(mut self, normal: Vector3D) -> Self {
        self.normal = Some(normal);
        self
    }

    /// Replaces the binormal.
    #[must_use]
    pub const fn with_binormal(mut self, binormal: Vector3D) -> Self {
        self.binormal = Some(binormal);
        self
    }

    /// Replaces the tangent.
    #[must_use]
    pub const fn with_tangent(mut self, tangent: Vector3D) -> Self {
        self.tangent = Some(tangent);
        self
    }
}
