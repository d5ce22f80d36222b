use crate::math::{Angle, Point, Point3D, Rect, Size, Transform, Vector3D};

/// Near plane used by [`Camera::orthographic`] when none is given.
pub const DEFAULT_ORTHOGRAPHIC_NEAR: f32 = -1.;
/// Far plane used by [`Camera::orthographic`] when none is given.
pub const DEFAULT_ORTHOGRAPHIC_FAR: f32 = 400.;

/// Projection, view, and viewport settings applied to a
/// [`Graphics`](crate::Graphics) instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Transform,
    view: Option<Transform>,
    viewport: Option<Rect>,
    region: Option<Rect>,
}

impl Camera {
    /// Returns a camera mapping `region` to the screen, with y pointing down.
    #[must_use]
    pub fn orthographic(region: Rect) -> Self {
        Self::orthographic_with_depth(region, DEFAULT_ORTHOGRAPHIC_NEAR, DEFAULT_ORTHOGRAPHIC_FAR)
    }

    /// Returns an orthographic camera for `region` with explicit clip planes.
    #[must_use]
    pub fn orthographic_with_depth(region: Rect, near: f32, far: f32) -> Self {
        Self {
            projection: Transform::ortho(
                region.min_x(),
                region.max_x(),
                region.max_y(),
                region.min_y(),
                near,
                far,
            ),
            view: None,
            viewport: None,
            region: Some(region),
        }
    }

    /// Returns an orthographic camera of `size` whose top-left corner is at
    /// `offset`.
    #[must_use]
    pub fn orthographic_offset(offset: Point, size: Size) -> Self {
        Self::orthographic(Rect::new(offset, size))
    }

    /// Returns a perspective camera with a vertical `field_of_view`.
    #[must_use]
    pub fn perspective(field_of_view: Angle, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            projection: perspective_matrix(field_of_view, aspect_ratio, near, far),
            view: None,
            viewport: None,
            region: None,
        }
    }

    /// Replaces the projection with a perspective projection, keeping the
    /// view and viewport.
    pub fn set_perspective(
        &mut self,
        field_of_view: Angle,
        aspect_ratio: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = perspective_matrix(field_of_view, aspect_ratio, near, far);
        self.region = None;
    }

    /// Points the camera from `eye` at `target`, with +y as up.
    pub fn set_view_look_at(&mut self, eye: Point3D, target: Point3D) {
        self.view = Some(look_at(eye, target, Vector3D::new(0., 1., 0.)));
    }

    /// Replaces the view matrix.
    pub fn set_view(&mut self, view: Option<Transform>) {
        self.view = view;
    }

    /// Restricts rendering to `viewport`. `None` renders to the whole target.
    pub fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.viewport = viewport;
    }

    /// The projection matrix.
    #[must_use]
    pub const fn projection(&self) -> &Transform {
        &self.projection
    }

    /// The view matrix, if one was set.
    #[must_use]
    pub const fn view(&self) -> Option<&Transform> {
        self.view.as_ref()
    }

    /// The viewport, if one was set.
    #[must_use]
    pub const fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// The region an orthographic camera covers.
    #[must_use]
    pub const fn region(&self) -> Option<Rect> {
        self.region
    }
}

fn perspective_matrix(field_of_view: Angle, aspect_ratio: f32, near: f32, far: f32) -> Transform {
    let f = 1. / (field_of_view.radians / 2.).tan();
    let nf = 1. / (near - far);
    Transform::new(
        f / aspect_ratio,
        0.,
        0.,
        0.,
        0.,
        f,
        0.,
        0.,
        0.,
        0.,
        (far + near) * nf,
        -1.,
        0.,
        0.,
        2. * far * near * nf,
        0.,
    )
}

fn look_at(eye: Point3D, target: Point3D, up: Vector3D) -> Transform {
    let z = (eye - target).normalize();
    let x = up.cross(z).normalize();
    let y = z.cross(x);
    let eye = eye.to_vector();
    Transform::new(
        x.x,
        y.x,
        z.x,
        0.,
        x.y,
        y.y,
        z.y,
        0.,
        x.z,
        y.z,
        z.z,
        0.,
        -x.dot(eye),
        -y.dot(eye),
        -z.dot(eye),
        1.,
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn orthographic_maps_corners() {
        let camera = Camera::orthographic(Rect::new(Point::zero(), Size::new(800., 600.)));
        let top_left = camera
            .projection()
            .transform_point3d(Point3D::new(0., 0., 0.))
            .unwrap();
        let bottom_right = camera
            .projection()
            .transform_point3d(Point3D::new(800., 600., 0.))
            .unwrap();
        assert_relative_eq!(top_left.x, -1.);
        assert_relative_eq!(top_left.y, 1.);
        assert_relative_eq!(bottom_right.x, 1.);
        assert_relative_eq!(bottom_right.y, -1.);
    }

    #[test]
    fn look_at_centers_target() {
        let mut camera = Camera::perspective(Angle::degrees(45.), 1., 0.1, 100.);
        camera.set_view_look_at(Point3D::new(0., 0., -10.), Point3D::origin());
        let view = camera.view().unwrap();
        let target = view.transform_point3d(Point3D::origin()).unwrap();
        assert_relative_eq!(target.x, 0., epsilon = 0.0001);
        assert_relative_eq!(target.y, 0., epsilon = 0.0001);
        assert_relative_eq!(target.z, -10., epsilon = 0.0001);
    }

    #[test]
    fn perspective_near_plane_maps_to_minus_one() {
        let camera = Camera::perspective(Angle::degrees(90.), 1., 1., 100.);
        let near = camera
            .projection()
            .transform_point3d(Point3D::new(0., 0., -1.))
            .unwrap();
        assert_relative_eq!(near.z, -1., epsilon = 0.0001);
    }
}
