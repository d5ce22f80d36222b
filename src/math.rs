/// A unit for coordinates that have no particular meaning attached.
pub type Unknown = euclid::UnknownUnit;

/// A type representing a width and height.
pub type Size<T = f32, Unit = Unknown> = euclid::Size2D<T, Unit>;
/// A type representing an x and y coordinate.
pub type Point<T = f32, Unit = Unknown> = euclid::Point2D<T, Unit>;
/// A type representing an x, y, and z coordinate.
pub type Point3D<T = f32, Unit = Unknown> = euclid::Point3D<T, Unit>;
/// A type representing a [`Point`] and [`Size`].
pub type Rect<T = f32, Unit = Unknown> = euclid::Rect<T, Unit>;
/// A type representing a minimum and maximum [`Point`].
pub type Box2D<T = f32, Unit = Unknown> = euclid::Box2D<T, Unit>;
/// A type representing a vector with magnitudes x and y.
pub type Vector<T = f32, Unit = Unknown> = euclid::Vector2D<T, Unit>;
/// A type representing a vector with magnitudes x, y, and z.
pub type Vector3D<T = f32, Unit = Unknown> = euclid::Vector3D<T, Unit>;
/// A type representing an angle of measurement.
pub type Angle = euclid::Angle<f32>;
/// A 4x4 matrix used for world, view, and projection transforms.
pub type Transform = euclid::Transform3D<f32, Unknown, Unknown>;
/// A 2d affine transform.
pub type Transform2D = euclid::Transform2D<f32, Unknown, Unknown>;

/// Returns true if `transform` leaves every point unchanged.
#[must_use]
pub fn is_identity(transform: &Transform) -> bool {
    transform.approx_eq(&Transform::identity())
}

/// Rotates `point` around `origin` by `angle`, clockwise in screen space
/// when positive.
#[must_use]
pub fn rotate_around(point: Point, origin: Point, angle: Angle) -> Point {
    if angle.radians == 0. {
        return point;
    }
    let (sin, cos) = angle.radians.sin_cos();
    let offset = point - origin;
    Point::new(
        origin.x + offset.x * cos - offset.y * sin,
        origin.y + offset.x * sin + offset.y * cos,
    )
}

/// Returns `segments + 1` points around an ellipse, starting and ending at
/// angle zero. `ratio` scales the radius on each axis before `rotation` is
/// applied around the center.
#[must_use]
pub fn circle_points(
    center: Point,
    radius: f32,
    segments: usize,
    ratio: Vector,
    rotation: Angle,
) -> Vec<Point> {
    let step = std::f32::consts::TAU / segments as f32;
    (0..=segments)
        .map(|index| {
            let angle = step * index as f32;
            let offset = Point::new(
                radius * angle.cos() * ratio.x,
                radius * angle.sin() * ratio.y,
            );
            rotate_around(offset, Point::zero(), rotation) + center.to_vector()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn rotate_quarter_turn() {
        let rotated = rotate_around(
            Point::new(2., 1.),
            Point::new(1., 1.),
            Angle::degrees(90.),
        );
        assert_relative_eq!(rotated.x, 1., epsilon = 0.0001);
        assert_relative_eq!(rotated.y, 2., epsilon = 0.0001);
    }

    #[test]
    fn identity_detection() {
        assert!(is_identity(&Transform::identity()));
        assert!(!is_identity(&Transform::translation(1., 0., 0.)));
    }

    #[test]
    fn circle_points_close_the_loop() {
        let points = circle_points(
            Point::new(10., 10.),
            5.,
            4,
            Vector::new(1., 2.),
            Angle::zero(),
        );
        assert_eq!(points.len(), 5);
        assert_relative_eq!(points[0].x, 15.);
        assert_relative_eq!(points[1].y, 20., epsilon = 0.0001);
        assert_relative_eq!(points[4].x, points[0].x, epsilon = 0.0001);
        assert_relative_eq!(points[4].y, points[0].y, epsilon = 0.0001);
    }
}
