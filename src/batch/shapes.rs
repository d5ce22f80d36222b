use tracing::warn;

use super::{BatchCore, DrawBatch, FlushHooks, NoHooks, DEFAULT_CAPACITY};
use crate::{
    buffer::{BufferLayout, PrimitiveKind},
    color::Color,
    effect::Effect,
    graphics::Graphics,
    math::{circle_points, Angle, Point, Rect, Size, Vector},
    sprite::{quad_corners, SpriteColor},
    vertex::Vertex,
    Result,
};

/// The number of segments a circle is built from when none is given.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 24;

/// Batches untextured, colored triangles.
#[derive(Debug)]
pub struct ShapesBatch {
    core: BatchCore,
    /// Floors the corners of quads, rectangles, and lines to whole pixels.
    pub snap_pixels: bool,
}

impl ShapesBatch {
    /// Creates a batch holding [`DEFAULT_CAPACITY`] triangles.
    #[must_use]
    pub fn new(graphics: &Graphics) -> Self {
        Self::with_capacity(graphics, DEFAULT_CAPACITY)
    }

    /// Creates a batch holding `triangles` triangles before flushing.
    #[must_use]
    pub fn with_capacity(graphics: &Graphics, triangles: usize) -> Self {
        let layout = BufferLayout {
            colors: true,
            ..BufferLayout::default()
        };
        Self {
            core: BatchCore::new(graphics, PrimitiveKind::Triangles, triangles, layout, false),
            snap_pixels: false,
        }
    }

    /// Appends raw triangles. Writes nothing and logs a warning if the
    /// vertex count isn't a multiple of three.
    pub fn draw_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.core.validate_drawing(true)?;
        if vertices.len() % 3 != 0 {
            warn!(
                count = vertices.len(),
                "shape vertices must come in groups of 3"
            );
            return Ok(());
        }

        for triangle in vertices.chunks_exact(3) {
            self.core.push(&NoHooks, triangle, 1)?;
        }
        Ok(())
    }

    /// Draws a filled quad of `size` anchored at `origin` (a fraction of
    /// `size`, centered when `None`) and placed at `position`.
    pub fn draw_quad(
        &mut self,
        position: Point,
        size: Size,
        color: impl Into<SpriteColor>,
        rotation: Angle,
        origin: Option<Point>,
        skew: Option<Vector>,
    ) -> Result<()> {
        self.core.validate_drawing(true)?;
        let origin = origin.unwrap_or_else(|| Point::new(0.5, 0.5));
        let mut corners = quad_corners(position, size, origin, rotation, skew);
        if self.snap_pixels {
            for corner in &mut corners {
                *corner = corner.floor();
            }
        }

        let colors = color.into().corners();
        let vertex = |index: usize| Vertex::flat(corners[index], colors[index]);
        self.draw_vertices(&[
            vertex(0),
            vertex(1),
            vertex(2),
            vertex(1),
            vertex(2),
            vertex(3),
        ])
    }

    /// Fills `destination`. When `origin` is given, the rectangle rotates
    /// around that fraction of its size, otherwise around its center.
    pub fn draw_rectangle(
        &mut self,
        destination: Rect,
        color: impl Into<SpriteColor>,
        rotation: Angle,
        origin: Option<Point>,
    ) -> Result<()> {
        let origin = origin.unwrap_or_else(|| Point::new(0.5, 0.5));
        let size = destination.size;
        let position =
            destination.origin + Vector::new(size.width * origin.x, size.height * origin.y);
        self.draw_quad(position, size, color, rotation, Some(origin), None)
    }

    /// Draws a line from `from` to `to` as a quad `width` pixels thick.
    pub fn draw_line(&mut self, from: Point, to: Point, color: Color, width: f32) -> Result<()> {
        let delta = to - from;
        let length = delta.length();
        let rotation = Angle::radians(delta.y.atan2(delta.x));
        self.draw_quad(
            from,
            Size::new(length, width),
            color,
            rotation,
            Some(Point::new(0., 0.5)),
            None,
        )
    }

    /// Draws a two pixel wide triangle at `position`.
    pub fn draw_point(&mut self, position: Point, color: Color) -> Result<()> {
        self.draw_vertices(&[
            Vertex::flat(position, color),
            Vertex::flat(position + Vector::new(2., 0.), color),
            Vertex::flat(position + Vector::new(0., 2.), color),
        ])
    }

    /// Draws a filled circle as a fan of `segments` triangles meeting at the
    /// center. The center uses `color` and the rim `outside_color`, or
    /// `color` when `None`. `ratio` stretches the circle into an oval, which
    /// is then rotated by `rotation`.
    ///
    /// Fewer than two segments draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle(
        &mut self,
        center: Point,
        radius: f32,
        color: Color,
        segments: Option<usize>,
        outside_color: Option<Color>,
        ratio: Option<Vector>,
        rotation: Angle,
    ) -> Result<()> {
        self.core.validate_drawing(true)?;
        let segments = segments.unwrap_or(DEFAULT_CIRCLE_SEGMENTS);
        if segments < 2 {
            return Ok(());
        }
        let outside_color = outside_color.unwrap_or(color);
        let ratio = ratio.unwrap_or_else(|| Vector::new(1., 1.));

        let rim = circle_points(center, radius, segments, ratio, rotation);
        for edge in rim.windows(2) {
            self.core.push(
                &NoHooks,
                &[
                    Vertex::flat(center, color),
                    Vertex::flat(edge[0], outside_color),
                    Vertex::flat(edge[1], outside_color),
                ],
                1,
            )?;
        }
        Ok(())
    }

    /// The number of triangles written since the last flush.
    #[must_use]
    pub fn polygons_in_batch(&self) -> usize {
        self.core.primitives()
    }

    /// The number of triangles the batch holds before flushing.
    #[must_use]
    pub fn max_polygons_count(&self) -> usize {
        self.core.capacity()
    }

    /// Returns true if the batch reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.polygons_in_batch() >= self.max_polygons_count()
    }
}

impl DrawBatch for ShapesBatch {
    fn core(&self) -> &BatchCore {
        &self.core
    }

    fn parts_mut(&mut self) -> (&mut BatchCore, &dyn FlushHooks) {
        (&mut self.core, &NoHooks)
    }

    fn default_effect(&self) -> Effect {
        self.core.graphics().builtin_effects().shapes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        device::{CommandLog, DeviceCommand, RecordingDevice, Topology, VertexAttribute},
        graphics::FrameStats,
    };

    fn setup() -> (Graphics, CommandLog) {
        let device = RecordingDevice::new();
        let log = device.log();
        (Graphics::new(device), log)
    }

    #[test]
    fn uneven_vertices_write_nothing() {
        let (graphics, log) = setup();
        let mut batch = ShapesBatch::new(&graphics);
        batch.begin_default().unwrap();
        let vertex = Vertex::flat(Point::new(1., 1.), Color::WHITE);
        batch.draw_vertices(&[vertex; 5]).unwrap();
        assert_eq!(batch.polygons_in_batch(), 0);
        assert_eq!(batch.core().buffers().unwrap().vertices(), 0);
        batch.end().unwrap();
        assert!(log.draws().is_empty());
    }

    #[test]
    fn quad_is_two_triangles() {
        let (graphics, log) = setup();
        let mut batch = ShapesBatch::new(&graphics);
        batch.begin_default().unwrap();
        batch
            .draw_rectangle(
                Rect::new(Point::new(0., 0.), Size::new(4., 2.)),
                Color::BLUE,
                Angle::zero(),
                None,
            )
            .unwrap();
        assert_eq!(batch.polygons_in_batch(), 2);
        batch.end().unwrap();

        let positions = log.uploads_to(log.last_bound(VertexAttribute::Position).unwrap());
        assert_eq!(
            positions[0],
            vec![
                0., 0., 0., 4., 0., 0., 0., 2., 0., 4., 0., 0., 0., 2., 0., 4., 2., 0.
            ]
        );
        assert_eq!(log.draws(), vec![(Topology::Triangles, 6)]);
        assert_eq!(
            graphics.stats(),
            FrameStats {
                draw_calls: 1,
                quads_drawn: 0,
                shape_polygons_drawn: 2,
            }
        );
    }

    #[test]
    fn circle_fan_uses_outside_color() {
        let (graphics, log) = setup();
        let mut batch = ShapesBatch::new(&graphics);
        batch.begin_default().unwrap();
        batch
            .draw_circle(
                Point::new(50., 50.),
                10.,
                Color::WHITE,
                Some(8),
                Some(Color::BLACK),
                None,
                Angle::zero(),
            )
            .unwrap();
        assert_eq!(batch.polygons_in_batch(), 8);
        batch.end().unwrap();

        let colors = log.uploads_to(log.last_bound(VertexAttribute::Color).unwrap());
        let first_triangle = &colors[0][..12];
        assert_eq!(
            first_triangle,
            &[1., 1., 1., 1., 0., 0., 0., 1., 0., 0., 0., 1.]
        );
    }

    #[test]
    fn degenerate_circle_is_ignored() {
        let (graphics, _) = setup();
        let mut batch = ShapesBatch::new(&graphics);
        batch.begin_default().unwrap();
        batch
            .draw_circle(
                Point::zero(),
                10.,
                Color::WHITE,
                Some(1),
                None,
                None,
                Angle::zero(),
            )
            .unwrap();
        assert_eq!(batch.polygons_in_batch(), 0);
        batch.end_without_draw().unwrap();
    }

    #[test]
    fn overflow_flushes_and_continues() {
        let (graphics, log) = setup();
        let mut batch = ShapesBatch::with_capacity(&graphics, 4);
        batch.begin_default().unwrap();
        for x in 0..5 {
            batch
                .draw_point(Point::new(x as f32 * 4., 0.), Color::RED)
                .unwrap();
        }
        assert_eq!(batch.polygons_in_batch(), 1);
        batch.end().unwrap();
        assert_eq!(
            log.draws(),
            vec![(Topology::Triangles, 12), (Topology::Triangles, 3)]
        );
        assert_eq!(
            log.count(|command| matches!(command, DeviceCommand::DrawElements { .. })),
            2
        );
    }

    #[test]
    fn line_spans_both_points() {
        let (graphics, log) = setup();
        let mut batch = ShapesBatch::new(&graphics);
        batch.begin_default().unwrap();
        batch
            .draw_line(Point::new(0., 10.), Point::new(10., 10.), Color::WHITE, 2.)
            .unwrap();
        batch.end().unwrap();
        let positions = log.uploads_to(log.last_bound(VertexAttribute::Position).unwrap());
        approx::assert_relative_eq!(positions[0][0], 0.);
        approx::assert_relative_eq!(positions[0][1], 9.);
        approx::assert_relative_eq!(positions[0][3], 10.);
        approx::assert_relative_eq!(positions[0][7], 11.);
    }
}
