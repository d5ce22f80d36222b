use tracing::warn;

use super::{BatchCore, DrawBatch, FlushHooks, NoHooks, DEFAULT_CAPACITY, DEFAULT_CIRCLE_SEGMENTS};
use crate::{
    buffer::{BufferLayout, PrimitiveKind},
    color::Color,
    device::Topology,
    effect::Effect,
    graphics::Graphics,
    math::{circle_points, Angle, Point, Rect, Size, Vector},
    sprite::{quad_corners, SpriteColor},
    vertex::Vertex,
    Result,
};

/// Batches colored line segments, or a single connected line strip.
#[derive(Debug)]
pub struct LinesBatch {
    core: BatchCore,
    lines_strip: bool,
    /// Floors the corners of quads and rectangles to whole pixels.
    pub snap_pixels: bool,
}

impl LinesBatch {
    /// Creates a batch holding [`DEFAULT_CAPACITY`] line segments.
    #[must_use]
    pub fn new(graphics: &Graphics) -> Self {
        Self::with_capacity(graphics, DEFAULT_CAPACITY)
    }

    /// Creates a batch holding `lines` line segments before flushing.
    #[must_use]
    pub fn with_capacity(graphics: &Graphics, lines: usize) -> Self {
        let layout = BufferLayout {
            colors: true,
            ..BufferLayout::default()
        };
        Self {
            core: BatchCore::new(graphics, PrimitiveKind::Lines, lines, layout, false),
            lines_strip: false,
            snap_pixels: false,
        }
    }

    /// Returns true if vertices extend one connected strip instead of
    /// forming independent pairs.
    #[must_use]
    pub const fn lines_strip(&self) -> bool {
        self.lines_strip
    }

    /// Switches between strip and segment mode. Takes effect on the next
    /// flush, so switch between scopes.
    pub fn set_lines_strip(&mut self, strip: bool) {
        self.lines_strip = strip;
        self.core.set_topology(if strip {
            Topology::LineStrip
        } else {
            Topology::Lines
        });
    }

    /// Appends vertices. In segment mode every two vertices form a line and
    /// an odd count logs a warning and writes nothing. In strip mode every
    /// vertex extends the strip.
    pub fn draw_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.core.validate_drawing(true)?;
        if self.lines_strip {
            for vertex in vertices {
                self.core.push(&NoHooks, std::slice::from_ref(vertex), 1)?;
                if self.core.primitives() == 0 {
                    // The strip was just flushed. Start the next one where
                    // this one ended.
                    self.core.push(&NoHooks, std::slice::from_ref(vertex), 0)?;
                }
            }
            return Ok(());
        }

        if vertices.len() % 2 != 0 {
            warn!(
                count = vertices.len(),
                "line vertices must come in pairs"
            );
            return Ok(());
        }
        for segment in vertices.chunks_exact(2) {
            self.core.push(&NoHooks, segment, 1)?;
        }
        Ok(())
    }

    /// Outlines a quad of `size` anchored at `origin` (a fraction of `size`,
    /// centered when `None`) and placed at `position`.
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
        let [top_left, top_right, bottom_left, bottom_right] = [0, 1, 2, 3]
            .map(|index| Vertex::flat(corners[index], colors[index]));
        if self.lines_strip {
            self.draw_vertices(&[top_left, top_right, bottom_right, bottom_left, top_left])
        } else {
            self.draw_vertices(&[
                top_left,
                top_right,
                top_right,
                bottom_right,
                bottom_right,
                bottom_left,
                bottom_left,
                top_left,
            ])
        }
    }

    /// Outlines `destination`, rotated around its center.
    pub fn draw_rectangle(
        &mut self,
        destination: Rect,
        color: impl Into<SpriteColor>,
        rotation: Angle,
    ) -> Result<()> {
        self.draw_quad(
            destination.center(),
            destination.size,
            color,
            rotation,
            None,
            None,
        )
    }

    /// Outlines a circle with `segments` lines, closing the loop. `ratio`
    /// stretches the circle into an oval, which is then rotated by
    /// `rotation`.
    ///
    /// Fewer than two segments draws nothing.
    pub fn draw_circle(
        &mut self,
        center: Point,
        radius: f32,
        color: Color,
        segments: Option<usize>,
        ratio: Option<Vector>,
        rotation: Angle,
    ) -> Result<()> {
        self.core.validate_drawing(true)?;
        let segments = segments.unwrap_or(DEFAULT_CIRCLE_SEGMENTS);
        if segments < 2 {
            return Ok(());
        }
        let ratio = ratio.unwrap_or_else(|| Vector::new(1., 1.));

        let outline = circle_points(center, radius, segments, ratio, rotation)
            .into_iter()
            .map(|point| Vertex::flat(point, color))
            .collect::<Vec<_>>();
        if self.lines_strip {
            self.draw_vertices(&outline)
        } else {
            let pairs = outline
                .windows(2)
                .flat_map(|pair| pair.iter().copied())
                .collect::<Vec<_>>();
            self.draw_vertices(&pairs)
        }
    }

    /// The number of lines written since the last flush.
    #[must_use]
    pub fn lines_in_batch(&self) -> usize {
        self.core.primitives()
    }

    /// The number of lines the batch holds before flushing.
    #[must_use]
    pub fn max_lines_count(&self) -> usize {
        self.core.capacity()
    }

    /// Returns true if the batch reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.lines_in_batch() >= self.max_lines_count()
    }
}

impl DrawBatch for LinesBatch {
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
    use crate::device::{CommandLog, RecordingDevice, VertexAttribute};

    fn setup() -> (Graphics, CommandLog) {
        let device = RecordingDevice::new();
        let log = device.log();
        (Graphics::new(device), log)
    }

    #[test]
    fn strip_circle_closes_the_loop() {
        let (graphics, log) = setup();
        let mut batch = LinesBatch::new(&graphics);
        batch.set_lines_strip(true);
        batch.begin_default().unwrap();
        batch
            .draw_circle(Point::new(100., 100.), 20., Color::WHITE, Some(24), None, Angle::zero())
            .unwrap();
        assert_eq!(batch.core().buffers().unwrap().vertices(), 25);
        assert!(log.draws().is_empty());
        batch.end().unwrap();
        assert_eq!(log.draws(), vec![(Topology::LineStrip, 25)]);
    }

    #[test]
    fn segment_circle_emits_pairs() {
        let (graphics, log) = setup();
        let mut batch = LinesBatch::new(&graphics);
        batch.begin_default().unwrap();
        batch
            .draw_circle(Point::zero(), 5., Color::WHITE, Some(6), None, Angle::zero())
            .unwrap();
        assert_eq!(batch.lines_in_batch(), 6);
        batch.end().unwrap();
        assert_eq!(log.draws(), vec![(Topology::Lines, 12)]);
        assert_eq!(graphics.stats().shape_polygons_drawn, 6);
    }

    #[test]
    fn odd_segment_vertices_write_nothing() {
        let (graphics, _) = setup();
        let mut batch = LinesBatch::new(&graphics);
        batch.begin_default().unwrap();
        let vertex = Vertex::flat(Point::zero(), Color::WHITE);
        batch.draw_vertices(&[vertex; 3]).unwrap();
        assert_eq!(batch.lines_in_batch(), 0);
        batch.set_lines_strip(true);
        batch.draw_vertices(&[vertex; 3]).unwrap();
        assert_eq!(batch.lines_in_batch(), 3);
        batch.end_without_draw().unwrap();
    }

    #[test]
    fn rectangle_outlines() {
        let (graphics, _) = setup();
        let rect = Rect::new(Point::new(10., 10.), Size::new(20., 20.));

        let mut segments = LinesBatch::new(&graphics);
        segments.begin_default().unwrap();
        segments
            .draw_rectangle(rect, Color::WHITE, Angle::zero())
            .unwrap();
        assert_eq!(segments.core().buffers().unwrap().vertices(), 8);
        assert_eq!(segments.lines_in_batch(), 4);
        segments.end_without_draw().unwrap();

        let mut strip = LinesBatch::new(&graphics);
        strip.set_lines_strip(true);
        strip.begin_default().unwrap();
        strip.draw_rectangle(rect, Color::WHITE, Angle::zero()).unwrap();
        assert_eq!(strip.core().buffers().unwrap().vertices(), 5);
        strip.end_without_draw().unwrap();
    }

    #[test]
    fn strip_overflow_stays_connected() {
        let (graphics, log) = setup();
        let mut batch = LinesBatch::with_capacity(&graphics, 3);
        batch.set_lines_strip(true);
        batch.begin_default().unwrap();
        let vertices = (0..5)
            .map(|x| Vertex::flat(Point::new(x as f32, 0.), Color::WHITE))
            .collect::<Vec<_>>();
        batch.draw_vertices(&vertices).unwrap();
        batch.end().unwrap();

        assert_eq!(
            log.draws(),
            vec![(Topology::LineStrip, 3), (Topology::LineStrip, 3)]
        );
        let positions = log.uploads_to(log.last_bound(VertexAttribute::Position).unwrap());
        assert_eq!(positions[1][0], 2.);
    }

    #[test]
    fn strip_filling_capacity_draws_once() {
        let (graphics, log) = setup();
        let mut batch = LinesBatch::with_capacity(&graphics, 3);
        batch.set_lines_strip(true);
        batch.begin_default().unwrap();
        let vertices = (0..3)
            .map(|x| Vertex::flat(Point::new(x as f32, 0.), Color::WHITE))
            .collect::<Vec<_>>();
        batch.draw_vertices(&vertices).unwrap();
        batch.end().unwrap();

        assert_eq!(log.draws(), vec![(Topology::LineStrip, 3)]);
        assert_eq!(graphics.stats().draw_calls, 1);
    }

    #[test]
    fn strip_circle_filling_capacity_draws_once() {
        let (graphics, log) = setup();
        let mut batch = LinesBatch::with_capacity(&graphics, 25);
        batch.set_lines_strip(true);
        batch.begin_default().unwrap();
        batch
            .draw_circle(Point::zero(), 10., Color::WHITE, Some(24), None, Angle::zero())
            .unwrap();
        batch.end().unwrap();

        assert_eq!(log.draws(), vec![(Topology::LineStrip, 25)]);
        assert_eq!(graphics.stats().draw_calls, 1);
    }
}
