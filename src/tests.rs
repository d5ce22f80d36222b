use std::{cell::Cell, rc::Rc};

use tracing::Level;

use crate::{
    device::{CommandLog, DeviceCommand, Topology, VertexAttribute},
    prelude::*,
    FrameStats,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn setup() -> (Graphics, CommandLog) {
    init_tracing();
    let device = RecordingDevice::new();
    let log = device.log();
    (Graphics::new(device), log)
}

fn sprites(texture: &Texture, count: usize) -> Vec<Sprite> {
    (0..count)
        .map(|index| {
            Sprite::new(
                Some(texture.clone()),
                Point::new((index % 40) as f32 * 10., (index / 40) as f32 * 10.),
                Size::new(8., 8.),
            )
        })
        .collect()
}

fn uploads(log: &CommandLog) -> usize {
    log.count(|command| matches!(command, DeviceCommand::UploadVertices { .. }))
}

#[test]
fn overflow_splits_into_capacity_sized_draws() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(32, 32));
    let mut batch = SpriteBatch::new(&graphics);
    let overflows = Rc::new(Cell::new(0));
    let counter = overflows.clone();
    batch.on_overflow(move || counter.set(counter.get() + 1));

    batch.begin_default().unwrap();
    batch
        .draw_sprites(&sprites(&texture, 750), None, None)
        .unwrap();
    assert_eq!(batch.quads_in_batch(), 250);
    batch.end().unwrap();

    assert_eq!(
        log.draws(),
        vec![(Topology::Triangles, 3000), (Topology::Triangles, 1500)]
    );
    assert_eq!(overflows.get(), 1);
    assert_eq!(batch.quads_in_batch(), 0);
    assert_eq!(
        graphics.stats(),
        FrameStats {
            draw_calls: 2,
            quads_drawn: 750,
            shape_polygons_drawn: 0,
        }
    );

    // Input order survives the split: the second upload starts with sprite
    // 500.
    let positions = log.uploads_to(log.last_bound(VertexAttribute::Position).unwrap());
    assert_eq!(positions.len(), 2);
    let first_corner = &positions[1][..2];
    assert_eq!(first_corner, &[(500 % 40) as f32 * 10. - 4., (500 / 40) as f32 * 10. - 4.]);
}

#[test]
fn draw_count_rounds_up() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(32, 32));
    let mut batch = SpriteBatch::build().capacity(7).finish(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&texture, 15), None, None).unwrap();
    batch.end().unwrap();
    assert_eq!(log.draws().len(), 3);
    assert_eq!(graphics.stats().quads_drawn, 15);
}

#[test]
fn begin_twice_fails() {
    let (graphics, _) = setup();
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    assert_eq!(batch.begin_default(), Err(Error::AlreadyDrawing));
    batch.end_without_draw().unwrap();
    batch.begin_default().unwrap();
    batch.end().unwrap();
}

#[test]
fn texture_change_flushes() {
    let (graphics, log) = setup();
    let first = Texture::new(Size::new(16, 16));
    let second = Texture::new(Size::new(16, 16));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&first, 2), None, None).unwrap();
    batch.draw_sprites(&sprites(&second, 2), None, None).unwrap();
    batch.end().unwrap();

    assert_eq!(log.draws().len(), 2);
    let bound = log
        .commands()
        .into_iter()
        .filter_map(|command| match command {
            DeviceCommand::BindTexture { texture, .. } => Some(texture),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(bound, vec![first.id(), second.id()]);
}

#[test]
fn atlas_regions_share_a_draw_call() {
    let (graphics, log) = setup();
    let atlas = Texture::new(Size::new(64, 64));
    let left = atlas.region(Rect::new(Point::new(0, 0), Size::new(32, 64)));
    let right = atlas.region(Rect::new(Point::new(32, 0), Size::new(32, 64)));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&left, 3), None, None).unwrap();
    batch.draw_sprites(&sprites(&right, 3), None, None).unwrap();
    batch.end().unwrap();
    assert_eq!(log.draws(), vec![(Topology::Triangles, 36)]);
}

#[test]
fn clear_resets_counters() {
    let (graphics, _) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&texture, 5), None, None).unwrap();
    batch.clear().unwrap();
    assert_eq!(batch.quads_in_batch(), 0);
    assert_eq!(batch.core().buffers().unwrap().positions().len(), 0);
    batch.end().unwrap();
}

#[test]
fn end_without_draw_discards_contents() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&texture, 3), None, None).unwrap();
    batch.end_without_draw().unwrap();

    assert!(log.draws().is_empty());
    assert_eq!(graphics.stats().draw_calls, 0);
    assert_eq!(batch.quads_in_batch(), 0);
    assert!(!batch.is_drawing());
}

#[test]
fn end_without_draw_keeps_static_contents() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&texture, 4), None, None).unwrap();
    batch.make_static().unwrap();
    batch.end_without_draw().unwrap();

    assert!(log.draws().is_empty());
    assert_eq!(batch.quads_in_batch(), 4);

    batch.begin_default().unwrap();
    batch.present().unwrap();
    batch.end_without_draw().unwrap();
    assert_eq!(log.draws(), vec![(Topology::Triangles, 24)]);
    assert_eq!(batch.quads_in_batch(), 4);
}

#[test]
fn make_static_requires_a_scope() {
    let (graphics, _) = setup();
    let mut batch = SpriteBatch::new(&graphics);
    assert_eq!(batch.make_static(), Err(Error::NotDrawing));
    assert!(!batch.is_static());
}

#[test]
fn static_batch_redraws_without_upload() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprites(&sprites(&texture, 4), None, None).unwrap();
    batch.make_static().unwrap();
    assert!(batch.is_static());
    assert_eq!(batch.buffers_usage(), BufferUsage::Static);
    batch.end().unwrap();

    let uploaded = uploads(&log);
    assert!(uploaded > 0);
    assert_eq!(batch.clear(), Err(Error::Static));
    assert_eq!(batch.quads_in_batch(), 4);

    batch
        .begin(None, None, Some(Transform::translation(10., 0., 0.)), None)
        .unwrap();
    let sprite = sprites(&texture, 1).remove(0);
    assert_eq!(batch.draw_sprite(&sprite, None, None), Err(Error::Static));
    batch.present().unwrap();
    batch.end().unwrap();

    assert_eq!(uploads(&log), uploaded);
    assert_eq!(log.draws(), vec![(Topology::Triangles, 24); 3]);
    assert!(log.commands().contains(&DeviceCommand::SetMatrix {
        effect: graphics.builtin_effects().sprites.id(),
        uniform: crate::device::MatrixUniform::World,
        matrix: Transform::translation(10., 0., 0.),
    }));
}

#[test]
fn destroyed_batch_rejects_everything() {
    let (graphics, log) = setup();
    let mut batch = ShapesBatch::new(&graphics);
    batch.destroy();
    assert!(batch.is_destroyed());
    assert_eq!(batch.begin_default(), Err(Error::Destroyed));
    assert_eq!(batch.clear(), Err(Error::Destroyed));
    assert_eq!(
        batch.draw_point(Point::zero(), Color::WHITE),
        Err(Error::Destroyed)
    );
    let created = log.count(|command| matches!(command, DeviceCommand::CreateBuffer(_)));
    let deleted = log.count(|command| matches!(command, DeviceCommand::DeleteBuffer(_)));
    assert_eq!(created, deleted);
}

#[test]
fn dropping_a_batch_releases_buffers() {
    let (graphics, log) = setup();
    drop(LinesBatch::new(&graphics));
    let created = log.count(|command| matches!(command, DeviceCommand::CreateBuffer(_)));
    let deleted = log.count(|command| matches!(command, DeviceCommand::DeleteBuffer(_)));
    assert!(created > 0);
    assert_eq!(created, deleted);
}

#[test]
fn state_changes_are_cached_across_batches() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut first = SpriteBatch::new(&graphics);
    let mut second = SpriteBatch::new(&graphics);
    for batch in [&mut first, &mut second] {
        batch.begin_default().unwrap();
        batch.draw_sprites(&sprites(&texture, 1), None, None).unwrap();
        batch.end().unwrap();
    }
    assert_eq!(
        log.count(|command| matches!(command, DeviceCommand::UseEffect { .. })),
        1
    );
    assert_eq!(
        log.count(|command| matches!(command, DeviceCommand::SetBlendMode(_))),
        1
    );
    assert_eq!(
        log.count(|command| matches!(command, DeviceCommand::BindTexture { .. })),
        1
    );
}

#[test]
fn start_frame_resets_stats() {
    let (graphics, _) = setup();
    let mut batch = ShapesBatch::new(&graphics);
    batch.begin(Some(BlendMode::Additive), None, None, None).unwrap();
    batch.draw_point(Point::zero(), Color::WHITE).unwrap();
    batch.end().unwrap();
    assert_eq!(graphics.stats().draw_calls, 1);
    assert_eq!(graphics.stats().shape_polygons_drawn, 1);
    graphics.start_frame();
    assert_eq!(graphics.stats(), FrameStats::default());
}

#[test]
fn per_corner_colors_repeat_the_last_color() {
    // Existing behavior: fewer than four corner colors repeat the last one.
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    let sprite = Sprite::new(Some(texture), Point::new(20., 20.), Size::new(4., 4.))
        .with_color(SpriteColor::Corners(vec![Color::RED, Color::BLUE]));
    batch.draw_sprite(&sprite, None, None).unwrap();
    batch.end().unwrap();

    let colors = log.uploads_to(log.last_bound(VertexAttribute::Color).unwrap());
    let corners = colors[0].chunks(4).collect::<Vec<_>>();
    assert_eq!(
        corners,
        vec![
            &Color::RED.rgba()[..],
            &Color::BLUE.rgba()[..],
            &Color::BLUE.rgba()[..],
            &Color::BLUE.rgba()[..],
        ]
    );
}

#[test]
fn group_transform_moves_sprites() {
    let (graphics, log) = setup();
    let texture = Texture::new(Size::new(16, 16));
    let mut group = SpritesGroup::new();
    group.push(
        Sprite::new(Some(texture), Point::zero(), Size::new(2., 2.)).with_origin(Point::zero()),
    );
    group.position = Point::new(100., 50.);
    group.scale = Vector::new(2., 2.);

    let mut batch = SpriteBatch::new(&graphics);
    batch.begin_default().unwrap();
    batch.draw_sprite_group(&group, None).unwrap();
    batch.end().unwrap();

    let positions = log.uploads_to(log.last_bound(VertexAttribute::Position).unwrap());
    assert_eq!(
        positions[0],
        vec![100., 50., 0., 104., 50., 0., 100., 54., 0., 104., 54., 0.]
    );
}

#[test]
fn independent_graphics_share_nothing() {
    let (first, first_log) = setup();
    let (second, second_log) = setup();
    let mut batch = ShapesBatch::new(&first);
    batch.begin_default().unwrap();
    batch.draw_point(Point::zero(), Color::WHITE).unwrap();
    batch.end().unwrap();
    assert_eq!(first.stats().draw_calls, 1);
    assert_eq!(second.stats().draw_calls, 0);
    assert_eq!(first_log.draws().len(), 1);
    assert!(second_log.draws().is_empty());
}
