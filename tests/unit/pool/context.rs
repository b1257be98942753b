use super::*;
use crate::{
    graphics::painter::{RenderTarget, TargetId},
    pool::{
        object::DrawObject,
        pool::{FramedState, PoolKind},
    },
    test_support::texture,
};

fn plain() -> Pool {
    Pool::new(PoolType::Text, PoolKind::Plain)
}

fn populate(pool: &mut Pool, multi_thread: bool, f: impl FnOnce(&mut PoolContext<'_>)) -> u64 {
    let mut ctx = PoolContext::begin(pool, multi_thread);
    f(&mut ctx);
    ctx.finish()
}

#[test]
fn degenerate_primitives_are_dropped() {
    let tex = texture(32, 32);
    let empty_tex = texture(0, 32);
    let p = Point::new(3, 3);
    let mut pool = plain();

    let dropped = populate(&mut pool, false, |ctx| {
        ctx.add_textured_rect(Rect::new(0, 0, 0, 32), &tex);
        ctx.add_textured_rect_src(Rect::new(0, 0, 32, 32), &tex, Rect::default());
        ctx.add_textured_rect(Rect::new(0, 0, 32, 32), &empty_tex);
        ctx.add_upside_down_textured_rect(Rect::new(0, 0, 32, -1), &tex, Rect::new(0, 0, 1, 1));
        ctx.add_repeated_textured_rect(Rect::new(0, 0, 32, 32), &empty_tex);
        ctx.add_repeated_filled_rect(Rect::new(0, 0, 0, 0));
        ctx.add_filled_rect(Rect::new(4, 4, -2, 2));
        ctx.add_filled_triangle(p, p, Point::new(9, 9));
        ctx.add_filled_triangle(p, Point::new(9, 9), p);
        ctx.add_bounding_rect(Rect::new(0, 0, 10, 10), 0);
        ctx.add_fill_coords(Arc::new(GeometryBuffer::new()));
        ctx.add_texture_coords(
            Arc::new(GeometryBuffer::new()),
            Some(&tex),
            DrawMode::Triangles,
        );
    });

    assert_eq!(dropped, 12);
    assert!(pool.objects().is_empty());
}

#[test]
fn valid_primitives_are_queued() {
    let mut pool = plain();
    let dropped = populate(&mut pool, false, |ctx| {
        ctx.add_filled_rect(Rect::new(0, 0, 4, 4));
        ctx.add_filled_triangle(Point::new(0, 0), Point::new(4, 0), Point::new(0, 4));
        ctx.add_bounding_rect(Rect::new(0, 0, 10, 10), 2);
    });

    assert_eq!(dropped, 0);
    assert_eq!(pool.objects().len(), 1);
    assert_eq!(
        pool.objects()[0].as_primitives().unwrap().methods().len(),
        3
    );
}

#[test]
fn multi_thread_calls_off_worker_are_ignored() {
    let tex = texture(32, 32);
    let mut pool = plain();
    let dropped = populate(&mut pool, true, |ctx| {
        assert!(!ctx.accepts_draws());
        ctx.add_textured_rect(Rect::new(0, 0, 32, 32), &tex);
        ctx.add_filled_rect(Rect::new(0, 0, 4, 4));
        ctx.add_action(|_| {});
    });

    assert_eq!(dropped, 0);
    assert!(pool.objects().is_empty());
}

#[test]
fn worker_population_caches_geometry() {
    let tex = texture(32, 32);
    let mut pool = plain();
    let workers = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();

    workers.install(|| {
        populate(&mut pool, true, |ctx| {
            assert!(ctx.accepts_draws());
            ctx.add_textured_rect(Rect::new(0, 0, 32, 32), &tex);
            ctx.add_textured_rect(Rect::new(32, 0, 32, 32), &tex);
        })
    });

    let batch = pool.objects()[0].as_primitives().unwrap();
    let cached = batch.cached_geometry().expect("geometry cached on worker");
    assert_eq!(batch.mode(), DrawMode::Triangles);
    assert_eq!(cached.vertex_count(), 12);
    assert_eq!(cached.tex_coords().len(), 12);
}

#[test]
fn single_thread_population_defers_geometry() {
    let mut pool = plain();
    populate(&mut pool, false, |ctx| ctx.add_filled_rect(Rect::new(0, 0, 4, 4)));
    let batch = pool.objects()[0].as_primitives().unwrap();
    assert!(batch.cached_geometry().is_none());
}

#[test]
fn flush_closes_the_current_batch() {
    let mut pool = plain();
    populate(&mut pool, false, |ctx| {
        ctx.add_filled_rect(Rect::new(0, 0, 4, 4));
        ctx.flush();
        ctx.add_filled_rect(Rect::new(4, 0, 4, 4));
        ctx.add_filled_rect(Rect::new(8, 0, 4, 4));
    });

    assert_eq!(pool.objects().len(), 2);
    assert_eq!(
        pool.objects()[1].as_primitives().unwrap().methods().len(),
        2
    );
}

#[test]
fn raw_coordinate_buffers_are_shared_not_copied() {
    let mut buf = GeometryBuffer::new();
    buf.add_rect(Rect::new(0, 0, 8, 8));
    let buf = Arc::new(buf);
    let expected_hash = buf.vertex_hash();

    let mut pool = plain();
    populate(&mut pool, false, |ctx| {
        ctx.add_fill_coords(Arc::clone(&buf));
        ctx.add_filled_rect(Rect::new(0, 0, 4, 4));
    });

    assert_eq!(pool.objects().len(), 2);
    let raw = pool.objects()[0].as_primitives().unwrap();
    assert!(std::ptr::eq(raw.cached_geometry().unwrap(), &*buf));
    assert_eq!(
        raw.methods(),
        &[DrawMethod::FillCoords {
            hash: expected_hash
        }]
    );
    assert_eq!(Arc::strong_count(&buf), 2);

    pool.clear();
    assert_eq!(Arc::strong_count(&buf), 1);
}

#[test]
fn actions_are_separate_objects() {
    let mut pool = plain();
    populate(&mut pool, false, |ctx| {
        ctx.add_filled_rect(Rect::new(0, 0, 4, 4));
        ctx.add_action(|_| {});
        ctx.add_filled_rect(Rect::new(4, 0, 4, 4));
    });

    let objs = pool.objects();
    assert_eq!(objs.len(), 3);
    assert!(matches!(objs[0], DrawObject::Primitives(_)));
    assert!(objs[1].is_action());
    assert!(matches!(objs[2], DrawObject::Primitives(_)));
}

#[test]
fn use_frame_configures_framed_pool_and_feeds_hash() {
    let mut pool = Pool::new(
        PoolType::Light,
        PoolKind::Framed(Box::new(FramedState::new(RenderTarget::new(TargetId(1))))),
    );
    let dest = Rect::new(0, 0, 100, 100);
    let src = Rect::new(0, 0, 50, 50);

    populate(&mut pool, false, |ctx| ctx.use_frame(dest, src, Color::BLACK));
    let black = pool.framed().unwrap().current_hash();
    pool.clear();
    populate(&mut pool, false, |ctx| ctx.use_frame(dest, src, Color::WHITE));
    let white = pool.framed().unwrap().current_hash();

    let framed = pool.framed().unwrap();
    assert_eq!(framed.dest(), dest);
    assert_eq!(framed.src(), src);
    assert_eq!(framed.target().clear_color(), Color::WHITE);
    assert_ne!(black, white);
}

#[test]
fn use_frame_on_plain_pool_is_ignored() {
    let mut pool = plain();
    populate(&mut pool, false, |ctx| {
        ctx.use_frame(Rect::new(0, 0, 1, 1), Rect::new(0, 0, 1, 1), Color::BLACK);
        assert!(!ctx.is_framed());
    });
    assert!(pool.objects().is_empty());
}

#[test]
fn opacity_is_clamped_and_resettable() {
    let mut pool = plain();
    populate(&mut pool, false, |ctx| {
        ctx.set_opacity(3.0);
        assert_eq!(ctx.opacity(), 1.0);
        ctx.set_opacity(0.25);
        assert_eq!(ctx.opacity(), 0.25);
        ctx.reset_opacity();
        assert_eq!(ctx.opacity(), 1.0);
    });
}
