use super::*;
use crate::{
    foundation::core::Point,
    graphics::painter::TargetId,
    test_support::{opaque_texture, superimposable_texture, texture},
};

fn plain() -> Pool {
    Pool::new(PoolType::Map, PoolKind::Plain)
}

fn framed() -> Pool {
    let target = RenderTarget::new(TargetId(7));
    Pool::new(
        PoolType::Map,
        PoolKind::Framed(Box::new(FramedState::new(target))),
    )
}

fn populate(pool: &mut Pool, f: impl FnOnce(&mut PoolContext<'_>)) {
    let mut ctx = PoolContext::begin(pool, false);
    f(&mut ctx);
    ctx.finish();
}

fn batches(pool: &Pool) -> Vec<&PrimitiveBatch> {
    pool.objects()
        .iter()
        .filter_map(DrawObject::as_primitives)
        .collect()
}

fn tile(x: i32, y: i32) -> Rect {
    Rect::new(x * 32, y * 32, 32, 32)
}

#[test]
fn same_state_merges_in_order_and_forces_triangles() {
    let tex = texture(32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        for x in 0..3 {
            ctx.add_textured_rect(tile(x, 0), &tex);
        }
    });

    let b = batches(&pool);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].mode(), DrawMode::Triangles);
    let dests: Vec<Rect> = b[0]
        .methods()
        .iter()
        .map(|m| match m {
            DrawMethod::TexturedRect { dest, .. } => *dest,
            other => panic!("unexpected method {other:?}"),
        })
        .collect();
    assert_eq!(dests, vec![tile(0, 0), tile(1, 0), tile(2, 0)]);
}

#[test]
fn lone_textured_rect_keeps_strip_topology() {
    let tex = texture(32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| ctx.add_textured_rect(tile(0, 0), &tex));

    let b = batches(&pool);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].mode(), DrawMode::TriangleStrip);
}

#[test]
fn alternating_states_split_at_every_boundary() {
    let a = texture(32, 32);
    let b = texture(32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_textured_rect(tile(0, 0), &a);
        ctx.add_textured_rect(tile(1, 0), &b);
        ctx.add_textured_rect(tile(2, 0), &a);
        ctx.add_textured_rect(tile(3, 0), &b);
    });

    let objs = batches(&pool);
    assert_eq!(objs.len(), 4);
    assert!(objs.iter().all(|o| o.methods().len() == 1));
    assert_eq!(objs[0].state().texture_id(), a.id());
    assert_eq!(objs[1].state().texture_id(), b.id());
}

#[test]
fn paint_state_changes_split_batches() {
    let tex = texture(32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_textured_rect(tile(0, 0), &tex);
        ctx.set_opacity(0.5);
        ctx.add_textured_rect(tile(1, 0), &tex);
        ctx.add_textured_rect(tile(2, 0), &tex);
    });

    let objs = batches(&pool);
    assert_eq!(objs.len(), 2);
    assert_eq!(objs[1].methods().len(), 2);
    assert_eq!(objs[1].state().paint.opacity, 0.5);
}

#[test]
fn opaque_draw_prunes_superimposable_draw_at_same_destination() {
    let ground = superimposable_texture(32, 32);
    let wall = opaque_texture(32, 32);
    let origin = Point::new(5, 5);
    let src = Rect::new(0, 0, 32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_textured_rect_at(tile(5, 5), &ground, src, origin);
        ctx.add_textured_rect_at(tile(5, 5), &wall, src, origin);
    });

    let with_origin: Vec<&DrawMethod> = batches(&pool)
        .iter()
        .flat_map(|b| b.methods())
        .filter(|m| m.explicit_dest() == Some(origin))
        .collect();
    assert_eq!(with_origin.len(), 1);

    let objs = batches(&pool);
    assert_eq!(objs.len(), 2);
    assert!(objs[0].methods().is_empty());
    assert_eq!(objs[1].state().texture_id(), wall.id());
}

#[test]
fn same_state_redraw_at_same_destination_replaces_previous() {
    let tex = texture(64, 64);
    let origin = Point::new(1, 1);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_textured_rect_at(tile(1, 1), &tex, Rect::new(0, 0, 32, 32), origin);
        ctx.add_textured_rect_at(tile(1, 1), &tex, Rect::new(32, 0, 32, 32), origin);
    });

    let objs = batches(&pool);
    assert_eq!(objs.len(), 1);
    assert_eq!(objs[0].methods().len(), 1);
    assert_eq!(objs[0].methods()[0].src(), Some(Rect::new(32, 0, 32, 32)));
}

#[test]
fn no_pruning_without_explicit_destination_or_opacity() {
    let ground = superimposable_texture(32, 32);
    let translucent = texture(32, 32);
    let src = Rect::new(0, 0, 32, 32);
    let origin = Point::new(0, 0);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_textured_rect(tile(0, 0), &ground);
        ctx.add_textured_rect(tile(0, 0), &ground);
        ctx.add_textured_rect_at(tile(0, 0), &ground, src, origin);
        ctx.add_textured_rect_at(tile(0, 0), &translucent, src, origin);
    });

    let total: usize = batches(&pool).iter().map(|b| b.methods().len()).sum();
    assert_eq!(total, 4);
}

#[test]
fn repeated_fills_join_any_matching_object() {
    let tex = texture(32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_repeated_textured_rect(tile(0, 0), &tex);
        ctx.add_filled_rect(Rect::new(0, 0, 8, 8));
        ctx.add_repeated_textured_rect(tile(1, 0), &tex);
    });

    let objs = batches(&pool);
    assert_eq!(objs.len(), 2);
    assert_eq!(objs[0].methods().len(), 2);
    assert!(matches!(
        objs[1].methods()[0],
        DrawMethod::FilledRect { .. }
    ));
}

#[test]
fn repeated_rect_joining_a_strip_batch_switches_to_triangles() {
    let tex = texture(32, 32);
    let mut pool = plain();
    populate(&mut pool, |ctx| {
        ctx.add_textured_rect(tile(0, 0), &tex);
        ctx.add_repeated_textured_rect(tile(2, 2), &tex);
    });

    let b = batches(&pool);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].methods().len(), 2);
    assert_eq!(b[0].mode(), DrawMode::Triangles);
}

#[test]
fn framed_hash_is_deterministic_and_order_sensitive() {
    let tex = texture(32, 32);
    let hash_of = |order: &[i32]| {
        let mut pool = framed();
        populate(&mut pool, |ctx| {
            for &x in order {
                ctx.add_textured_rect(tile(x, 0), &tex);
            }
        });
        pool.framed().map(FramedState::current_hash).unwrap()
    };

    assert_eq!(hash_of(&[0, 1]), hash_of(&[0, 1]));
    assert_ne!(hash_of(&[0, 1]), hash_of(&[1, 0]));
}

#[test]
fn framed_status_tracks_clean_dirty_rendered() {
    let tex = texture(32, 32);
    let mut pool = framed();
    let fill = |pool: &mut Pool, x: i32| populate(pool, |ctx| ctx.add_textured_rect(tile(x, 0), &tex));

    fill(&mut pool, 0);
    let state = pool.framed_mut().unwrap();
    assert!(state.has_modification());
    state.update_status();
    assert!(!state.has_modification());

    pool.clear();
    fill(&mut pool, 0);
    assert!(!pool.framed().unwrap().has_modification());

    pool.clear();
    fill(&mut pool, 1);
    assert!(pool.framed().unwrap().has_modification());
}

#[test]
fn resizing_target_forces_redraw() {
    let mut pool = framed();
    let state = pool.framed_mut().unwrap();
    state.update_status();
    assert!(!state.has_modification());

    state.resize(Size::new(64, 64));
    assert!(state.has_modification());
    state.update_status();
    state.resize(Size::new(64, 64));
    assert!(!state.has_modification());
}

#[test]
fn plain_pool_has_no_framed_capability() {
    let mut pool = plain();
    assert!(!pool.is_framed());
    assert!(pool.framed().is_none());
    assert!(pool.framed_mut().is_none());
}

#[test]
fn populations_of_one_frame_fold_into_a_single_hash() {
    let tex = texture(32, 32);
    let fill = |pool: &mut Pool, x: i32| populate(pool, |ctx| ctx.add_textured_rect(tile(x, 0), &tex));

    let mut pool = framed();
    fill(&mut pool, 0);
    fill(&mut pool, 1);
    let both = pool.framed().unwrap().current_hash();

    let mut only_second = framed();
    fill(&mut only_second, 1);
    assert_ne!(both, only_second.framed().unwrap().current_hash());

    pool.framed_mut().unwrap().update_status();
    pool.clear();
    fill(&mut pool, 0);
    fill(&mut pool, 1);
    assert_eq!(pool.framed().unwrap().current_hash(), both);
    assert!(!pool.framed().unwrap().has_modification());

    pool.clear();
    fill(&mut pool, 2);
    fill(&mut pool, 1);
    assert!(pool.framed().unwrap().has_modification());
}
