//! Drawpool is a render-command batching engine for a real-time 2D game client.
//!
//! Draw requests issued during a frame are merged into as few render-state
//! changes as possible and replayed at the end of the frame.
//!
//! # Frame overview
//!
//! 1. **Populate**: game logic fills pools through a [`PoolContext`], either
//!    right away ([`DrawPoolManager::use_pool`]) or from closures bound with
//!    [`DrawPoolManager::link`], which run on worker threads when
//!    multithreading is enabled.
//! 2. **Batch**: consecutive primitives with an equal [`RenderState`] share one
//!    [`DrawObject`]; draws fully covered by a later one are pruned.
//! 3. **Replay**: [`DrawPoolManager::draw`] submits every pool to a [`Painter`]
//!    in [`PoolType`] order. Framed pools re-render their offscreen target only
//!    when their content hash changed and otherwise composite the cached one.
//!
//! [`LightView`] builds on this to composite per-frame point lights over the
//! map through the framed light pool.
#![forbid(unsafe_code)]

mod foundation;
mod graphics;
mod light;
mod pool;

#[cfg(test)]
#[path = "../tests/support/mod.rs"]
mod test_support;

pub use foundation::core::{Color, Point, Rect, Size};
pub use foundation::error::{DrawPoolError, DrawPoolResult};
pub use foundation::hash::Fnv1a64;
pub use graphics::coords::GeometryBuffer;
pub use graphics::painter::{Painter, RenderTarget, TargetId};
pub use graphics::state::{
    BlendEquation, CompositionMode, DrawMode, PaintState, RenderState, ShaderId,
};
pub use graphics::texture::{Texture, TextureProvider, TexturePtr};
pub use light::view::{
    DARKNESS_THRESHOLD, LIGHT_TEXTURE, Light, LightSource, LightView, SHADE_TEXTURE,
};
pub use pool::context::PoolContext;
pub use pool::manager::{DrawPoolManager, DrawStats};
pub use pool::method::DrawMethod;
pub use pool::object::{DrawAction, DrawObject, PrimitiveBatch};
pub use pool::pool::{CompositeHook, FramedState, Pool, PoolKind, PoolType, PopulateFn};
pub use pool::settings::{DrawPoolSettings, ENV_MULTI_THREAD, ENV_THREADS};
