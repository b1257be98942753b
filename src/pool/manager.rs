use std::ops::AddAssign;

use rayon::prelude::*;

use crate::{
    foundation::error::{DrawPoolError, DrawPoolResult},
    graphics::{
        coords::GeometryBuffer,
        painter::{Painter, RenderTarget, TargetId},
        state::CompositionMode,
    },
    pool::{
        context::PoolContext,
        object::{DrawObject, Replayed},
        pool::{FramedState, Pool, PoolKind, PoolType},
        settings::DrawPoolSettings,
    },
};

/// Counters for one or more `draw` passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DrawStats {
    pub pools_drawn: u64,
    pub objects_replayed: u64,
    pub draw_calls: u64,
    pub actions_run: u64,
    pub framed_redraws: u64,
    pub framed_cache_hits: u64,
    /// Framed pools that were disabled this frame.
    pub framed_skipped: u64,
    pub dropped_primitives: u64,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.pools_drawn += rhs.pools_drawn;
        self.objects_replayed += rhs.objects_replayed;
        self.draw_calls += rhs.draw_calls;
        self.actions_run += rhs.actions_run;
        self.framed_redraws += rhs.framed_redraws;
        self.framed_cache_hits += rhs.framed_cache_hits;
        self.framed_skipped += rhs.framed_skipped;
        self.dropped_primitives += rhs.dropped_primitives;
    }
}

/// Registry of the fixed pool set.
///
/// Pools are populated through a [`PoolContext`], either immediately with
/// [`use_pool`](Self::use_pool) or every frame through a closure bound with
/// [`link`](Self::link). [`draw`](Self::draw) then replays every pool in
/// [`PoolType`] order on the render thread and clears them.
pub struct DrawPoolManager {
    settings: DrawPoolSettings,
    pools: Vec<Option<Pool>>,
    workers: Option<rayon::ThreadPool>,
    scratch: GeometryBuffer,
    next_target: u32,
    dropped: u64,
}

impl DrawPoolManager {
    pub fn new(settings: DrawPoolSettings) -> DrawPoolResult<Self> {
        settings.validate()?;
        let workers = if settings.multi_thread {
            Some(build_thread_pool(settings.threads)?)
        } else {
            None
        };
        tracing::debug!(multi_thread = settings.multi_thread, "draw pool manager created");
        Ok(Self {
            settings,
            pools: (0..PoolType::COUNT).map(|_| None).collect(),
            workers,
            scratch: GeometryBuffer::new(),
            next_target: 0,
            dropped: 0,
        })
    }

    pub fn settings(&self) -> &DrawPoolSettings {
        &self.settings
    }

    pub fn multi_thread_enabled(&self) -> bool {
        self.workers.is_some()
    }

    pub fn create_pool(&mut self, pool_type: PoolType) -> &mut Pool {
        tracing::debug!(?pool_type, "created pool");
        self.pools[pool_type.index()].insert(Pool::new(pool_type, PoolKind::Plain))
    }

    /// Registers a pool backed by an offscreen target. The map target is
    /// opaque and skips blending; the light target composites in light mode.
    pub fn create_framed_pool(&mut self, pool_type: PoolType) -> &mut Pool {
        let mut target = RenderTarget::new(TargetId(self.next_target));
        self.next_target += 1;

        match pool_type {
            PoolType::Map => target.disable_blend(),
            PoolType::Light => target.set_composition_mode(CompositionMode::Light),
            _ => {}
        }

        tracing::debug!(?pool_type, target = ?target.id(), "created framed pool");
        let framed = FramedState::new(target);
        self.pools[pool_type.index()].insert(Pool::new(
            pool_type,
            PoolKind::Framed(Box::new(framed)),
        ))
    }

    pub fn pool(&self, pool_type: PoolType) -> Option<&Pool> {
        self.pools[pool_type.index()].as_ref()
    }

    pub fn pool_mut(&mut self, pool_type: PoolType) -> Option<&mut Pool> {
        self.pools[pool_type.index()].as_mut()
    }

    pub fn framed_mut(&mut self, pool_type: PoolType) -> Option<&mut FramedState> {
        self.pool_mut(pool_type).and_then(Pool::framed_mut)
    }

    /// Binds `populate` as the draw phase of `pool_type`. It runs at the start
    /// of every [`draw`](Self::draw), on a worker when multithreading is on.
    pub fn link<F>(&mut self, pool_type: PoolType, populate: F) -> DrawPoolResult<()>
    where
        F: FnMut(&mut PoolContext<'_>) + Send + 'static,
    {
        let pool = self.pools[pool_type.index()].as_mut().ok_or_else(|| {
            DrawPoolError::validation(format!("cannot link unregistered pool {pool_type:?}"))
        })?;
        pool.populate = Some(Box::new(populate));
        Ok(())
    }

    pub fn unlink(&mut self, pool_type: PoolType) {
        if let Some(pool) = self.pool_mut(pool_type) {
            pool.populate = None;
        }
    }

    /// Populates `pool_type` right away. With multithreading enabled the
    /// closure runs synchronously on a worker thread.
    #[tracing::instrument(skip(self, f))]
    pub fn use_pool<F, R>(&mut self, pool_type: PoolType, f: F) -> DrawPoolResult<R>
    where
        F: FnOnce(&mut PoolContext<'_>) -> R + Send,
        R: Send,
    {
        let pool = self.pools[pool_type.index()].as_mut().ok_or_else(|| {
            DrawPoolError::validation(format!("cannot use unregistered pool {pool_type:?}"))
        })?;

        let multi_thread = self.settings.multi_thread;
        let run = move || {
            let mut ctx = PoolContext::begin(pool, multi_thread);
            let out = f(&mut ctx);
            (out, ctx.finish())
        };
        let (out, dropped) = match &self.workers {
            Some(workers) => workers.install(run),
            None => run(),
        };
        self.dropped += dropped;
        Ok(out)
    }

    /// End-of-frame pass: joins population, then replays every enabled pool
    /// in order. Framed pools redraw their target only when its content hash
    /// changed and otherwise composite the cached target. All pools are left
    /// empty.
    #[tracing::instrument(skip_all)]
    pub fn draw(&mut self, painter: &mut dyn Painter) -> DrawStats {
        let mut stats = DrawStats {
            dropped_primitives: self.run_linked() + std::mem::take(&mut self.dropped),
            ..DrawStats::default()
        };

        for pool in self.pools.iter_mut().filter_map(Option::as_mut) {
            if !pool.is_enabled() {
                if pool.is_framed() {
                    stats.framed_skipped += 1;
                }
                pool.clear();
                continue;
            }

            let pool_type = pool.pool_type();
            match pool.split_framed() {
                Some((framed, objects)) => {
                    draw_framed(pool_type, framed, objects, painter, &mut self.scratch, &mut stats)
                }
                None => {
                    stats.pools_drawn += 1;
                    replay_objects(pool.objects_mut(), painter, &mut self.scratch, &mut stats)
                }
            }
            pool.clear();
        }

        stats
    }

    /// Drops every pool and its linked closure.
    pub fn terminate(&mut self) {
        for slot in &mut self.pools {
            *slot = None;
        }
    }

    fn run_linked(&mut self) -> u64 {
        let multi_thread = self.settings.multi_thread;
        match &self.workers {
            Some(workers) => workers.install(|| {
                self.pools
                    .par_iter_mut()
                    .filter_map(Option::as_mut)
                    .map(|pool| run_populate(pool, multi_thread))
                    .sum::<u64>()
            }),
            None => self
                .pools
                .iter_mut()
                .filter_map(Option::as_mut)
                .map(|pool| run_populate(pool, multi_thread))
                .sum(),
        }
    }
}

fn run_populate(pool: &mut Pool, multi_thread: bool) -> u64 {
    let Some(mut populate) = pool.populate.take() else {
        return 0;
    };
    let mut ctx = PoolContext::begin(pool, multi_thread);
    populate(&mut ctx);
    let dropped = ctx.finish();
    pool.populate = Some(populate);
    dropped
}

fn draw_framed(
    pool_type: PoolType,
    framed: &mut FramedState,
    objects: &mut [DrawObject],
    painter: &mut dyn Painter,
    scratch: &mut GeometryBuffer,
    stats: &mut DrawStats,
) {
    if !framed.target().is_drawable() {
        tracing::trace!(?pool_type, "framed pool target not drawable");
        return;
    }
    stats.pools_drawn += 1;

    painter.sync_target(framed.target());
    painter.save_and_reset_state();

    if framed.has_modification() {
        tracing::trace!(?pool_type, hash = framed.current_hash(), "framed pool redraw");
        framed.update_status();
        painter.bind_target(framed.target());
        replay_objects(objects, painter, scratch, stats);
        painter.release_target(framed.target());
        stats.framed_redraws += 1;
    } else {
        tracing::trace!(?pool_type, "framed pool cache hit");
        stats.framed_cache_hits += 1;
    }

    if let Some(hook) = framed.before_draw.as_mut() {
        hook(&mut *painter);
    }
    painter.draw_target(framed.target(), framed.dest(), framed.src());
    if let Some(hook) = framed.after_draw.as_mut() {
        hook(&mut *painter);
    }

    painter.restore_saved_state();
}

fn replay_objects(
    objects: &mut [DrawObject],
    painter: &mut dyn Painter,
    scratch: &mut GeometryBuffer,
    stats: &mut DrawStats,
) {
    for obj in objects {
        stats.objects_replayed += 1;
        match obj.replay(painter, scratch) {
            Replayed::DrawCall => stats.draw_calls += 1,
            Replayed::Action => stats.actions_run += 1,
            Replayed::Nothing => {}
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> DrawPoolResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("drawpool-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DrawPoolError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pool/manager.rs"]
mod tests;
