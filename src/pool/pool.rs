use crate::{
    foundation::{
        core::{Color, Rect, Size},
        hash::Fnv1a64,
    },
    graphics::{
        painter::{Painter, RenderTarget},
        state::{DrawMode, RenderState},
    },
    pool::{
        context::PoolContext,
        method::DrawMethod,
        object::{DrawAction, DrawObject, PrimitiveBatch},
    },
};

/// Fixed set of pools, in replay order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum PoolType {
    Map,
    CreatureInformation,
    Light,
    Text,
    Foreground,
}

impl PoolType {
    pub const COUNT: usize = 5;

    pub const ALL: [PoolType; PoolType::COUNT] = [
        PoolType::Map,
        PoolType::CreatureInformation,
        PoolType::Light,
        PoolType::Text,
        PoolType::Foreground,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Population closure bound to a pool with `DrawPoolManager::link`.
pub type PopulateFn = Box<dyn FnMut(&mut PoolContext<'_>) + Send>;

/// Hook run around compositing a framed pool's target.
pub type CompositeHook = Box<dyn FnMut(&mut dyn Painter) + Send>;

/// Whether a pool replays straight into the frame or through a cached target.
pub enum PoolKind {
    /// Objects are replayed into the current output every frame.
    Plain,
    /// Objects are rendered into an offscreen target that is reused while the
    /// content hash is unchanged.
    Framed(Box<FramedState>),
}

/// Ordered draw objects replayed together.
pub struct Pool {
    pool_type: PoolType,
    objects: Vec<DrawObject>,
    enabled: bool,
    kind: PoolKind,
    pub(crate) populate: Option<PopulateFn>,
}

impl Pool {
    pub(crate) fn new(pool_type: PoolType, kind: PoolKind) -> Self {
        Self {
            pool_type,
            objects: Vec::new(),
            enabled: true,
            kind,
            populate: None,
        }
    }

    /// Slot this pool occupies in the replay order.
    pub fn pool_type(&self) -> PoolType {
        self.pool_type
    }

    /// Draw objects queued this frame, in replay order.
    pub fn objects(&self) -> &[DrawObject] {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut Vec<DrawObject> {
        &mut self.objects
    }

    /// Disabled pools are cleared without being replayed.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Toggles whether the next `draw` replays this pool.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// `true` when a population closure is bound with `DrawPoolManager::link`.
    pub fn is_linked(&self) -> bool {
        self.populate.is_some()
    }

    /// Capability check for the framed-only operations.
    pub fn is_framed(&self) -> bool {
        matches!(self.kind, PoolKind::Framed(_))
    }

    /// Framed state, or `None` for a plain pool.
    pub fn framed(&self) -> Option<&FramedState> {
        match &self.kind {
            PoolKind::Framed(state) => Some(&**state),
            PoolKind::Plain => None,
        }
    }

    /// Mutable framed state, or `None` for a plain pool.
    pub fn framed_mut(&mut self) -> Option<&mut FramedState> {
        match &mut self.kind {
            PoolKind::Framed(state) => Some(&mut **state),
            PoolKind::Plain => None,
        }
    }

    pub(crate) fn split_framed(&mut self) -> Option<(&mut FramedState, &mut Vec<DrawObject>)> {
        match &mut self.kind {
            PoolKind::Framed(state) => Some((&mut **state, &mut self.objects)),
            PoolKind::Plain => None,
        }
    }

    /// Drops every queued object and ends the frame: the next population
    /// starts a fresh content hash.
    pub fn clear(&mut self) {
        self.objects.clear();
        if let Some(framed) = self.framed_mut() {
            framed.populated = false;
        }
    }

    /// Queues `method` under `state`, merging into the last object when the
    /// states match and pruning a prior draw it fully covers.
    pub(crate) fn add(
        &mut self,
        state: RenderState,
        method: DrawMethod,
        mode: DrawMode,
        break_batch: bool,
    ) {
        if let Some(framed) = self.framed_mut() {
            framed.update_hash(&state, &method);
        }

        if !break_batch
            && let Some(DrawObject::Primitives(prev)) = self.objects.last_mut()
            && !prev.holds_raw_coords()
        {
            let same_state = prev.state == state;

            if let Some(dest) = method.explicit_dest() {
                let new_opaque = state.texture.as_ref().is_some_and(|t| t.is_opaque());
                let prev_superimposable = prev
                    .state
                    .texture
                    .as_ref()
                    .is_some_and(|t| t.can_superimpose());
                let covered = prev.methods.iter().position(|prev_method| {
                    prev_method.explicit_dest() == Some(dest)
                        && ((same_state && prev_method.src_size() == method.src_size())
                            || (new_opaque && prev_superimposable))
                });
                if let Some(idx) = covered {
                    tracing::trace!(pool = ?self.pool_type, ?dest, "pruned occluded draw");
                    prev.methods.remove(idx);
                }
            }

            if same_state {
                prev.mode = DrawMode::Triangles;
                prev.methods.push(method);
                prev.geometry = None;
                return;
            }
        }

        self.objects.push(DrawObject::Primitives(PrimitiveBatch::new(
            state, method, mode,
        )));
    }

    /// Appends to any object with a matching state; order among repeated
    /// primitives of one state is not preserved relative to other objects.
    pub(crate) fn add_repeated(&mut self, state: RenderState, method: DrawMethod, mode: DrawMode) {
        if let Some(framed) = self.framed_mut() {
            framed.update_hash(&state, &method);
        }

        let found = self.objects.iter_mut().find_map(|obj| match obj {
            DrawObject::Primitives(batch) if !batch.holds_raw_coords() && batch.state == state => {
                Some(batch)
            }
            _ => None,
        });

        match found {
            Some(batch) => {
                batch.mode = DrawMode::Triangles;
                batch.methods.push(method);
                batch.geometry = None;
            }
            None => self.objects.push(DrawObject::Primitives(PrimitiveBatch::new(
                state, method, mode,
            ))),
        }
    }

    /// Queues a standalone object that never merges, e.g. raw coordinate
    /// buffers.
    pub(crate) fn add_batch(&mut self, batch: PrimitiveBatch) {
        if let Some(framed) = self.framed_mut() {
            for method in &batch.methods {
                framed.update_hash(&batch.state, method);
            }
        }
        self.objects.push(DrawObject::Primitives(batch));
    }

    pub(crate) fn add_action(&mut self, action: DrawAction) {
        if let Some(framed) = self.framed_mut() {
            framed.fold_action();
        }
        self.objects.push(DrawObject::Action(action));
    }
}

/// Framed pools render into an offscreen target that is only refreshed when
/// the content hash of the frame differs from the last rendered one.
pub struct FramedState {
    target: RenderTarget,
    dest: Rect,
    src: Rect,
    current: Fnv1a64,
    committed: Option<u64>,
    force_redraw: bool,
    populated: bool,
    pub(crate) before_draw: Option<CompositeHook>,
    pub(crate) after_draw: Option<CompositeHook>,
}

const ACTION_MARKER: u8 = 0xA5;
const CLEAR_COLOR_MARKER: u8 = 0xC0;

impl FramedState {
    pub(crate) fn new(target: RenderTarget) -> Self {
        Self {
            target,
            dest: Rect::default(),
            src: Rect::default(),
            current: Fnv1a64::default(),
            committed: None,
            force_redraw: true,
            populated: false,
            before_draw: None,
            after_draw: None,
        }
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn dest(&self) -> Rect {
        self.dest
    }

    pub fn src(&self) -> Rect {
        self.src
    }

    pub fn set_rects(&mut self, dest: Rect, src: Rect) {
        self.dest = dest;
        self.src = src;
    }

    /// Resizing discards the cached content, so the next frame redraws.
    pub fn resize(&mut self, size: Size) {
        if self.target.resize(size) {
            self.force_redraw = true;
        }
    }

    pub fn set_smooth(&mut self, smooth: bool) {
        if self.target.set_smooth(smooth) {
            self.force_redraw = true;
        }
    }

    pub fn set_before_draw(&mut self, hook: CompositeHook) {
        self.before_draw = Some(hook);
    }

    pub fn set_after_draw(&mut self, hook: CompositeHook) {
        self.after_draw = Some(hook);
    }

    pub(crate) fn set_clear_color(&mut self, color: Color) {
        self.target.set_clear_color(color);
        self.current.write_u8(CLEAR_COLOR_MARKER);
        self.current
            .write_bytes(&[color.r, color.g, color.b, color.a]);
    }

    pub fn current_hash(&self) -> u64 {
        self.current.finish()
    }

    pub fn committed_hash(&self) -> Option<u64> {
        self.committed
    }

    /// Folds one primitive into the running hash.
    pub fn update_hash(&mut self, state: &RenderState, method: &DrawMethod) {
        state.hash_into(&mut self.current);
        method.hash_into(&mut self.current);
    }

    fn fold_action(&mut self) {
        self.current.write_u8(ACTION_MARKER);
    }

    pub fn has_modification(&self) -> bool {
        self.force_redraw || self.committed != Some(self.current.finish())
    }

    /// Starts a new frame's hash.
    pub fn reset_current_status(&mut self) {
        self.current = Fnv1a64::default();
    }

    /// Called at the start of every population phase. Only the first phase of
    /// a frame resets the hash; later ones keep folding into it.
    pub(crate) fn begin_population(&mut self) {
        if !self.populated {
            self.reset_current_status();
            self.populated = true;
        }
    }

    /// Commits the current hash as the content of the target.
    pub fn update_status(&mut self) {
        self.committed = Some(self.current.finish());
        self.force_redraw = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pool/pool.rs"]
mod tests;
