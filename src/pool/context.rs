use std::sync::Arc;

use crate::{
    foundation::core::{Color, Point, Rect},
    graphics::{
        coords::GeometryBuffer,
        painter::Painter,
        state::{BlendEquation, CompositionMode, DrawMode, PaintState, RenderState, ShaderId},
        texture::TexturePtr,
    },
    pool::{
        method::DrawMethod,
        object::PrimitiveBatch,
        pool::{Pool, PoolType},
    },
};

/// The "current pool" for one population phase.
///
/// A context borrows exactly one pool from the moment population starts until
/// it ends; every add-primitive call goes through it. Degenerate input is
/// dropped silently and leaves the pool untouched.
pub struct PoolContext<'a> {
    pool: &'a mut Pool,
    state: PaintState,
    multi_thread: bool,
    break_batch: bool,
    dropped: u64,
}

impl<'a> PoolContext<'a> {
    /// Starts population of `pool`. A framed pool begins a fresh content hash
    /// on its first population of the frame.
    pub(crate) fn begin(pool: &'a mut Pool, multi_thread: bool) -> Self {
        if let Some(framed) = pool.framed_mut() {
            framed.begin_population();
        }
        Self {
            pool,
            state: PaintState::default(),
            multi_thread,
            break_batch: false,
            dropped: 0,
        }
    }

    /// Ends population. On a worker thread every object gets its geometry
    /// built and cached so the render thread only submits it.
    pub(crate) fn finish(self) -> u64 {
        if self.multi_thread && on_population_thread() {
            for obj in self.pool.objects_mut() {
                obj.cache_geometry();
            }
        }
        self.dropped
    }

    pub fn pool_type(&self) -> PoolType {
        self.pool.pool_type()
    }

    pub fn is_framed(&self) -> bool {
        self.pool.is_framed()
    }

    pub fn object_count(&self) -> usize {
        self.pool.objects().len()
    }

    /// Calls made outside a population thread while multithreading is
    /// enabled are ignored.
    pub fn accepts_draws(&self) -> bool {
        !self.multi_thread || on_population_thread()
    }

    pub fn paint_state(&self) -> &PaintState {
        &self.state
    }

    pub fn opacity(&self) -> f32 {
        self.state.opacity
    }

    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn reset_opacity(&mut self) {
        self.state.opacity = 1.0;
    }

    pub fn set_composition_mode(&mut self, mode: CompositionMode) {
        self.state.composition_mode = mode;
    }

    pub fn set_blend_equation(&mut self, equation: BlendEquation) {
        self.state.blend_equation = equation;
    }

    pub fn set_clip_rect(&mut self, clip: Option<Rect>) {
        self.state.clip_rect = clip;
    }

    pub fn set_shader(&mut self, shader: Option<ShaderId>) {
        self.state.shader = shader;
    }

    pub fn reset_state(&mut self) {
        self.state = PaintState::default();
    }

    /// Closes the current batch: the next primitive starts a new object.
    pub fn flush(&mut self) {
        self.break_batch = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.pool.set_enabled(enabled);
    }

    /// Sets where the target is composited and the color it is cleared to.
    /// Ignored for plain pools.
    pub fn use_frame(&mut self, dest: Rect, src: Rect, clear_color: Color) {
        match self.pool.framed_mut() {
            Some(framed) => {
                framed.set_rects(dest, src);
                framed.set_clear_color(clear_color);
            }
            None => tracing::debug!(pool = ?self.pool.pool_type(), "use_frame on a plain pool"),
        }
    }

    pub fn add_textured_rect(&mut self, dest: Rect, texture: &TexturePtr) {
        let src = Rect::from_point_size(Point::default(), texture.size());
        self.add_textured_rect_src(dest, texture, src);
    }

    pub fn add_textured_rect_src(&mut self, dest: Rect, texture: &TexturePtr, src: Rect) {
        self.push_textured_rect(dest, texture, src, None);
    }

    /// Textured rect tagged with its tile destination, allowing a later draw
    /// at the same destination to prune it.
    pub fn add_textured_rect_at(
        &mut self,
        dest: Rect,
        texture: &TexturePtr,
        src: Rect,
        origin: Point,
    ) {
        self.push_textured_rect(dest, texture, src, Some(origin));
    }

    fn push_textured_rect(
        &mut self,
        dest: Rect,
        texture: &TexturePtr,
        src: Rect,
        origin: Option<Point>,
    ) {
        if !self.accepts_draws() {
            return;
        }
        if dest.is_empty() || src.is_empty() || texture.is_empty() {
            return self.reject("textured rect");
        }
        let method = DrawMethod::TexturedRect { dest, src, origin };
        self.add(Some(texture), method, DrawMode::TriangleStrip);
    }

    pub fn add_upside_down_textured_rect(&mut self, dest: Rect, texture: &TexturePtr, src: Rect) {
        if !self.accepts_draws() {
            return;
        }
        if dest.is_empty() || src.is_empty() || texture.is_empty() {
            return self.reject("upside-down textured rect");
        }
        let method = DrawMethod::UpsideDownTexturedRect { dest, src };
        self.add(Some(texture), method, DrawMode::TriangleStrip);
    }

    pub fn add_repeated_textured_rect(&mut self, dest: Rect, texture: &TexturePtr) {
        let src = Rect::from_point_size(Point::default(), texture.size());
        self.add_repeated_textured_rect_src(dest, texture, src);
    }

    pub fn add_repeated_textured_rect_src(&mut self, dest: Rect, texture: &TexturePtr, src: Rect) {
        if !self.accepts_draws() {
            return;
        }
        if dest.is_empty() || src.is_empty() || texture.is_empty() {
            return self.reject("repeated textured rect");
        }
        let method = DrawMethod::RepeatedTexturedRect { dest, src };
        self.add_repeated(Some(texture), method);
    }

    pub fn add_repeated_filled_rect(&mut self, dest: Rect) {
        if !self.accepts_draws() {
            return;
        }
        if dest.is_empty() {
            return self.reject("repeated filled rect");
        }
        self.add_repeated(None, DrawMethod::RepeatedFilledRect { dest });
    }

    pub fn add_filled_rect(&mut self, dest: Rect) {
        if !self.accepts_draws() {
            return;
        }
        if dest.is_empty() {
            return self.reject("filled rect");
        }
        self.add(None, DrawMethod::FilledRect { dest }, DrawMode::Triangles);
    }

    pub fn add_filled_triangle(&mut self, a: Point, b: Point, c: Point) {
        if !self.accepts_draws() {
            return;
        }
        if a == b || a == c || b == c {
            return self.reject("filled triangle");
        }
        self.add(None, DrawMethod::FilledTriangle { a, b, c }, DrawMode::Triangles);
    }

    pub fn add_bounding_rect(&mut self, dest: Rect, inner_line_width: u16) {
        if !self.accepts_draws() {
            return;
        }
        if dest.is_empty() || inner_line_width == 0 {
            return self.reject("bounding rect");
        }
        let method = DrawMethod::BoundingRect {
            dest,
            inner_line_width,
        };
        self.add(None, method, DrawMode::Triangles);
    }

    /// Queues a caller-built untextured buffer as its own object. The buffer
    /// is shared, not copied, and released when the pool is cleared.
    pub fn add_fill_coords(&mut self, coords: Arc<GeometryBuffer>) {
        if !self.accepts_draws() {
            return;
        }
        if coords.is_empty() {
            return self.reject("fill coords");
        }
        let method = DrawMethod::FillCoords {
            hash: coords.vertex_hash(),
        };
        let mut batch = PrimitiveBatch::new(self.render_state(None), method, DrawMode::Triangles);
        batch.geometry = Some(coords);
        self.pool.add_batch(batch);
        self.break_batch = true;
    }

    pub fn add_texture_coords(
        &mut self,
        coords: Arc<GeometryBuffer>,
        texture: Option<&TexturePtr>,
        mode: DrawMode,
    ) {
        if !self.accepts_draws() {
            return;
        }
        if coords.is_empty() || texture.is_some_and(|t| t.is_empty()) {
            return self.reject("texture coords");
        }
        let method = DrawMethod::TextureCoords {
            hash: coords.vertex_hash(),
        };
        let mut batch = PrimitiveBatch::new(self.render_state(texture), method, mode);
        batch.geometry = Some(coords);
        self.pool.add_batch(batch);
        self.break_batch = true;
    }

    /// Queues custom logic run on the render thread in place of geometry.
    pub fn add_action<F>(&mut self, action: F)
    where
        F: FnMut(&mut dyn Painter) + Send + 'static,
    {
        if !self.accepts_draws() {
            return;
        }
        self.pool.add_action(Box::new(action));
        self.break_batch = true;
    }

    fn render_state(&self, texture: Option<&TexturePtr>) -> RenderState {
        RenderState::new(self.state, texture.cloned())
    }

    fn add(&mut self, texture: Option<&TexturePtr>, method: DrawMethod, mode: DrawMode) {
        let state = self.render_state(texture);
        let break_batch = std::mem::take(&mut self.break_batch);
        self.pool.add(state, method, mode, break_batch);
    }

    fn add_repeated(&mut self, texture: Option<&TexturePtr>, method: DrawMethod) {
        let state = self.render_state(texture);
        self.pool.add_repeated(state, method, DrawMode::Triangles);
    }

    fn reject(&mut self, what: &'static str) {
        self.dropped += 1;
        tracing::trace!(pool = ?self.pool.pool_type(), what, "dropped degenerate draw");
    }
}

fn on_population_thread() -> bool {
    rayon::current_thread_index().is_some()
}

#[cfg(test)]
#[path = "../../tests/unit/pool/context.rs"]
mod tests;
