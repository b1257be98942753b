use crate::{
    foundation::core::{Color, Rect, Size},
    graphics::{
        coords::GeometryBuffer,
        state::{CompositionMode, DrawMode, RenderState},
        texture::Texture,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// Offscreen render target owned by a framed pool.
///
/// The descriptor is plain data; the painter creates or resizes the backing
/// framebuffer when [`Painter::sync_target`] sees a new `generation`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTarget {
    id: TargetId,
    size: Size,
    smooth: bool,
    blend: bool,
    composition_mode: CompositionMode,
    clear_color: Color,
    generation: u64,
}

impl RenderTarget {
    pub(crate) fn new(id: TargetId) -> Self {
        Self {
            id,
            size: Size::default(),
            smooth: true,
            blend: true,
            composition_mode: CompositionMode::Normal,
            clear_color: Color::TRANSPARENT,
            generation: 0,
        }
    }

    /// Identity the painter keys its backing framebuffer on.
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Size in pixels. An empty size makes the target undrawable.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Whether the target is sampled with linear filtering when composited.
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// Whether compositing blends with the destination.
    pub fn blend_enabled(&self) -> bool {
        self.blend
    }

    /// Mode used when the target is composited onto the current output.
    pub fn composition_mode(&self) -> CompositionMode {
        self.composition_mode
    }

    /// Color the target is cleared to before every redraw.
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Bumped on every configuration change that invalidates the backing store.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False while the target has no area.
    pub fn is_drawable(&self) -> bool {
        !self.size.is_empty()
    }

    pub(crate) fn resize(&mut self, size: Size) -> bool {
        if self.size == size {
            return false;
        }
        self.size = size;
        self.generation += 1;
        true
    }

    pub(crate) fn set_smooth(&mut self, smooth: bool) -> bool {
        if self.smooth == smooth {
            return false;
        }
        self.smooth = smooth;
        self.generation += 1;
        true
    }

    pub(crate) fn disable_blend(&mut self) {
        self.blend = false;
    }

    pub(crate) fn set_composition_mode(&mut self, mode: CompositionMode) {
        self.composition_mode = mode;
    }

    pub(crate) fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }
}

/// Low-level rasterizer that executes replayed draw objects.
///
/// Only the owning render thread ever holds a painter.
pub trait Painter {
    fn execute_state(&mut self, state: &RenderState);

    fn set_texture(&mut self, texture: Option<&Texture>);

    fn draw_coords(&mut self, coords: &GeometryBuffer, mode: DrawMode);

    fn save_and_reset_state(&mut self);

    fn restore_saved_state(&mut self);

    /// Creates or reconfigures the backing store for `target`.
    fn sync_target(&mut self, target: &RenderTarget);

    /// Redirects output into `target`, cleared to its clear color.
    fn bind_target(&mut self, target: &RenderTarget);

    fn release_target(&mut self, target: &RenderTarget);

    /// Composites the cached content of `target` onto the current output.
    fn draw_target(&mut self, target: &RenderTarget, dest: Rect, src: Rect);
}
