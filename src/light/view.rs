use crate::{
    foundation::{
        core::{Color, Point, Rect, Size},
        error::{DrawPoolError, DrawPoolResult},
    },
    graphics::{
        state::BlendEquation,
        texture::{TextureProvider, TexturePtr},
    },
    pool::{
        context::PoolContext,
        manager::DrawPoolManager,
        pool::{FramedState, PoolType},
    },
};

pub const LIGHT_TEXTURE: &str = "light";
pub const SHADE_TEXTURE: &str = "shade";

/// Ambient intensity below which the scene counts as dark.
pub const DARKNESS_THRESHOLD: u8 = 250;

const DEFAULT_TILE_SIZE: u8 = 32;
const SHADE_SIZE_FACTOR: f32 = 3.3;
const SHADE_OFFSET_FACTOR: f32 = 1.8;
const INTENSITY_PER_ALPHA: f32 = 6.0;

/// Light emitted by a creature, item or the world itself.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Light {
    pub intensity: u8,
    /// 8-bit palette color; `0` marks a shadow.
    pub color: u8,
}

impl Light {
    pub const fn new(intensity: u8, color: u8) -> Self {
        Self { intensity, color }
    }
}

/// A light queued for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub pos: Point,
    pub color: u8,
    pub intensity: u16,
    /// Pool opacity at the time the source was queued.
    pub opacity: f32,
}

/// Per-frame dynamic lighting composited over the map through the light pool.
pub struct LightView {
    light_texture: TexturePtr,
    shade_texture: TexturePtr,
    global_light: Light,
    global_light_color: Color,
    dark: bool,
    tile_size: u8,
    sources: Vec<LightSource>,
}

impl LightView {
    pub const POOL: PoolType = PoolType::Light;

    pub fn new(textures: &dyn TextureProvider) -> DrawPoolResult<Self> {
        let lookup = |name: &str| {
            textures
                .texture(name)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| DrawPoolError::resource(format!("missing '{name}' texture")))
        };
        let mut view = Self {
            light_texture: lookup(LIGHT_TEXTURE)?,
            shade_texture: lookup(SHADE_TEXTURE)?,
            global_light: Light::default(),
            global_light_color: Color::BLACK,
            dark: false,
            tile_size: DEFAULT_TILE_SIZE,
            sources: Vec::new(),
        };
        view.set_global_light(Light::new(u8::MAX, 215));
        Ok(view)
    }

    /// Sets the ambient light; darkness follows from its intensity.
    pub fn set_global_light(&mut self, light: Light) {
        self.global_light = light;
        self.global_light_color =
            Color::from_8bit(light.color, f32::from(light.intensity) / f32::from(u8::MAX));
        self.dark = light.intensity < DARKNESS_THRESHOLD;
    }

    pub fn global_light(&self) -> Light {
        self.global_light
    }

    pub fn global_light_color(&self) -> Color {
        self.global_light_color
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    pub fn tile_size(&self) -> u8 {
        self.tile_size
    }

    pub fn sources(&self) -> &[LightSource] {
        &self.sources
    }

    pub fn set_smooth(&self, manager: &mut DrawPoolManager, enabled: bool) -> DrawPoolResult<()> {
        light_pool(manager)?.set_smooth(enabled);
        Ok(())
    }

    /// Sizes the light target to `size` tiles of `tile_size` pixels.
    pub fn resize(
        &mut self,
        manager: &mut DrawPoolManager,
        size: Size,
        tile_size: u8,
    ) -> DrawPoolResult<()> {
        self.tile_size = tile_size;
        light_pool(manager)?.resize(size * i32::from(tile_size));
        Ok(())
    }

    /// Queues a light at `pos` while the scene is dark. A repeat of the
    /// previous source's position and color only raises its intensity.
    pub fn add_light_source(&mut self, ctx: &PoolContext<'_>, pos: Point, light: Light) {
        if !self.dark {
            return;
        }

        if let Some(prev) = self.sources.last_mut()
            && prev.pos == pos
            && prev.color == light.color
        {
            prev.intensity = prev.intensity.max(u16::from(light.intensity));
            return;
        }

        self.sources.push(LightSource {
            pos,
            color: light.color,
            intensity: u16::from(light.intensity),
            opacity: ctx.opacity(),
        });
    }

    /// Populates the light pool from the queued sources and clears them.
    /// The pool is disabled entirely unless the scene is dark. A context that
    /// does not accept draws leaves the pool and the queued sources untouched.
    pub fn draw(&mut self, ctx: &mut PoolContext<'_>, dest: Rect, src: Rect) {
        if !ctx.accepts_draws() {
            return;
        }
        ctx.set_enabled(self.dark);
        if !self.dark {
            self.sources.clear();
            return;
        }

        ctx.use_frame(dest, src, self.global_light_color);
        tracing::trace!(sources = self.sources.len(), "light pass");

        let tile = f32::from(self.tile_size);
        let shade_size = Size::square((tile * SHADE_SIZE_FACTOR) as i32);
        let shade_offset = (tile * SHADE_OFFSET_FACTOR) as i32;

        let mut pending_lights = false;
        for light in self.sources.drain(..) {
            if light.color != 0 {
                let alpha = light
                    .opacity
                    .min(f32::from(light.intensity) / INTENSITY_PER_ALPHA);
                let radius = i32::from(light.intensity) * i32::from(self.tile_size);
                ctx.set_blend_equation(BlendEquation::Max);
                ctx.set_color(Color::from_8bit(light.color, alpha));
                ctx.add_textured_rect(
                    Rect::from_point_size(light.pos - radius, Size::square(radius * 2)),
                    &self.light_texture,
                );
                pending_lights = true;
            } else {
                if pending_lights {
                    ctx.flush();
                    pending_lights = false;
                }
                ctx.set_blend_equation(BlendEquation::Add);
                ctx.set_color(self.global_light_color);
                ctx.set_opacity(light.opacity);
                ctx.add_textured_rect(
                    Rect::from_point_size(light.pos - shade_offset, shade_size),
                    &self.shade_texture,
                );
                ctx.reset_opacity();
            }
        }

        ctx.reset_state();
    }
}

fn light_pool(manager: &mut DrawPoolManager) -> DrawPoolResult<&mut FramedState> {
    manager
        .framed_mut(LightView::POOL)
        .ok_or_else(|| DrawPoolError::validation("light view requires a framed light pool"))
}

#[cfg(test)]
#[path = "../../tests/unit/light/view.rs"]
mod tests;
