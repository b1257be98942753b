use crate::{
    foundation::{
        core::{Color, Rect},
        hash::Fnv1a64,
    },
    graphics::texture::TexturePtr,
};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum CompositionMode {
    #[default]
    Normal,
    Multiply,
    Add,
    Replace,
    DestBlending,
    Light,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum BlendEquation {
    #[default]
    Add,
    Max,
    Min,
}

/// Primitive topology handed to the rasterizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    None,
    #[default]
    Triangles,
    TriangleStrip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ShaderId(pub u32);

/// Paint parameters that are active while a pool is being populated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaintState {
    pub color: Color,
    pub opacity: f32,
    pub composition_mode: CompositionMode,
    pub blend_equation: BlendEquation,
    pub clip_rect: Option<Rect>,
    pub shader: Option<ShaderId>,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            composition_mode: CompositionMode::Normal,
            blend_equation: BlendEquation::Add,
            clip_rect: None,
            shader: None,
        }
    }
}

/// Batching key: two primitives may share one draw call only when their
/// render states compare equal.
#[derive(Clone, Debug, Default)]
pub struct RenderState {
    pub texture: Option<TexturePtr>,
    pub paint: PaintState,
}

impl RenderState {
    pub fn new(paint: PaintState, texture: Option<TexturePtr>) -> Self {
        Self { texture, paint }
    }

    pub fn texture_id(&self) -> u64 {
        self.texture.as_ref().map_or(0, |t| t.id())
    }

    pub(crate) fn hash_into(&self, h: &mut Fnv1a64) {
        let p = &self.paint;
        h.write_u64(self.texture_id());
        h.write_bytes(&[p.color.r, p.color.g, p.color.b, p.color.a]);
        h.write_f32(p.opacity);
        h.write_u8(p.composition_mode as u8);
        h.write_u8(p.blend_equation as u8);
        match p.clip_rect {
            Some(r) => {
                h.write_u8(1);
                for v in [r.x, r.y, r.width, r.height] {
                    h.write_i32(v);
                }
            }
            None => h.write_u8(0),
        }
        match p.shader {
            Some(ShaderId(id)) => {
                h.write_u8(1);
                h.write_u32(id);
            }
            None => h.write_u8(0),
        }
    }
}

/// Textures compare by identity, never by content.
impl PartialEq for RenderState {
    fn eq(&self, other: &Self) -> bool {
        self.texture_id() == other.texture_id() && self.paint == other.paint
    }
}
