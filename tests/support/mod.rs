#![allow(dead_code)]

use std::collections::HashMap;

use super::{
    Color, DrawMode, GeometryBuffer, Painter, Rect, RenderState, RenderTarget, Size, TargetId,
    Texture, TexturePtr,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

pub fn texture(w: i32, h: i32) -> TexturePtr {
    Texture::new(Size::new(w, h)).into_ptr()
}

pub fn opaque_texture(w: i32, h: i32) -> TexturePtr {
    Texture::new(Size::new(w, h)).opaque(true).into_ptr()
}

pub fn superimposable_texture(w: i32, h: i32) -> TexturePtr {
    Texture::new(Size::new(w, h)).superimposable(true).into_ptr()
}

pub fn light_textures() -> HashMap<String, TexturePtr> {
    HashMap::from([
        ("light".to_string(), texture(64, 64)),
        ("shade".to_string(), texture(32, 32)),
    ])
}

#[derive(Clone, Debug, PartialEq)]
pub enum PainterCall {
    ExecuteState { texture: u64, color: Color },
    SetTexture(Option<u64>),
    DrawCoords {
        vertices: usize,
        mode: DrawMode,
        hash: u64,
    },
    SaveAndReset,
    Restore,
    SyncTarget(TargetId),
    BindTarget { target: TargetId, clear: Color },
    ReleaseTarget(TargetId),
    DrawTarget {
        target: TargetId,
        dest: Rect,
        src: Rect,
    },
    Marker(&'static str),
}

/// Painter that records every call instead of rasterizing.
#[derive(Default)]
pub struct RecordingPainter {
    pub calls: Vec<PainterCall>,
    pub states: Vec<RenderState>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PainterCall::DrawCoords { .. }))
            .count()
    }

    pub fn binds(&self, target: TargetId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PainterCall::BindTarget { target: t, .. } if *t == target))
            .count()
    }

    pub fn composites(&self, target: TargetId) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PainterCall::DrawTarget { target: t, .. } if *t == target))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.states.clear();
    }
}

impl Painter for RecordingPainter {
    fn execute_state(&mut self, state: &RenderState) {
        self.calls.push(PainterCall::ExecuteState {
            texture: state.texture_id(),
            color: state.paint.color,
        });
        self.states.push(state.clone());
    }

    fn set_texture(&mut self, texture: Option<&Texture>) {
        self.calls.push(PainterCall::SetTexture(texture.map(Texture::id)));
    }

    fn draw_coords(&mut self, coords: &GeometryBuffer, mode: DrawMode) {
        self.calls.push(PainterCall::DrawCoords {
            vertices: coords.vertex_count(),
            mode,
            hash: coords.vertex_hash(),
        });
    }

    fn save_and_reset_state(&mut self) {
        self.calls.push(PainterCall::SaveAndReset);
    }

    fn restore_saved_state(&mut self) {
        self.calls.push(PainterCall::Restore);
    }

    fn sync_target(&mut self, target: &RenderTarget) {
        self.calls.push(PainterCall::SyncTarget(target.id()));
    }

    fn bind_target(&mut self, target: &RenderTarget) {
        self.calls.push(PainterCall::BindTarget {
            target: target.id(),
            clear: target.clear_color(),
        });
    }

    fn release_target(&mut self, target: &RenderTarget) {
        self.calls.push(PainterCall::ReleaseTarget(target.id()));
    }

    fn draw_target(&mut self, target: &RenderTarget, dest: Rect, src: Rect) {
        self.calls.push(PainterCall::DrawTarget {
            target: target.id(),
            dest,
            src,
        });
    }
}
