use std::{fmt, sync::Arc};

use crate::{
    graphics::{
        coords::GeometryBuffer,
        painter::Painter,
        state::{DrawMode, RenderState},
    },
    pool::method::DrawMethod,
};

/// Custom draw logic embedded in a pool, run in place of geometry replay.
pub type DrawAction = Box<dyn FnMut(&mut dyn Painter) + Send>;

/// A run of primitives sharing one render state.
#[derive(Clone, Debug)]
pub struct PrimitiveBatch {
    pub(crate) state: RenderState,
    pub(crate) methods: Vec<DrawMethod>,
    pub(crate) mode: DrawMode,
    /// Either a caller-supplied raw buffer or geometry built on a worker.
    pub(crate) geometry: Option<Arc<GeometryBuffer>>,
}

impl PrimitiveBatch {
    pub(crate) fn new(state: RenderState, method: DrawMethod, mode: DrawMode) -> Self {
        Self {
            state,
            methods: vec![method],
            mode,
            geometry: None,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn methods(&self) -> &[DrawMethod] {
        &self.methods
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn cached_geometry(&self) -> Option<&GeometryBuffer> {
        self.geometry.as_deref()
    }

    /// Raw coordinate batches own caller geometry and never take more methods.
    pub(crate) fn holds_raw_coords(&self) -> bool {
        self.methods.iter().any(|m| {
            matches!(
                m,
                DrawMethod::FillCoords { .. } | DrawMethod::TextureCoords { .. }
            )
        })
    }

    fn build_geometry(&self, coords: &mut GeometryBuffer) {
        for method in &self.methods {
            method.append_geometry(coords, self.mode);
        }
    }
}

pub enum DrawObject {
    Primitives(PrimitiveBatch),
    Action(DrawAction),
}

/// What replaying one object did on the painter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Replayed {
    DrawCall,
    Action,
    Nothing,
}

impl DrawObject {
    pub fn as_primitives(&self) -> Option<&PrimitiveBatch> {
        match self {
            DrawObject::Primitives(batch) => Some(batch),
            DrawObject::Action(_) => None,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, DrawObject::Action(_))
    }

    /// Builds the vertex data once so the render thread only submits it.
    pub(crate) fn cache_geometry(&mut self) {
        let DrawObject::Primitives(batch) = self else {
            return;
        };
        if batch.geometry.is_some() || batch.methods.is_empty() {
            return;
        }
        let mut coords = GeometryBuffer::new();
        batch.build_geometry(&mut coords);
        batch.geometry = Some(Arc::new(coords));
    }

    /// Submits this object. `scratch` backs objects that were never cached and
    /// is left empty on return.
    pub(crate) fn replay(
        &mut self,
        painter: &mut dyn Painter,
        scratch: &mut GeometryBuffer,
    ) -> Replayed {
        let batch = match self {
            DrawObject::Action(action) => {
                action(painter);
                return Replayed::Action;
            }
            DrawObject::Primitives(batch) => batch,
        };

        if batch.methods.is_empty() {
            return Replayed::Nothing;
        }

        painter.execute_state(&batch.state);
        painter.set_texture(batch.state.texture.as_deref());

        if let Some(geometry) = &batch.geometry {
            painter.draw_coords(geometry, batch.mode);
            return Replayed::DrawCall;
        }

        batch.build_geometry(scratch);
        painter.draw_coords(scratch, batch.mode);
        scratch.clear();
        Replayed::DrawCall
    }
}

impl fmt::Debug for DrawObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawObject::Primitives(batch) => f.debug_tuple("Primitives").field(batch).finish(),
            DrawObject::Action(_) => f.write_str("Action(..)"),
        }
    }
}
