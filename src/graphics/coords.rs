use crate::foundation::{
    core::{Point, Rect},
    hash::Fnv1a64,
};

/// Vertex and texel coordinates for one batch of primitives.
///
/// Positions and texture coordinates are stored as flat `[x, y]` pairs in
/// pixel/texel units. Callers filter degenerate input before appending.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    vertices: Vec<[f32; 2]>,
    tex_coords: Vec<[f32; 2]>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two triangles covering `dest`.
    pub fn add_rect(&mut self, dest: Rect) {
        let [l, t, r, b] = edges(dest);
        self.push_positions(&[[l, t], [r, t], [l, b], [l, b], [r, t], [r, b]]);
    }

    /// Two triangles covering `dest`, sampling `src`.
    pub fn add_textured_rect(&mut self, dest: Rect, src: Rect) {
        let [l, t, r, b] = edges(dest);
        let [sl, st, sr, sb] = edges(src);
        self.push_textured(
            &[[l, t], [r, t], [l, b], [l, b], [r, t], [r, b]],
            &[[sl, st], [sr, st], [sl, sb], [sl, sb], [sr, st], [sr, sb]],
        );
    }

    /// Four-vertex strip covering `dest`. Only valid as the sole content of a
    /// strip-topology buffer.
    pub fn add_quad(&mut self, dest: Rect, src: Rect) {
        let [l, t, r, b] = edges(dest);
        let [sl, st, sr, sb] = edges(src);
        self.push_textured(
            &[[l, t], [r, t], [l, b], [r, b]],
            &[[sl, st], [sr, st], [sl, sb], [sr, sb]],
        );
    }

    pub fn add_upside_down_rect(&mut self, dest: Rect, src: Rect) {
        let [l, t, r, b] = edges(dest);
        let [sl, st, sr, sb] = edges(src);
        self.push_textured(
            &[[l, t], [r, t], [l, b], [l, b], [r, t], [r, b]],
            &[[sl, sb], [sr, sb], [sl, st], [sl, st], [sr, sb], [sr, st]],
        );
    }

    pub fn add_upside_down_quad(&mut self, dest: Rect, src: Rect) {
        let [l, t, r, b] = edges(dest);
        let [sl, st, sr, sb] = edges(src);
        self.push_textured(
            &[[l, t], [r, t], [l, b], [r, b]],
            &[[sl, sb], [sr, sb], [sl, st], [sr, st]],
        );
    }

    pub fn add_triangle(&mut self, a: Point, b: Point, c: Point) {
        self.push_positions(&[point(a), point(b), point(c)]);
    }

    /// Outline of `dest` drawn `inner_line_width` pixels inward.
    pub fn add_bounding_rect(&mut self, dest: Rect, inner_line_width: u16) {
        let w = i32::from(inner_line_width);
        let sides = [
            Rect::new(dest.x, dest.y, dest.width, w.min(dest.height)),
            Rect::new(dest.x, dest.bottom() - w, dest.width, w.min(dest.height)),
            Rect::new(dest.x, dest.y + w, w.min(dest.width), dest.height - 2 * w),
            Rect::new(dest.right() - w, dest.y + w, w.min(dest.width), dest.height - 2 * w),
        ];
        for side in sides.into_iter().filter(|r| !r.is_empty()) {
            self.add_rect(side);
        }
    }

    /// Content fingerprint over positions then texel coordinates.
    pub fn vertex_hash(&self) -> u64 {
        let mut h = Fnv1a64::default();
        h.write_u64(self.vertices.len() as u64);
        for [x, y] in &self.vertices {
            h.write_f32(*x);
            h.write_f32(*y);
        }
        h.write_u64(self.tex_coords.len() as u64);
        for [x, y] in &self.tex_coords {
            h.write_f32(*x);
            h.write_f32(*y);
        }
        h.finish()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.tex_coords.clear();
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertices(&self) -> &[[f32; 2]] {
        &self.vertices
    }

    pub fn tex_coords(&self) -> &[[f32; 2]] {
        &self.tex_coords
    }

    fn push_positions(&mut self, positions: &[[f32; 2]]) {
        self.vertices.extend_from_slice(positions);
    }

    fn push_textured(&mut self, positions: &[[f32; 2]], texels: &[[f32; 2]]) {
        debug_assert_eq!(positions.len(), texels.len());
        self.vertices.extend_from_slice(positions);
        self.tex_coords.extend_from_slice(texels);
    }
}

fn edges(r: Rect) -> [f32; 4] {
    [
        r.left() as f32,
        r.top() as f32,
        r.right() as f32,
        r.bottom() as f32,
    ]
}

fn point(p: Point) -> [f32; 2] {
    [p.x as f32, p.y as f32]
}

#[cfg(test)]
#[path = "../../tests/unit/graphics/coords.rs"]
mod tests;
