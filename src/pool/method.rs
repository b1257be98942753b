use crate::{
    foundation::{
        core::{Point, Rect, Size},
        hash::Fnv1a64,
    },
    graphics::{coords::GeometryBuffer, state::DrawMode},
};

/// One primitive queued in a draw object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMethod {
    /// `origin` is the explicit tile destination used to prune occluded draws.
    TexturedRect {
        dest: Rect,
        src: Rect,
        origin: Option<Point>,
    },
    UpsideDownTexturedRect {
        dest: Rect,
        src: Rect,
    },
    RepeatedTexturedRect {
        dest: Rect,
        src: Rect,
    },
    FilledRect {
        dest: Rect,
    },
    RepeatedFilledRect {
        dest: Rect,
    },
    FilledTriangle {
        a: Point,
        b: Point,
        c: Point,
    },
    BoundingRect {
        dest: Rect,
        inner_line_width: u16,
    },
    /// Caller-built untextured geometry, identified by its vertex hash.
    FillCoords {
        hash: u64,
    },
    /// Caller-built textured geometry, identified by its vertex hash.
    TextureCoords {
        hash: u64,
    },
}

impl DrawMethod {
    pub fn explicit_dest(&self) -> Option<Point> {
        match self {
            DrawMethod::TexturedRect { origin, .. } => *origin,
            _ => None,
        }
    }

    pub fn src(&self) -> Option<Rect> {
        match self {
            DrawMethod::TexturedRect { src, .. }
            | DrawMethod::UpsideDownTexturedRect { src, .. }
            | DrawMethod::RepeatedTexturedRect { src, .. } => Some(*src),
            _ => None,
        }
    }

    pub fn src_size(&self) -> Option<Size> {
        self.src().map(Rect::size)
    }

    fn tag(&self) -> u8 {
        match self {
            DrawMethod::TexturedRect { .. } => 0,
            DrawMethod::UpsideDownTexturedRect { .. } => 1,
            DrawMethod::RepeatedTexturedRect { .. } => 2,
            DrawMethod::FilledRect { .. } => 3,
            DrawMethod::RepeatedFilledRect { .. } => 4,
            DrawMethod::FilledTriangle { .. } => 5,
            DrawMethod::BoundingRect { .. } => 6,
            DrawMethod::FillCoords { .. } => 7,
            DrawMethod::TextureCoords { .. } => 8,
        }
    }

    pub(crate) fn hash_into(&self, h: &mut Fnv1a64) {
        h.write_u8(self.tag());
        match *self {
            DrawMethod::TexturedRect { dest, src, origin } => {
                write_rect(h, dest);
                write_rect(h, src);
                match origin {
                    Some(p) => {
                        h.write_u8(1);
                        write_point(h, p);
                    }
                    None => h.write_u8(0),
                }
            }
            DrawMethod::UpsideDownTexturedRect { dest, src }
            | DrawMethod::RepeatedTexturedRect { dest, src } => {
                write_rect(h, dest);
                write_rect(h, src);
            }
            DrawMethod::FilledRect { dest } | DrawMethod::RepeatedFilledRect { dest } => {
                write_rect(h, dest);
            }
            DrawMethod::FilledTriangle { a, b, c } => {
                write_point(h, a);
                write_point(h, b);
                write_point(h, c);
            }
            DrawMethod::BoundingRect {
                dest,
                inner_line_width,
            } => {
                write_rect(h, dest);
                h.write_u16(inner_line_width);
            }
            DrawMethod::FillCoords { hash } | DrawMethod::TextureCoords { hash } => {
                h.write_u64(hash);
            }
        }
    }

    /// Appends this primitive's vertices. Raw coordinate methods carry their
    /// own buffer and contribute nothing here.
    pub(crate) fn append_geometry(&self, coords: &mut GeometryBuffer, mode: DrawMode) {
        match *self {
            DrawMethod::BoundingRect {
                dest,
                inner_line_width,
            } => coords.add_bounding_rect(dest, inner_line_width),
            DrawMethod::FilledRect { dest } | DrawMethod::RepeatedFilledRect { dest } => {
                coords.add_rect(dest)
            }
            DrawMethod::FilledTriangle { a, b, c } => coords.add_triangle(a, b, c),
            DrawMethod::TexturedRect { dest, src, .. }
            | DrawMethod::RepeatedTexturedRect { dest, src } => {
                if mode == DrawMode::TriangleStrip {
                    coords.add_quad(dest, src);
                } else {
                    coords.add_textured_rect(dest, src);
                }
            }
            DrawMethod::UpsideDownTexturedRect { dest, src } => {
                if mode == DrawMode::TriangleStrip {
                    coords.add_upside_down_quad(dest, src);
                } else {
                    coords.add_upside_down_rect(dest, src);
                }
            }
            DrawMethod::FillCoords { .. } | DrawMethod::TextureCoords { .. } => {}
        }
    }
}

fn write_rect(h: &mut Fnv1a64, r: Rect) {
    for v in [r.x, r.y, r.width, r.height] {
        h.write_i32(v);
    }
}

fn write_point(h: &mut Fnv1a64, p: Point) {
    h.write_i32(p.x);
    h.write_i32(p.y);
}
