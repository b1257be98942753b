pub(crate) mod coords;
pub(crate) mod painter;
pub(crate) mod state;
pub(crate) mod texture;
