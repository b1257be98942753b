use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::foundation::core::Size;

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a texture owned by the sprite/texture provider.
///
/// Pools never touch pixel data; they only need the properties that drive
/// batching and overdraw pruning.
#[derive(Debug)]
pub struct Texture {
    id: u64,
    size: Size,
    opaque: bool,
    can_superimpose: bool,
}

pub type TexturePtr = Arc<Texture>;

impl Texture {
    pub fn new(size: Size) -> Self {
        Self {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            size,
            opaque: false,
            can_superimpose: false,
        }
    }

    /// Marks every texel as fully opaque.
    pub fn opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    /// Allows a later opaque draw at the same destination to hide this texture.
    pub fn superimposable(mut self, can_superimpose: bool) -> Self {
        self.can_superimpose = can_superimpose;
        self
    }

    pub fn into_ptr(self) -> TexturePtr {
        Arc::new(self)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn can_superimpose(&self) -> bool {
        self.can_superimpose
    }
}

/// Named texture lookup served by the sprite manager.
pub trait TextureProvider {
    fn texture(&self, name: &str) -> Option<TexturePtr>;
}

impl TextureProvider for std::collections::HashMap<String, TexturePtr> {
    fn texture(&self, name: &str) -> Option<TexturePtr> {
        self.get(name).cloned()
    }
}
