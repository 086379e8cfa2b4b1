use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::color::Color;

/// Extracted colors keyed by item id. The first color stored for an id is
/// kept for the lifetime of the cache.
#[derive(Debug, Clone, Default)]
pub struct ColorCache {
    colors: HashMap<u32, Color>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `color` for `id` unless one is already present. Returns whether
    /// the color was stored.
    pub fn insert(&mut self, id: u32, color: Color) -> bool {
        match self.colors.entry(id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(color);
                true
            }
        }
    }

    pub fn get(&self, id: u32) -> Option<Color> {
        self.colors.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The cached color for `id`, or the catalog fallback while none is cached.
    pub fn resolve(&self, catalog: &Catalog, id: u32) -> Color {
        self.get(id).unwrap_or_else(|| catalog.fallback_color(id))
    }
}
