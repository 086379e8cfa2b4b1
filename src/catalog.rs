//! The static song list shown in the carousel.
//!
//! A catalog is built once at startup, either from the built-in setlist or
//! from a JSON file, and is never mutated afterwards. Besides the items it
//! carries two per-item color tables: the fallback shown while extraction is
//! pending, and pinned colors that bypass extraction altogether.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::color::Color;

/// Golden tint pinned to the first song of the built-in setlist.
pub const GOLDEN: Color = Color::new(0xe7, 0xe0, 0xac);

/// Item id that resolves to [`GOLDEN`] unless a catalog pins it otherwise.
pub const GOLDEN_ID: u32 = 1;

/// Rarity tier printed on each song card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
        }
    }
}

/// One song in the carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub title: String,
    pub price: u32,
    pub rarity: Rarity,
    /// Locator of the cover art, resolved by an `ImageSource`.
    pub image: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog has no items")]
    Empty,
    #[error("duplicate item id {0}")]
    DuplicateId(u32),
    #[error("item {0} has a zero price")]
    ZeroPrice(u32),
}

/// Ordered, immutable list of items plus their color tables.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<Item>,
    fallbacks: HashMap<u32, Color>,
    pinned: HashMap<u32, Color>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
struct ItemEntry {
    id: u32,
    title: String,
    price: u32,
    rarity: Rarity,
    image: String,
    #[serde(default)]
    fallback: Option<String>,
    #[serde(default)]
    pinned_color: Option<String>,
}

impl Catalog {
    /// Build a catalog, rejecting empty lists, duplicate ids and zero prices.
    pub fn new(
        items: Vec<Item>,
        fallbacks: HashMap<u32, Color>,
        pinned: HashMap<u32, Color>,
    ) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CatalogError::DuplicateId(item.id));
            }
            if item.price == 0 {
                return Err(CatalogError::ZeroPrice(item.id));
            }
        }
        Ok(Self {
            items,
            fallbacks,
            pinned,
        })
    }

    /// The four-song setlist shipped with the widget.
    pub fn builtin() -> Self {
        let song = |id, title: &str, price, rarity, image: &str| Item {
            id,
            title: title.to_string(),
            price,
            rarity,
            image: image.to_string(),
        };
        let items = vec![
            song(1, "Love Story", 3, Rarity::Common, "/lovestory.jpg"),
            song(
                2,
                "All Too Well (10 Minute Version)",
                5,
                Rarity::Epic,
                "/All Too Well (10 Minute Version).jpeg",
            ),
            song(
                3,
                "The Last Great American Dynasty",
                10,
                Rarity::Legendary,
                "/The Last Great American Dynasty.jpeg",
            ),
            song(4, "Bigger Than The Whole Sky", 20, Rarity::Rare, "/biggerthan.jpg"),
        ];
        let fallbacks = HashMap::from([
            (1, GOLDEN),
            (2, Color::new(0xfc, 0xa5, 0xa5)),
            (3, Color::new(0xc4, 0xb5, 0xfd)),
            (4, Color::new(0x93, 0xc5, 0xfd)),
        ]);
        let pinned = HashMap::from([(GOLDEN_ID, GOLDEN)]);

        Self {
            items,
            fallbacks,
            pinned,
        }
    }

    /// Parse a catalog from its JSON form. Item [`GOLDEN_ID`] is pinned to
    /// [`GOLDEN`] unless the entry names its own `pinned_color`:
    /// `{"items": [{"id": 1, "title": "...", "price": 3, "rarity": "COMMON",
    /// "image": "/cover.jpg", "fallback": "#e7e0ac", "pinned_color": "#e7e0ac"}]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).context("malformed catalog JSON")?;

        let mut items = Vec::with_capacity(file.items.len());
        let mut fallbacks = HashMap::new();
        let mut pinned = HashMap::new();
        for entry in file.items {
            if let Some(hex) = &entry.fallback {
                let color = Color::parse(hex)
                    .with_context(|| format!("invalid fallback color for item {}", entry.id))?;
                fallbacks.insert(entry.id, color);
            }
            if let Some(hex) = &entry.pinned_color {
                let color = Color::parse(hex)
                    .with_context(|| format!("invalid pinned color for item {}", entry.id))?;
                pinned.insert(entry.id, color);
            } else if entry.id == GOLDEN_ID {
                pinned.insert(entry.id, GOLDEN);
            }
            items.push(Item {
                id: entry.id,
                title: entry.title,
                price: entry.price,
                rarity: entry.rarity,
                image: entry.image,
            });
        }

        Ok(Self::new(items, fallbacks, pinned)?)
    }

    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("invalid catalog: {}", path.display()))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Color shown for `id` while its extraction is pending.
    pub fn fallback_color(&self, id: u32) -> Color {
        self.fallbacks.get(&id).copied().unwrap_or(Color::WHITE)
    }

    /// Content-level override that skips extraction for `id`.
    pub fn pinned_color(&self, id: u32) -> Option<Color> {
        self.pinned.get(&id).copied()
    }
}
