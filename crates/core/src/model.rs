//! Upstream documents and the canonical snapshots built from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The two upstream resources the daemon watches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// Shop inventory (`/stock`).
    Inventory,
    /// Active weather conditions (`/weather`).
    Weather,
}

impl Resource {
    /// Path segment of the resource on the feed API.
    pub fn path(self) -> &'static str {
        match self {
            Self::Inventory => "stock",
            Self::Weather => "weather",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inventory => f.write_str("inventory"),
            Self::Weather => f.write_str("weather"),
        }
    }
}

/// Inventory category.
///
/// Declaration order is the presentation and iteration order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Seeds shop.
    Seeds,
    /// Egg shop.
    Eggs,
    /// Gear shop.
    Gear,
}

impl Category {
    /// All categories, in presentation order.
    pub const ALL: [Category; 3] = [Self::Seeds, Self::Eggs, Self::Gear];

    /// Field heading used in the stock embed.
    pub fn heading(self) -> &'static str {
        match self {
            Self::Seeds => "🌱 Seeds",
            Self::Eggs => "🥚 Eggs",
            Self::Gear => "🛠️ Gear",
        }
    }
}

/// One entry in a shop category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockItem {
    /// Display name, as served upstream.
    pub name: String,
    /// Units in stock.
    pub quantity: u64,
}

impl StockItem {
    /// Convenience constructor.
    pub fn new(name: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Last fully observed shop inventory.
///
/// Categories missing upstream are absent from the map; an empty category is
/// present with no items. Item order within a category is significant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventorySnapshot {
    /// Items per category present upstream.
    pub categories: BTreeMap<Category, Vec<StockItem>>,
}

impl InventorySnapshot {
    /// Builder-style helper used mostly by tests and fixtures.
    pub fn with_category(mut self, category: Category, items: Vec<StockItem>) -> Self {
        self.categories.insert(category, items);
        self
    }

    /// Items of one category, if the category was present upstream.
    pub fn items(&self, category: Category) -> Option<&[StockItem]> {
        self.categories.get(&category).map(Vec::as_slice)
    }
}

/// Raw inventory document as served by the feed.
///
/// Only the three known shop arrays are read; other fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryDocument {
    /// Seed shop items.
    #[serde(rename = "seedsStock", default)]
    pub seeds_stock: Option<Vec<RawStockItem>>,
    /// Egg shop items.
    #[serde(rename = "eggStock", default)]
    pub egg_stock: Option<Vec<RawStockItem>>,
    /// Gear shop items.
    #[serde(rename = "gearStock", default)]
    pub gear_stock: Option<Vec<RawStockItem>>,
}

/// Upstream item shape: `{ "name": ..., "value": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawStockItem {
    /// Item name.
    pub name: String,
    /// Quantity in stock.
    pub value: u64,
}

impl From<InventoryDocument> for InventorySnapshot {
    fn from(doc: InventoryDocument) -> Self {
        let mut categories = BTreeMap::new();
        let pairs = [
            (Category::Seeds, doc.seeds_stock),
            (Category::Eggs, doc.egg_stock),
            (Category::Gear, doc.gear_stock),
        ];
        for (category, raw) in pairs {
            if let Some(raw) = raw {
                let items = raw
                    .into_iter()
                    .map(|i| StockItem::new(i.name, i.value))
                    .collect();
                categories.insert(category, items);
            }
        }
        Self { categories }
    }
}

/// Canonical list of active weather conditions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeatherSnapshot(pub Vec<String>);

impl WeatherSnapshot {
    /// Active condition names, in canonical order.
    pub fn conditions(&self) -> &[String] {
        &self.0
    }

    /// True when no condition is active.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw weather document as served by the feed.
///
/// The `weather` field varies in shape between deployments, so it is kept as
/// a raw JSON value and classified by [`crate::weather::WeatherShape`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherDocument {
    /// Active conditions, in any accepted shape.
    #[serde(default)]
    pub weather: serde_json::Value,
}
