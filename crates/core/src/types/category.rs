//! Category keys and the closed set of catalogue categories.
//!
//! Keys reach the store from URLs, navigation labels and the catalogue
//! document itself, in English slugs and Russian labels, with arbitrary
//! casing and separators. Everything goes through [`normalize_key`] first and
//! then resolves to one [`Category`] variant.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Reserved document key holding the category descriptor listing.
pub const DESCRIPTORS_KEY: &str = "catalogueproducts";

/// Reserved document key holding the works/portfolio listing.
pub const WORKS_KEY: &str = "works";

/// Reserved document key (and request sentinel) for the all-products listing.
pub const ALL_PRODUCTS_KEY: &str = "products";

/// Request sentinel for the category descriptor listing.
pub const ALL_KEY: &str = "all";

/// Normalize a category key for matching.
///
/// Trims, drops leading slashes, lower-cases and collapses every run of
/// whitespace, `_` and `-` into a single `-`.
///
/// ```
/// use mebel_core::normalize_key;
///
/// assert_eq!(normalize_key(" Living Room "), "living-room");
/// assert_eq!(normalize_key("living_room"), "living-room");
/// assert_eq!(normalize_key("/Kitchen"), "kitchen");
/// ```
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    let lowered = raw.trim().trim_start_matches('/').to_lowercase();
    let mut key = String::with_capacity(lowered.len());
    let mut pending_separator = false;

    for c in lowered.chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !key.is_empty() {
            key.push('-');
        }
        pending_separator = false;
        key.push(c);
    }

    key
}

/// The browsable furniture categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Kitchen,
    DrawingRoom,
    Nursery,
    Bedroom,
    Couch,
    Hallway,
    Cupboard,
    TablesAndChairs,
}

impl Category {
    /// All categories in navigation order.
    pub const ALL: [Self; 8] = [
        Self::Kitchen,
        Self::DrawingRoom,
        Self::Nursery,
        Self::Bedroom,
        Self::Couch,
        Self::Hallway,
        Self::Cupboard,
        Self::TablesAndChairs,
    ];

    /// Canonical URL slug.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Kitchen => "kitchen",
            Self::DrawingRoom => "drawing-room",
            Self::Nursery => "nursery",
            Self::Bedroom => "bedroom",
            Self::Couch => "couch",
            Self::Hallway => "hallway",
            Self::Cupboard => "cupboard",
            Self::TablesAndChairs => "tables-and-chairs",
        }
    }

    /// Display label used by the storefront navigation.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kitchen => "Кухни",
            Self::DrawingRoom => "Гостиные",
            Self::Nursery => "Детские",
            Self::Bedroom => "Спальни",
            Self::Couch => "Диваны",
            Self::Hallway => "Прихожие",
            Self::Cupboard => "Шкафы-купе",
            Self::TablesAndChairs => "Столы и стулья",
        }
    }

    /// Navigation path for the category page.
    #[must_use]
    pub fn path(self) -> String {
        format!("/catalogue/{}", self.slug())
    }

    /// Resolve an already-normalized key.
    #[must_use]
    pub fn from_normalized(key: &str) -> Option<Self> {
        let category = match key {
            "kitchen" | "kitchens" | "кухни" | "кухня" => Self::Kitchen,
            "drawing-room" | "drawingroom" | "living-room" | "livingroom" | "гостиные"
            | "гостинные" | "гостиная" => Self::DrawingRoom,
            "nursery" | "детские" | "детская" => Self::Nursery,
            "bedroom" | "bedrooms" | "спальни" | "спальня" => Self::Bedroom,
            "couch" | "couches" | "sofa" | "sofas" | "диваны" | "диван" => Self::Couch,
            "hallway" | "hallways" | "прихожие" | "прихожая" => Self::Hallway,
            "cupboard" | "cupboards" | "wardrobe" | "шкафы-купе" | "шкаф-купе" => {
                Self::Cupboard
            }
            "tables-and-chairs" | "tablesandchairs" | "столы-и-стулья" => Self::TablesAndChairs,
            _ => return None,
        };
        Some(category)
    }

    /// Normalize and resolve a raw key.
    #[must_use]
    pub fn from_key(raw: &str) -> Option<Self> {
        Self::from_normalized(&normalize_key(raw))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when a key names no known category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_key(s);
        Self::from_normalized(&key).ok_or(UnknownCategory(key))
    }
}

/// What a category load asks for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "kebab-case")]
pub enum CategoryRequest {
    /// The category descriptor listing (the "all" view).
    All,
    /// Every product in the catalogue.
    AllProducts,
    /// One category's products.
    Category(Category),
    /// A key that matches nothing; carries the normalized key.
    Unknown(String),
}

impl CategoryRequest {
    /// Parse a raw key from a URL or navigation label.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let key = normalize_key(raw);
        match key.as_str() {
            "" | ALL_KEY | "catalogue" | DESCRIPTORS_KEY => Self::All,
            ALL_PRODUCTS_KEY => Self::AllProducts,
            other => Category::from_normalized(other)
                .map_or_else(|| Self::Unknown(other.to_owned()), Self::Category),
        }
    }
}

impl fmt::Display for CategoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_KEY),
            Self::AllProducts => f.write_str(ALL_PRODUCTS_KEY),
            Self::Category(category) => write!(f, "{category}"),
            Self::Unknown(key) => f.write_str(key),
        }
    }
}
