//! Catalogue records: products, category descriptors and works.

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::id::{DescriptorId, ProductId, Uid, WorkId};
use super::price::Price;

/// Image shown when a record carries no `imgSrc`.
pub const DEFAULT_IMAGE: &str = "/default.jpg";

/// A product colour: a single name or an ordered list of names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colors {
    Single(String),
    Many(Vec<String>),
}

impl Colors {
    /// Iterate over the colour names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Self::Single(color) => core::slice::from_ref(color),
            Self::Many(colors) => colors.as_slice(),
        };
        slice.iter().map(String::as_str)
    }
}

impl Default for Colors {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// One purchasable item as described by the catalogue document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    /// Free-form label from the data source; not necessarily a [`Category`].
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub color: Colors,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
}

impl ProductRecord {
    /// Image reference, falling back to [`DEFAULT_IMAGE`].
    #[must_use]
    pub fn image_src(&self) -> &str {
        self.img_src.as_deref().unwrap_or(DEFAULT_IMAGE)
    }
}

/// A browsable grouping shown on the "all" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDescriptor {
    /// Slug used to build the navigation path.
    #[serde(alias = "slug")]
    pub id: DescriptorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
}

impl CategoryDescriptor {
    /// The category this descriptor points at, resolved from its slug or name.
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        Category::from_key(self.id.as_str()).or_else(|| Category::from_key(&self.name))
    }

    /// Navigation path; known categories use their canonical slug.
    #[must_use]
    pub fn path(&self) -> String {
        self.category().map_or_else(
            || format!("/catalogue/{}", super::category::normalize_key(self.id.as_str())),
            Category::path,
        )
    }

    /// Image reference, falling back to [`DEFAULT_IMAGE`].
    #[must_use]
    pub fn image_src(&self) -> &str {
        self.img_src.as_deref().unwrap_or(DEFAULT_IMAGE)
    }
}

/// An entry of the works/portfolio listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: WorkId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
}

/// An item tagged with an ephemeral [`Uid`] for one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listed<T> {
    pub uid: Uid,
    #[serde(flatten)]
    pub item: T,
}

impl<T> Listed<T> {
    /// Tag an item with a freshly generated uid.
    #[must_use]
    pub fn fresh(item: T) -> Self {
        Self {
            uid: Uid::fresh(),
            item,
        }
    }

    /// Tag every item of a listing with a fresh uid.
    #[must_use]
    pub fn fresh_all(items: impl IntoIterator<Item = T>) -> Vec<Self> {
        items.into_iter().map(Self::fresh).collect()
    }
}
