//! Validated catalogue document.
//!
//! The raw document is a JSON object keyed by category name, plus reserved
//! keys for the descriptor listing, the works listing and an optional
//! all-products listing. It is validated once, when it crosses into the
//! process; lookups afterwards are typed.

use std::collections::BTreeMap;

use mebel_core::{
    ALL_PRODUCTS_KEY, Category, CategoryDescriptor, DESCRIPTORS_KEY, ProductRecord, WORKS_KEY,
    WorkItem, normalize_key,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::CatalogueError;

/// Problems found while validating a document. None of them are fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// Top-level keys that name no known category or reserved listing.
    pub unknown_keys: Vec<String>,
    /// Keys whose category was already filled by an earlier key.
    pub duplicate_keys: Vec<String>,
    /// Keys whose value failed to deserialize, with the reason.
    pub malformed: Vec<(String, String)>,
}

impl DocumentReport {
    /// Whether validation found nothing to flag.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unknown_keys.is_empty() && self.duplicate_keys.is_empty() && self.malformed.is_empty()
    }
}

/// A catalogue document after boundary validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueDocument {
    categories: BTreeMap<Category, Vec<ProductRecord>>,
    all_products: Option<Vec<ProductRecord>>,
    descriptors: Vec<CategoryDescriptor>,
    works: Vec<WorkItem>,
    report: DocumentReport,
}

impl CatalogueDocument {
    /// Parse and validate document text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Malformed`] if the text is not JSON or the
    /// top level is not an object. Problems inside individual listings are
    /// recorded in the [`DocumentReport`] instead.
    pub fn from_json(text: &str) -> Result<Self, CatalogueError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| CatalogueError::Malformed(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Validate an already-parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::Malformed`] if the top level is not an object.
    pub fn from_value(value: Value) -> Result<Self, CatalogueError> {
        let Value::Object(map) = value else {
            return Err(CatalogueError::Malformed(
                "top level must be an object keyed by category".to_string(),
            ));
        };
        Ok(Self::from_map(map))
    }

    fn from_map(map: Map<String, Value>) -> Self {
        let mut document = Self::default();

        for (raw_key, value) in map {
            let key = normalize_key(&raw_key);
            match key.as_str() {
                DESCRIPTORS_KEY => {
                    if let Some(items) = document.listing(&raw_key, value) {
                        document.descriptors = items;
                    }
                }
                WORKS_KEY => {
                    if let Some(items) = document.listing(&raw_key, value) {
                        document.works = items;
                    }
                }
                ALL_PRODUCTS_KEY => {
                    document.all_products = document.listing(&raw_key, value);
                }
                other => match Category::from_normalized(other) {
                    Some(category) if document.categories.contains_key(&category) => {
                        tracing::warn!(key = %raw_key, %category, "Duplicate catalogue key ignored");
                        document.report.duplicate_keys.push(raw_key);
                    }
                    Some(category) => {
                        if let Some(items) = document.listing(&raw_key, value) {
                            document.categories.insert(category, items);
                        }
                    }
                    None => {
                        tracing::warn!(key = %raw_key, "Unknown catalogue key ignored");
                        document.report.unknown_keys.push(raw_key);
                    }
                },
            }
        }

        document
    }

    fn listing<T: DeserializeOwned>(&mut self, raw_key: &str, value: Value) -> Option<Vec<T>> {
        match serde_json::from_value(value) {
            Ok(items) => Some(items),
            Err(e) => {
                tracing::warn!(key = %raw_key, error = %e, "Malformed catalogue listing skipped");
                self.report
                    .malformed
                    .push((raw_key.to_owned(), e.to_string()));
                None
            }
        }
    }

    /// Products of one category, if the document has that category.
    #[must_use]
    pub fn products(&self, category: Category) -> Option<&[ProductRecord]> {
        self.categories.get(&category).map(Vec::as_slice)
    }

    /// The all-products listing: the explicit `products` array when present,
    /// otherwise every category's products in category order.
    #[must_use]
    pub fn all_products(&self) -> Vec<ProductRecord> {
        self.all_products.clone().unwrap_or_else(|| {
            self.categories
                .values()
                .flat_map(|items| items.iter().cloned())
                .collect()
        })
    }

    /// Categories present in the document.
    pub fn categories(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        self.categories
            .iter()
            .map(|(category, items)| (*category, items.len()))
    }

    /// The category descriptor listing.
    #[must_use]
    pub fn descriptors(&self) -> &[CategoryDescriptor] {
        &self.descriptors
    }

    /// The works listing.
    #[must_use]
    pub fn works(&self) -> &[WorkItem] {
        &self.works
    }

    /// Validation findings.
    #[must_use]
    pub const fn report(&self) -> &DocumentReport {
        &self.report
    }
}
