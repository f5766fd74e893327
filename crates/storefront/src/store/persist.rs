//! On-disk basket representation and the rehydration join.

use mebel_core::{Basket, BasketEntry, Listed, ProductId, ProductRecord};
use serde::{Deserialize, Serialize};

/// One persisted basket line.
///
/// Older baskets carry only `id` and `quantity`; current ones also carry the
/// product snapshot taken when the line was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntry {
    pub id: ProductId,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductRecord>,
}

impl From<&BasketEntry> for PersistedEntry {
    fn from(entry: &BasketEntry) -> Self {
        Self {
            id: entry.id().clone(),
            quantity: i64::from(entry.quantity),
            product: Some(entry.product.clone()),
        }
    }
}

/// Serialize a basket, plus lines still waiting to be resolved, for the
/// key-value surface.
pub(crate) fn encode(basket: &Basket, pending: &[PersistedEntry]) -> Result<String, serde_json::Error> {
    let lines: Vec<PersistedEntry> = basket
        .entries()
        .iter()
        .map(PersistedEntry::from)
        .chain(pending.iter().cloned())
        .collect();
    serde_json::to_string(&lines)
}

/// Parse a persisted basket.
pub(crate) fn decode(text: &str) -> Result<Vec<PersistedEntry>, serde_json::Error> {
    serde_json::from_str(text)
}

/// What a rehydration pass did with each persisted line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RehydrateReport {
    /// Lines re-joined against a currently loaded product.
    pub from_catalogue: usize,
    /// Lines restored from their persisted snapshot.
    pub from_snapshot: usize,
    /// Lines without a snapshot whose product is not loaded yet.
    pub pending: usize,
    /// Lines dropped: unknown to the full catalogue, or a non-positive quantity.
    pub dropped: Vec<ProductId>,
}

/// Outcome of a rehydration pass.
#[derive(Debug, Default)]
pub(crate) struct Rehydrated {
    pub basket: Basket,
    pub pending: Vec<PersistedEntry>,
    pub report: RehydrateReport,
}

/// Rebuild a basket from persisted lines.
///
/// Each line prefers the loaded product's current attributes and falls back
/// to its own snapshot. A line with neither is kept pending until a later
/// load finds its product; when `loaded` is the whole catalogue it is
/// dropped with a warning instead.
pub(crate) fn rehydrate(
    persisted: Vec<PersistedEntry>,
    loaded: &[Listed<ProductRecord>],
    whole_catalogue: bool,
) -> Rehydrated {
    let mut out = Rehydrated::default();

    for line in persisted {
        let Ok(quantity) = u32::try_from(line.quantity) else {
            tracing::warn!(id = %line.id, quantity = line.quantity, "Basket line with invalid quantity dropped");
            out.report.dropped.push(line.id);
            continue;
        };
        if quantity == 0 {
            tracing::warn!(id = %line.id, "Basket line with zero quantity dropped");
            out.report.dropped.push(line.id);
            continue;
        }

        let current = loaded.iter().find(|p| p.item.id == line.id);
        let product = match (current, line.product) {
            (Some(listed), _) => {
                out.report.from_catalogue += 1;
                listed.item.clone()
            }
            (None, Some(snapshot)) => {
                out.report.from_snapshot += 1;
                ProductRecord {
                    id: line.id.clone(),
                    ..snapshot
                }
            }
            (None, None) if whole_catalogue => {
                tracing::warn!(
                    id = %line.id,
                    "Product not found in catalogue during basket rehydration"
                );
                out.report.dropped.push(line.id);
                continue;
            }
            (None, None) => {
                out.report.pending += 1;
                merge_pending(&mut out.pending, line.id, line.quantity);
                continue;
            }
        };

        out.basket.restore(BasketEntry { product, quantity });
    }

    out
}

fn merge_pending(pending: &mut Vec<PersistedEntry>, id: ProductId, quantity: i64) {
    if let Some(existing) = pending.iter_mut().find(|p| p.id == id) {
        existing.quantity = existing.quantity.saturating_add(quantity);
    } else {
        pending.push(PersistedEntry {
            id,
            quantity,
            product: None,
        });
    }
}
