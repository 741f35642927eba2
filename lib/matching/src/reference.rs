use ahash::AHashMap;
use tasador_core::{Error, Item, Result};
use tracing::debug;

/// Ordered, priced reference items.
///
/// Position in this set is the position used by the similarity index, so the
/// set must not be reordered between building the index and resolving.
#[derive(Debug, Clone)]
pub struct ReferenceSet {
    items: Vec<Item>,
    // first position of every code
    by_code: AHashMap<String, usize>,
}

impl ReferenceSet {
    /// Keep usable items (priced, non-empty text) in their original order.
    /// Fails when nothing usable is left.
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let total = items.len();
        let items: Vec<Item> = items.into_iter().filter(Item::is_usable_reference).collect();
        if items.is_empty() {
            return Err(Error::EmptyReferenceSet);
        }
        debug!(usable = items.len(), dropped = total - items.len(), "Reference set ready");

        let mut by_code = AHashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            by_code.entry(item.code.clone()).or_insert(position);
        }
        Ok(Self { items, by_code })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, position: usize) -> Option<&Item> {
        self.items.get(position)
    }

    /// Normalized texts in index order
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.normalized_text.as_str()).collect()
    }

    pub fn position_of_code(&self, code: &str) -> Option<usize> {
        self.by_code.get(code).copied()
    }
}
