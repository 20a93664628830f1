//! The visitor's shopping cart.
//!
//! A cart is a plain value: the web layer loads it from the session, hands it
//! to these operations, and writes it back. Nothing here knows about
//! sessions or storage.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::PriceLookup;
use crate::types::{Price, ProductId};

/// Largest quantity a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Mapping of product to quantity. Every stored quantity is between 1 and
/// [`MAX_LINE_QUANTITY`] unless the cart was deserialized from elsewhere.
///
/// Serializes as a JSON object keyed by the product id as a string, e.g.
/// `{"2":3}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
}

/// A cart line joined with the product's current catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCartLine {
    pub product_id: ProductId,
    pub title: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
    pub subtotal: Price,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of a product, as submitted by an add-to-cart form.
    ///
    /// A missing or non-numeric product id leaves the cart untouched and
    /// returns `false`. The quantity counts as at least 1; a missing or
    /// unparsable quantity is treated as 1. The line never exceeds
    /// [`MAX_LINE_QUANTITY`].
    pub fn add(&mut self, product_id: Option<&str>, quantity: Option<&str>) -> bool {
        let Some(product_id) = product_id.and_then(parse_product_id) else {
            return false;
        };
        let quantity = quantity
            .and_then(|q| q.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        self.add_quantity(product_id, u32::try_from(quantity).unwrap_or(u32::MAX));
        true
    }

    /// Add `quantity` (at least 1) of an already-parsed product id, capped
    /// at [`MAX_LINE_QUANTITY`].
    pub fn add_quantity(&mut self, product_id: ProductId, quantity: u32) {
        let line = self.lines.entry(product_id).or_insert(0);
        *line = line.saturating_add(quantity.max(1)).min(MAX_LINE_QUANTITY);
    }

    /// Replace the whole cart with the submitted `(product id, quantity)`
    /// pairs.
    ///
    /// Non-numeric ids are dropped, non-numeric quantities count as 0, and
    /// any line that ends up at 0 or below is removed. Larger quantities are
    /// capped at [`MAX_LINE_QUANTITY`]. When an id appears more than once the
    /// last value wins.
    pub fn bulk_set<I, K, V>(&mut self, lines: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut next = BTreeMap::new();
        for (id, quantity) in lines {
            let Some(product_id) = parse_product_id(id.as_ref()) else {
                continue;
            };
            let quantity = quantity.as_ref().trim().parse::<i64>().unwrap_or(0);
            if quantity > 0 {
                let quantity = u32::try_from(quantity)
                    .unwrap_or(u32::MAX)
                    .min(MAX_LINE_QUANTITY);
                next.insert(product_id, quantity);
            } else {
                next.remove(&product_id);
            }
        }
        self.lines = next;
    }

    /// Sum of quantity × current price over lines whose product still
    /// exists. Returns zero for an empty cart.
    #[must_use]
    pub fn total(&self, lookup: &PriceLookup) -> Decimal {
        self.lines
            .iter()
            .filter_map(|(id, quantity)| {
                lookup
                    .get(id)
                    .map(|product| product.price.times(*quantity))
            })
            .sum::<Price>()
            .amount()
    }

    /// Join the cart with catalog data for display.
    ///
    /// Lines whose product no longer exists are left out of the view but
    /// stay in the cart.
    #[must_use]
    pub fn resolve(&self, lookup: &PriceLookup) -> Vec<ResolvedCartLine> {
        self.lines
            .iter()
            .filter_map(|(id, quantity)| {
                lookup.get(id).map(|product| ResolvedCartLine {
                    product_id: *id,
                    title: product.title.clone(),
                    author: product.author.clone(),
                    image_url: product.image_url.clone(),
                    unit_price: product.price,
                    quantity: *quantity,
                    subtotal: product.price.times(*quantity),
                })
            })
            .collect()
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|q| u64::from(*q)).sum()
    }

    /// Quantity held for `product_id`, if any.
    #[must_use]
    pub fn quantity(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).copied()
    }

    /// Product ids in the cart, in ascending order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lines.keys().copied().collect()
    }

    /// `(product id, quantity)` pairs in ascending id order.
    pub fn lines(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.lines.iter().map(|(id, quantity)| (*id, *quantity))
    }
}

/// Parse a product id from form input. Only plain ASCII digits are accepted.
fn parse_product_id(raw: &str) -> Option<ProductId> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
