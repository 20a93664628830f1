//! Catalog records and the read-only catalog contract.

use std::collections::HashMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::types::{Price, ProductId};

/// School grades the shop sells books for.
pub const GRADES: [i16; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];

/// Number of products shown on the home page.
pub const FEATURED_LIMIT: i64 = 9;

/// A textbook in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub author: Option<String>,
    /// School grade, 1 to 9.
    pub grade: i16,
    pub price: Price,
    pub image_url: Option<String>,
    pub description: Option<String>,
    /// Stock counter. Present in the data but not enforced at checkout.
    pub stock: i32,
}

/// The fields of a product captured when it is priced for a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub title: String,
    pub author: Option<String>,
    pub price: Price,
    pub image_url: Option<String>,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            author: product.author.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
        }
    }
}

/// Current price and title for a batch of products. Ids that no longer
/// exist are simply absent.
pub type PriceLookup = HashMap<ProductId, ProductSnapshot>;

/// Catalog search criteria. Both parts are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact grade match.
    pub grade: Option<i16>,
    /// Case-insensitive substring of title or author.
    pub text: Option<String>,
}

impl CatalogFilter {
    /// Build a filter from raw query-string values.
    ///
    /// A grade that is not all ASCII digits is ignored rather than rejected;
    /// blank search text means no text filter.
    #[must_use]
    pub fn from_query(grade: Option<&str>, text: Option<&str>) -> Self {
        let grade = grade
            .map(str::trim)
            .filter(|g| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|g| g.parse::<i16>().ok());
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);

        Self { grade, text }
    }

    /// Whether `product` satisfies this filter.
    ///
    /// Mirrors the SQL used by the database-backed store.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.grade.is_some_and(|grade| grade != product.grade) {
            return false;
        }
        let Some(text) = &self.text else {
            return true;
        };
        let needle = text.to_lowercase();
        product.title.to_lowercase().contains(&needle)
            || product
                .author
                .as_deref()
                .is_some_and(|author| author.to_lowercase().contains(&needle))
    }
}

/// Read-only access to the product table.
pub trait CatalogStore: Sync {
    /// The `limit` most recently added products, newest first.
    fn list_featured(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    /// Products matching `filter`, ordered by title ascending.
    fn search(
        &self,
        filter: &CatalogFilter,
    ) -> impl Future<Output = Result<Vec<Product>, StoreError>> + Send;

    /// Current title and price for each id that still exists.
    fn price_lookup(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<PriceLookup, StoreError>> + Send;
}
