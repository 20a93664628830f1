//! Product repository.
//!
//! The storefront only reads products. `insert`, `find_id`, `clear` and
//! `clear_unreferenced` exist for the `libra-cli seed` command.

use libra_core::catalog::{CatalogFilter, CatalogStore, PriceLookup, Product, ProductSnapshot};
use libra_core::{Price, ProductId, StoreError};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use super::RepositoryError;

/// Database row for `shop.products`.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    title: String,
    author: Option<String>,
    grade: i16,
    price: Decimal,
    image_url: Option<String>,
    description: Option<String>,
    stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author: row.author,
            grade: row.grade,
            price: Price::new(row.price),
            image_url: row.image_url,
            description: row.description,
            stock: row.stock,
        }
    }
}

/// A product to add to the catalog.
#[derive(Debug, Clone)]
pub struct NewProduct<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub grade: i16,
    pub price: Decimal,
    pub image_url: Option<&'a str>,
    pub description: Option<&'a str>,
    pub stock: i32,
}

/// Repository for catalog reads.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The newest `limit` products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn featured(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, author, grade, price, image_url, description, stock
            FROM shop.products
            ORDER BY id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Products matching `filter`, ordered by title.
    ///
    /// Text matching is a case-insensitive substring test over title and
    /// author. `strpos` is used instead of `ILIKE` so that `%` and `_` in
    /// the search box match literally.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn find(&self, filter: &CatalogFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, author, grade, price, image_url, description, stock
            FROM shop.products
            WHERE ($1::SMALLINT IS NULL OR grade = $1)
              AND ($2::TEXT IS NULL
                   OR strpos(lower(title), lower($2)) > 0
                   OR strpos(lower(coalesce(author, '')), lower($2)) > 0)
            ORDER BY title ASC, id ASC
            ",
        )
        .bind(filter.grade)
        .bind(filter.text.as_deref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Current snapshot for every id that still exists, in one query.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn snapshots(&self, ids: &[ProductId]) -> Result<PriceLookup, RepositoryError> {
        if ids.is_empty() {
            return Ok(PriceLookup::new());
        }
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();

        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, title, author, grade, price, image_url, description, stock
            FROM shop.products
            WHERE id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let product = Product::from(row);
                (product.id, ProductSnapshot::from(&product))
            })
            .collect())
    }

    /// Insert a product and return its id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, product: &NewProduct<'_>) -> Result<ProductId, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO shop.products (title, author, grade, price, image_url, description, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(product.title)
        .bind(product.author)
        .bind(product.grade)
        .bind(product.price)
        .bind(product.image_url)
        .bind(product.description)
        .bind(product.stock)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Delete every product that no order refers to. Returns the number of
    /// rows deleted.
    ///
    /// Products referenced by order items are kept so that order history
    /// stays intact.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear_unreferenced(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.products p
            WHERE NOT EXISTS (SELECT 1 FROM shop.order_items i WHERE i.product_id = p.id)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every product. Order items keep their title and price
    /// snapshots, so order history is unaffected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Id of the product with this exact title and grade, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_id(&self, title: &str, grade: i16) -> Result<Option<ProductId>, RepositoryError> {
        let row: Option<(ProductId,)> = sqlx::query_as(
            "SELECT id FROM shop.products WHERE title = $1 AND grade = $2 ORDER BY id LIMIT 1",
        )
        .bind(title)
        .bind(grade)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Number of products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

impl CatalogStore for ProductRepository {
    async fn list_featured(&self, limit: i64) -> Result<Vec<Product>, StoreError> {
        Ok(self.featured(limit).await?)
    }

    async fn search(&self, filter: &CatalogFilter) -> Result<Vec<Product>, StoreError> {
        Ok(self.find(filter).await?)
    }

    async fn price_lookup(&self, ids: &[ProductId]) -> Result<PriceLookup, StoreError> {
        Ok(self.snapshots(ids).await?)
    }
}
