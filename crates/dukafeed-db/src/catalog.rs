//! Read queries over the catalog tables consumed by the feed generator.
//!
//! The JSONB columns (`images`, `sizes`, `colors`) are fetched as raw JSON
//! values and decoded leniently: a malformed column degrades that product to
//! an empty list with a logged warning instead of failing the whole fetch.

use dukafeed_core::{Category, CategoryLink, FeedProduct, ImageRef, VariantOption};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sqlx::{types::Json, PgPool};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table as the feed query selects it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedProductRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub meta_description: Option<String>,
    pub price: Decimal,
    pub compare_at_price: Option<Decimal>,
    pub stock: Option<i32>,
    pub status: String,
    pub images: Json<serde_json::Value>,
    pub sizes: Json<serde_json::Value>,
    pub colors: Json<serde_json::Value>,
    pub google_product_category: Option<String>,
    pub category_id: Option<String>,
}

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A row from the `product_categories` join table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryLinkRow {
    pub product_id: String,
    pub category_id: String,
    pub position: i32,
}

impl From<FeedProductRow> for FeedProduct {
    fn from(row: FeedProductRow) -> Self {
        let images: Vec<ImageRef> = decode_list(&row.id, "images", row.images.0);
        let sizes: Vec<VariantOption> = decode_list(&row.id, "sizes", row.sizes.0);
        let colors: Vec<VariantOption> = decode_list(&row.id, "colors", row.colors.0);

        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            meta_description: row.meta_description,
            price: row.price,
            compare_at_price: row.compare_at_price,
            stock: row.stock,
            status: row.status,
            images,
            sizes,
            colors,
            google_product_category: row.google_product_category,
            category_id: row.category_id,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
        }
    }
}

impl From<CategoryLinkRow> for CategoryLink {
    fn from(row: CategoryLinkRow) -> Self {
        Self {
            product_id: row.product_id,
            category_id: row.category_id,
            position: row.position,
        }
    }
}

/// Decode one JSONB list column, degrading to empty on malformed data.
fn decode_list<T: DeserializeOwned>(
    product_id: &str,
    column: &str,
    value: serde_json::Value,
) -> Vec<T> {
    match serde_json::from_value(value) {
        Ok(list) => list,
        Err(error) => {
            tracing::warn!(product_id, column, %error, "malformed JSONB column, treating as empty");
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every active product in stable snapshot order.
///
/// Ordering is `created_at ASC, id ASC` so that a given catalog snapshot
/// always produces feed items in the same order, which downstream consumers
/// rely on for diffing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_feed_products(pool: &PgPool) -> Result<Vec<FeedProduct>, DbError> {
    let rows = sqlx::query_as::<_, FeedProductRow>(
        "SELECT id, name, slug, description, meta_description, price, \
                compare_at_price, stock, status, images, sizes, colors, \
                google_product_category, category_id \
         FROM products \
         WHERE status = 'active' \
         ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Returns all categories.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, slug FROM categories ORDER BY name ASC, id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Returns every product/category many-to-many row, ordered so that each
/// product's links come back in curated `position` order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_category_links(pool: &PgPool) -> Result<Vec<CategoryLink>, DbError> {
    let rows = sqlx::query_as::<_, CategoryLinkRow>(
        "SELECT product_id, category_id, position \
         FROM product_categories \
         ORDER BY product_id ASC, position ASC, category_id ASC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}
