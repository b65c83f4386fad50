use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product snapshot as the feed generator consumes it, assembled from a
/// `products` row with its JSONB image and variant columns decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedProduct {
    /// Opaque identifier assigned by the storefront backend.
    pub id: String,
    pub name: String,
    /// URL slug; canonical product link is `{store_url}/products/{slug}`.
    pub slug: String,
    /// Raw storefront HTML; stripped before it reaches the feed.
    pub description: Option<String>,
    pub meta_description: Option<String>,
    pub price: Decimal,
    /// "Was" price. The product is on sale only when this is strictly
    /// greater than `price`.
    pub compare_at_price: Option<Decimal>,
    pub stock: Option<i32>,
    /// `"active"`, `"draft"`, or `"archived"`.
    pub status: String,
    pub images: Vec<ImageRef>,
    pub sizes: Vec<VariantOption>,
    pub colors: Vec<VariantOption>,
    /// Free-text Google taxonomy string curated in the admin, if any.
    pub google_product_category: Option<String>,
    /// Direct foreign key to `categories`; merged with the many-to-many
    /// rows during category resolution.
    pub category_id: Option<String>,
}

impl FeedProduct {
    /// Returns `true` when the "was" price is strictly above the selling price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        matches!(self.compare_at_price, Some(compare_at) if compare_at > self.price)
    }

    #[must_use]
    pub fn has_variants(&self) -> bool {
        !self.sizes.is_empty() || !self.colors.is_empty()
    }
}

/// One size or color option on a product.
///
/// `price` semantics differ by axis: a size price is an absolute replacement
/// price, a color price is an offset added to the base product price. Zero or
/// absent means the option carries no price of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl VariantOption {
    /// The option's own price when explicitly set and positive.
    #[must_use]
    pub fn explicit_price(&self) -> Option<Decimal> {
        self.price.filter(|p| p > &Decimal::ZERO)
    }
}

/// A single image descriptor from the `images` JSONB column.
///
/// `url` is either an absolute URL or a storage-relative path; an empty
/// string yields no resolvable image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// One row of the `product_categories` many-to-many join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryLink {
    pub product_id: String,
    pub category_id: String,
    pub position: i32,
}
