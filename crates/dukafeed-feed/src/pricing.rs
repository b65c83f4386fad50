//! Price and discount resolution for feed entries.
//!
//! The base product lists `compare_at_price` as the price and `price` as the
//! sale price when a discount is active. Variant pricing is asymmetric by
//! observed storefront behavior: an explicit size price is an absolute
//! replacement, an explicit color price is an offset added to the base
//! product price. An entry with any explicit variant price drops the sale
//! pair entirely.

use dukafeed_core::{FeedProduct, VariantOption};
use rust_decimal::Decimal;

/// The listed/sale pair rendered into one feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemPrice {
    pub listed: Decimal,
    pub sale: Option<Decimal>,
}

/// Base product pricing before any variant override.
#[must_use]
pub fn base_price(product: &FeedProduct) -> ItemPrice {
    match product.compare_at_price {
        Some(compare_at) if compare_at > product.price => ItemPrice {
            listed: compare_at,
            sale: Some(product.price),
        },
        _ => ItemPrice {
            listed: product.price,
            sale: None,
        },
    }
}

/// Pricing for a single feed entry, given its size/color combination.
///
/// - No explicit variant price → the base listed/sale pair.
/// - Size with explicit price → that price, absolute; sale dropped.
/// - Color with explicit price → base product price plus the color offset;
///   sale dropped.
/// - Both explicit → size absolute plus color offset; sale dropped.
///
/// A sale price that would come out equal to or above the listed price is
/// dropped, so emitted entries always satisfy `sale < listed` strictly.
#[must_use]
pub fn entry_price(
    product: &FeedProduct,
    size: Option<&VariantOption>,
    color: Option<&VariantOption>,
) -> ItemPrice {
    let size_price = size.and_then(VariantOption::explicit_price);
    let color_offset = color.and_then(VariantOption::explicit_price);

    let price = match (size_price, color_offset) {
        (None, None) => base_price(product),
        (Some(absolute), None) => ItemPrice {
            listed: absolute,
            sale: None,
        },
        (None, Some(offset)) => ItemPrice {
            listed: product.price + offset,
            sale: None,
        },
        (Some(absolute), Some(offset)) => ItemPrice {
            listed: absolute + offset,
            sale: None,
        },
    };

    enforce_sale_invariant(price)
}

fn enforce_sale_invariant(price: ItemPrice) -> ItemPrice {
    match price.sale {
        Some(sale) if sale >= price.listed => ItemPrice {
            listed: price.listed,
            sale: None,
        },
        _ => price,
    }
}

/// Renders an amount with exactly two decimal digits, a space, and the
/// currency code, e.g. `"1200.00 KES"`.
#[must_use]
pub fn format_price(amount: Decimal, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}
