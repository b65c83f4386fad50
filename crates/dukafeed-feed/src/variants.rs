//! Variant expansion: one feed entry per size/color combination.

use dukafeed_core::{FeedProduct, VariantOption};

/// One expanded entry of a product: its feed id plus the size/color options
/// that produced it.
#[derive(Debug, Clone)]
pub struct VariantEntry<'a> {
    /// Feed-unique id: base product id, optionally suffixed with slugified
    /// variant labels.
    pub id: String,
    pub size: Option<&'a VariantOption>,
    pub color: Option<&'a VariantOption>,
}

/// Expand a product into its feed entries.
///
/// No sizes and no colors yields the product itself; sizes-only and
/// colors-only yield one entry per option; both yield the cartesian product
/// with sizes as the outer loop. The ordering is stable for a given catalog
/// snapshot so downstream consumers can diff feeds.
#[must_use]
pub fn expand(product: &FeedProduct) -> Vec<VariantEntry<'_>> {
    let base = product.id.as_str();

    match (product.sizes.is_empty(), product.colors.is_empty()) {
        (true, true) => vec![VariantEntry {
            id: base.to_string(),
            size: None,
            color: None,
        }],
        (false, true) => product
            .sizes
            .iter()
            .map(|size| VariantEntry {
                id: format!("{base}-{}", slugify_label(&size.label)),
                size: Some(size),
                color: None,
            })
            .collect(),
        (true, false) => product
            .colors
            .iter()
            .map(|color| VariantEntry {
                id: format!("{base}-{}", slugify_label(&color.label)),
                size: None,
                color: Some(color),
            })
            .collect(),
        (false, false) => product
            .sizes
            .iter()
            .flat_map(|size| {
                product.colors.iter().map(move |color| VariantEntry {
                    id: format!(
                        "{base}-{}-{}",
                        slugify_label(&size.label),
                        slugify_label(&color.label)
                    ),
                    size: Some(size),
                    color: Some(color),
                })
            })
            .collect(),
    }
}

/// Replace runs of whitespace with a single hyphen. Case and punctuation are
/// left as-is.
#[must_use]
pub fn slugify_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("-")
}
