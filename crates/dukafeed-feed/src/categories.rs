//! Merging the two category relationship models into one assignment per product.
//!
//! A product can point at a category through a direct foreign key and through
//! the `product_categories` many-to-many join. Internal logic only ever sees
//! the merged list produced here, never the two raw sources.

use std::collections::HashMap;

use dukafeed_core::{Category, CategoryLink, FeedProduct};

/// Resolve the ordered category list for every product.
///
/// Many-to-many links come first, in their curated `position` order (the
/// caller provides `links` already position-sorted per product); the
/// direct-FK category is appended only if its id is not already present.
/// Duplicate ids are dropped, first seen wins. Links pointing at unknown
/// category ids are skipped.
#[must_use]
pub fn resolve_assignments(
    products: &[FeedProduct],
    categories: &[Category],
    links: &[CategoryLink],
) -> HashMap<String, Vec<Category>> {
    let by_id: HashMap<&str, &Category> = categories.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut linked: HashMap<&str, Vec<&str>> = HashMap::new();
    for link in links {
        linked
            .entry(link.product_id.as_str())
            .or_default()
            .push(link.category_id.as_str());
    }

    let mut assignments = HashMap::with_capacity(products.len());
    for product in products {
        let mut resolved: Vec<Category> = Vec::new();

        if let Some(category_ids) = linked.get(product.id.as_str()) {
            for category_id in category_ids {
                if resolved.iter().any(|c| c.id == *category_id) {
                    continue;
                }
                if let Some(category) = by_id.get(category_id) {
                    resolved.push((*category).clone());
                }
            }
        }

        if let Some(direct_id) = &product.category_id {
            if !resolved.iter().any(|c| &c.id == direct_id) {
                if let Some(category) = by_id.get(direct_id.as_str()) {
                    resolved.push((*category).clone());
                }
            }
        }

        assignments.insert(product.id.clone(), resolved);
    }

    assignments
}
