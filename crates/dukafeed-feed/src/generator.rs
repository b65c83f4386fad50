//! Assembly of the full merchant feed document.

use std::collections::HashMap;

use dukafeed_core::{Category, FeedProduct};

use crate::describe::{availability, build_description};
use crate::error::FeedError;
use crate::images::resolve_image_urls;
use crate::pricing::{entry_price, format_price};
use crate::variants::expand;
use crate::xml::{channel_close, channel_open, push_tag};

/// Store-level settings the generator needs; a plain-field subset of the
/// application config.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub store_name: String,
    pub store_url: String,
    pub brand: String,
    pub currency: String,
    pub storage_base_url: String,
    pub storage_subpath: String,
    pub placeholder_image_url: String,
}

impl FeedConfig {
    #[must_use]
    pub fn from_app_config(config: &dukafeed_core::AppConfig) -> Self {
        Self {
            store_name: config.store_name.clone(),
            store_url: config.store_url.clone(),
            brand: config.brand.clone(),
            currency: config.currency.clone(),
            storage_base_url: config.storage_base_url.clone(),
            storage_subpath: config.storage_subpath.clone(),
            placeholder_image_url: config.placeholder_image_url.clone(),
        }
    }
}

/// Render the complete feed document for a catalog snapshot.
///
/// `assignments` is the resolved category list per product id, produced by
/// [`crate::categories::resolve_assignments`]; products missing from the map
/// simply carry no category fields.
///
/// # Errors
///
/// Returns [`FeedError::EmptyCatalog`] when `products` is empty; callers map
/// this to the error document and a 500 response.
pub fn build_feed(
    products: &[FeedProduct],
    assignments: &HashMap<String, Vec<Category>>,
    config: &FeedConfig,
) -> Result<String, FeedError> {
    if products.is_empty() {
        return Err(FeedError::EmptyCatalog);
    }

    let mut out = channel_open(
        &config.store_name,
        &config.store_url,
        &format!("{} product feed", config.store_name),
    );

    for product in products {
        write_product(&mut out, product, assignments, config);
    }

    out.push_str(channel_close());
    Ok(out)
}

fn write_product(
    out: &mut String,
    product: &FeedProduct,
    assignments: &HashMap<String, Vec<Category>>,
    config: &FeedConfig,
) {
    let image_urls = resolve_image_urls(
        &product.images,
        &config.storage_base_url,
        &config.storage_subpath,
        &config.placeholder_image_url,
    );
    let description = build_description(product, &config.store_name);
    let availability = availability(&product.status, product.stock);
    let link = format!("{}/products/{}", config.store_url, product.slug);
    let category_name = assignments
        .get(&product.id)
        .and_then(|categories| categories.first())
        .map(|category| category.name.as_str());

    for entry in expand(product) {
        let price = entry_price(product, entry.size, entry.color);

        out.push_str("<item>\n");
        push_tag(out, "g:id", &entry.id);
        push_tag(out, "g:item_group_id", &product.id);
        push_tag(out, "g:title", &product.name);
        push_tag(out, "g:description", &description);
        push_tag(out, "g:link", &link);
        push_tag(out, "g:image_link", &image_urls[0]);
        for url in &image_urls[1..] {
            push_tag(out, "g:additional_image_link", url);
        }
        push_tag(out, "g:availability", availability);
        push_tag(out, "g:price", &format_price(price.listed, &config.currency));
        if let Some(sale) = price.sale {
            push_tag(out, "g:sale_price", &format_price(sale, &config.currency));
        }
        push_tag(out, "g:condition", "new");
        push_tag(out, "g:brand", &config.brand);
        if let Some(size) = entry.size {
            push_tag(out, "g:size", &size.label);
        }
        if let Some(color) = entry.color {
            push_tag(out, "g:color", &color.label);
        }
        out.push_str("<g:shipping>\n");
        push_tag(out, "g:country", "KE");
        push_tag(out, "g:service", "Standard");
        push_tag(out, "g:price", "0 KES");
        out.push_str("</g:shipping>\n");
        push_tag(out, "g:mpn", &entry.id);
        if let Some(taxonomy) = product
            .google_product_category
            .as_deref()
            .filter(|t| !t.is_empty())
        {
            push_tag(out, "g:google_product_category", taxonomy);
        }
        if let Some(name) = category_name.filter(|n| !n.is_empty()) {
            push_tag(out, "g:product_type", name);
        }
        push_tag(out, "g:adult", "no");
        push_tag(out, "g:identifier_exists", "no");
        out.push_str("</item>\n");
    }
}

#[cfg(test)]
#[path = "generator_test.rs"]
mod tests;
