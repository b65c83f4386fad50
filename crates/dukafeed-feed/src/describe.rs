//! Availability and description shaping for feed entries.

use dukafeed_core::FeedProduct;

/// Combined descriptions shorter than this get the canned fallback sentence
/// appended.
pub const FALLBACK_MIN_LEN: usize = 120;

/// Hard cap on rendered description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Canonical availability rule, applied uniformly across the feed:
/// in stock iff the product is active and stock is either untracked or
/// positive.
#[must_use]
pub fn availability(status: &str, stock: Option<i32>) -> &'static str {
    if status == "active" && stock.is_none_or(|s| s > 0) {
        "in stock"
    } else {
        "out of stock"
    }
}

/// Build the feed description for a product.
///
/// Strips HTML from the description and meta description (tags become a
/// single space), joins them, collapses whitespace, appends the canned store
/// sentence when the combined text is under [`FALLBACK_MIN_LEN`] characters,
/// and truncates to [`MAX_DESCRIPTION_LEN`] characters at the nearest
/// preceding word boundary with a trailing ellipsis.
#[must_use]
pub fn build_description(product: &FeedProduct, store_name: &str) -> String {
    let description = product.description.as_deref().map(strip_html);
    let meta = product.meta_description.as_deref().map(strip_html);

    let mut combined = [description, meta]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    combined = collapse_whitespace(&combined);

    if combined.chars().count() < FALLBACK_MIN_LEN {
        let fallback = format!(
            "{} is available to order online from {store_name}, with delivery across Kenya.",
            product.name
        );
        if combined.is_empty() {
            combined = fallback;
        } else {
            combined.push(' ');
            combined.push_str(&fallback);
        }
    }

    truncate_at_word_boundary(&combined, MAX_DESCRIPTION_LEN)
}

/// Replace HTML tags with a single space. Not a full parser: anything between
/// `<` and the next `>` is treated as a tag.
#[must_use]
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// Collapse whitespace runs to single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let truncated = match cut.rfind(' ') {
        Some(space) => &cut[..space],
        None => cut.as_str(),
    };
    format!("{}...", truncated.trim_end())
}
