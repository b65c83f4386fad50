//! Image URL resolution.
//!
//! The first resolved URL becomes `g:image_link`; the rest become
//! `g:additional_image_link`, capped at [`MAX_ADDITIONAL_IMAGES`]. Products
//! with nothing resolvable fall back to the configured placeholder.

use dukafeed_core::ImageRef;

pub const MAX_ADDITIONAL_IMAGES: usize = 10;

/// Resolve a product's image references into absolute URLs.
///
/// Always returns at least one URL: the placeholder when nothing resolves.
#[must_use]
pub fn resolve_image_urls(
    images: &[ImageRef],
    storage_base_url: &str,
    storage_subpath: &str,
    placeholder: &str,
) -> Vec<String> {
    let mut urls: Vec<String> = images
        .iter()
        .filter_map(|image| resolve_ref(&image.url, storage_base_url, storage_subpath))
        .collect();
    urls.truncate(1 + MAX_ADDITIONAL_IMAGES);

    if urls.is_empty() {
        urls.push(placeholder.to_string());
    }
    urls
}

/// Resolve one reference: absolute URLs pass through unchanged; relative
/// paths join onto the storage base and sub-path, without double-prefixing
/// the sub-path segment. Empty references and relative paths with no
/// configured base resolve to nothing.
fn resolve_ref(raw: &str, storage_base_url: &str, storage_subpath: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if storage_base_url.is_empty() {
        return None;
    }

    let base = storage_base_url.trim_end_matches('/');
    let path = raw.trim_start_matches('/');
    if storage_subpath.is_empty() || path.starts_with(&format!("{storage_subpath}/")) {
        Some(format!("{base}/{path}"))
    } else {
        Some(format!("{base}/{storage_subpath}/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://storage.example.co.ke";
    const SUBPATH: &str = "products";
    const PLACEHOLDER: &str = "https://shop.example.co.ke/images/placeholder.png";

    fn image(url: &str) -> ImageRef {
        ImageRef {
            url: url.to_string(),
        }
    }

    fn resolve(images: &[ImageRef]) -> Vec<String> {
        resolve_image_urls(images, BASE, SUBPATH, PLACEHOLDER)
    }

    #[test]
    fn absolute_urls_pass_through_unchanged() {
        let urls = resolve(&[image("https://cdn.other.com/x.jpg")]);
        assert_eq!(urls, vec!["https://cdn.other.com/x.jpg"]);
    }

    #[test]
    fn relative_path_joins_base_and_subpath() {
        let urls = resolve(&[image("tote-front.jpg")]);
        assert_eq!(
            urls,
            vec!["https://storage.example.co.ke/products/tote-front.jpg"]
        );
    }

    #[test]
    fn leading_slash_is_stripped() {
        let urls = resolve(&[image("/tote-front.jpg")]);
        assert_eq!(
            urls,
            vec!["https://storage.example.co.ke/products/tote-front.jpg"]
        );
    }

    #[test]
    fn subpath_is_not_double_prefixed() {
        let urls = resolve(&[image("products/tote-front.jpg")]);
        assert_eq!(
            urls,
            vec!["https://storage.example.co.ke/products/tote-front.jpg"]
        );
    }

    #[test]
    fn empty_and_unresolvable_refs_fall_back_to_placeholder() {
        assert_eq!(resolve(&[]), vec![PLACEHOLDER]);
        assert_eq!(resolve(&[image(""), image("   ")]), vec![PLACEHOLDER]);

        let no_base = resolve_image_urls(&[image("rel.jpg")], "", SUBPATH, PLACEHOLDER);
        assert_eq!(no_base, vec![PLACEHOLDER]);
    }

    #[test]
    fn additional_images_are_capped() {
        let images: Vec<ImageRef> = (0..20).map(|i| image(&format!("img-{i}.jpg"))).collect();
        let urls = resolve(&images);
        assert_eq!(urls.len(), 1 + MAX_ADDITIONAL_IMAGES);
        assert!(urls[0].ends_with("img-0.jpg"));
    }
}
