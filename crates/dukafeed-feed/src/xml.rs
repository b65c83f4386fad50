//! XML text escaping and document scaffolding.

/// Namespace for the Google Shopping RSS extension tags.
pub const GOOGLE_NS: &str = "http://base.google.com/ns/1.0";

/// Escape the five XML-special characters.
///
/// Must be applied after all concatenation and truncation so entities are
/// never double-escaped or cut mid-entity.
#[must_use]
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Append `<name>escaped value</name>` to the buffer.
pub fn push_tag(out: &mut String, name: &str, value: &str) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    out.push_str(&escape_xml(value));
    out.push_str("</");
    out.push_str(name);
    out.push_str(">\n");
}

/// Document prologue through the opening `<channel>` tag, including the
/// store title/link/description.
#[must_use]
pub fn channel_open(store_name: &str, store_url: &str, store_description: &str) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<rss version=\"2.0\" xmlns:g=\"{GOOGLE_NS}\">\n<channel>\n"
    ));
    push_tag(&mut out, "title", store_name);
    push_tag(&mut out, "link", store_url);
    push_tag(&mut out, "description", store_description);
    out
}

#[must_use]
pub fn channel_close() -> &'static str {
    "</channel>\n</rss>\n"
}

/// Minimal well-formed document served on generation failure.
#[must_use]
pub fn error_document() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <rss version=\"2.0\" xmlns:g=\"{GOOGLE_NS}\"><channel><title>Error</title></channel></rss>\n"
    )
}
