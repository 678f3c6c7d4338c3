/// Interpolate the citation template with `{date}` and `{url}`.
///
/// Unknown placeholders are left as written.
pub fn format_citation(template: &str, date: &str, url: &str) -> String {
    template.replace("{date}", date).replace("{url}", url)
}

/// The `{url}` value used for remote documents: an anchor wrapping the URL.
pub fn remote_link(url: &str) -> String {
    format!(r#"<a href="{url}">{url}</a>"#)
}

/// Tag derived from a title: whitespace runs collapsed into single dashes.
pub fn title_tag(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join("-")
}
