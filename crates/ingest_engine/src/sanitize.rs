use std::collections::HashSet;

use ingest_core::{DocumentStore, RawDocument};
use ingest_logging::{ingest_debug, ingest_warn};
use url::Url;

use crate::dom::{escape_text, serialize, DomDocument, DomNode, ElementNode};
use crate::math::{detect_math_usage, normalize_delimiters};

/// No-op navigation used for in-page anchors.
const NOOP_HREF: &str = "javascript:;";

/// Sanitized body plus the parsed page it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedPage {
    pub body: String,
    pub page: DomDocument,
}

impl CleanedPage {
    pub fn title(&self) -> Option<String> {
        self.page.title()
    }
}

/// Strips blocked tags and comments, rewrites references against the base
/// URL, and extracts the body fragment.
#[derive(Debug, Clone)]
pub struct Sanitizer {
    blocked: HashSet<String>,
}

impl Sanitizer {
    pub fn new<I, S>(blocked_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            blocked: blocked_tags
                .into_iter()
                .map(|tag| tag.as_ref().trim().to_ascii_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        }
    }

    /// `media` receives local `file:` images and stylesheets when the
    /// document is local; without it those references stay as `file:` URLs.
    pub fn clean(&self, raw: &RawDocument, media: Option<&dyn DocumentStore>) -> CleanedPage {
        let math = detect_math_usage(&raw.html);
        let mut page = DomDocument::parse(&raw.html);

        page.retain(&|node| match node {
            DomNode::Element(el) => !self.blocked.contains(el.name()),
            DomNode::Comment(_) => false,
            DomNode::Text(_) => true,
        });

        let local_media = if raw.is_local { media } else { None };
        page.for_each_element_mut(&mut |el| {
            let name = el.name().to_string();
            match name.as_str() {
                "a" => rewrite_anchor(el, &raw.base_url),
                "img" => {
                    rewrite_reference(el, "src", &raw.base_url, local_media);
                    el.remove_attr("srcset");
                }
                "link" => rewrite_reference(el, "href", &raw.base_url, local_media),
                _ => {}
            }
        });

        let body = match page.find_first("body") {
            Some(body) => body
                .children
                .iter()
                .map(serialize)
                .collect::<Vec<_>>()
                .join("\n"),
            None => escape_text(&page.text_content()),
        };

        let body = if math.detected {
            ingest_debug!("normalizing math delimiters ({})", math.evidence);
            normalize_delimiters(&body)
        } else {
            body
        };

        CleanedPage { body, page }
    }
}

fn rewrite_anchor(el: &mut ElementNode, base: &Url) {
    let Some(href) = el.attr("href").map(str::to_string) else {
        return;
    };
    if let Some(name) = href.strip_prefix('#') {
        // Fragment navigation is unreliable in the host renderer; scroll by hand.
        if el.attr("onclick").is_none() {
            el.set_attr(
                "onclick",
                format!("document.location.hash='{}';", js_string_body(name)),
            );
        }
        el.set_attr("href", NOOP_HREF);
        return;
    }
    match base.join(href.trim()) {
        Ok(url) => el.set_attr("href", url.as_str()),
        Err(err) => {
            ingest_debug!("dropping unresolvable href {:?}: {}", href, err);
            el.remove_attr("href");
        }
    }
}

/// Escape `value` for a single-quoted JavaScript string literal.
fn js_string_body(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '<' => out.push_str("\\x3c"),
            c => out.push(c),
        }
    }
    out
}

fn rewrite_reference(
    el: &mut ElementNode,
    attr: &str,
    base: &Url,
    media: Option<&dyn DocumentStore>,
) {
    let Some(reference) = el.attr(attr).map(str::to_string) else {
        return;
    };
    let resolved = match base.join(reference.trim()) {
        Ok(url) => url,
        Err(err) => {
            ingest_debug!("dropping unresolvable {} {:?}: {}", attr, reference, err);
            el.remove_attr(attr);
            return;
        }
    };

    let imported = match media {
        Some(store) if resolved.scheme() == "file" => import_media(store, &resolved),
        _ => None,
    };
    el.set_attr(attr, imported.unwrap_or_else(|| resolved.to_string()));
}

fn import_media(store: &dyn DocumentStore, url: &Url) -> Option<String> {
    let path = url.to_file_path().ok()?;
    match store.import_local_media(&path) {
        Ok(reference) => {
            ingest_debug!("{} ===> {}", path.display(), reference);
            Some(reference)
        }
        Err(err) => {
            ingest_warn!("keeping {} as a file URL: {}", url, err);
            None
        }
    }
}
