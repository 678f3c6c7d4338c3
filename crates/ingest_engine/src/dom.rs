//! Owned, typed HTML tree.
//!
//! `scraper` gives a lenient html5ever parse but no attribute mutation, so the
//! parse is copied into this tree, rewritten, and serialized back.

use std::fmt::Write;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Removes the attribute; absent attributes are fine.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(key, _)| key == name)?;
        Some(self.attrs.remove(idx).1)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A parsed page: the top-level nodes below the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomDocument {
    pub children: Vec<DomNode>,
}

impl DomDocument {
    /// Parse leniently; malformed markup never fails.
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let children = parsed.tree.root().children().filter_map(convert).collect();
        Self { children }
    }

    /// Text of the first `<title>`, trimmed; `None` when missing or blank.
    pub fn title(&self) -> Option<String> {
        let title = self.find_first("title")?;
        let mut text = String::new();
        collect_text(&title.children, &mut text);
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    pub fn find_first(&self, name: &str) -> Option<&ElementNode> {
        find_first_in(&self.children, name)
    }

    /// Drop every node for which `keep` returns false, with its subtree.
    pub fn retain(&mut self, keep: &dyn Fn(&DomNode) -> bool) {
        retain_in(&mut self.children, keep);
    }

    /// Visit every element in document order.
    pub fn for_each_element_mut(&mut self, visit: &mut dyn FnMut(&mut ElementNode)) {
        for_each_in(&mut self.children, visit);
    }

    /// Concatenated text of the whole document.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }
}

fn convert(node: NodeRef<'_, Node>) -> Option<DomNode> {
    match node.value() {
        Node::Element(element) => {
            let mut out = ElementNode::new(element.name());
            out.attrs = element
                .attrs()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            out.children = node.children().filter_map(convert).collect();
            Some(DomNode::Element(out))
        }
        Node::Text(text) => Some(DomNode::Text(String::from(&**text))),
        Node::Comment(comment) => Some(DomNode::Comment(String::from(&**comment))),
        _ => None,
    }
}

fn find_first_in<'a>(nodes: &'a [DomNode], name: &str) -> Option<&'a ElementNode> {
    nodes.iter().find_map(|node| match node {
        DomNode::Element(el) if el.name == name => Some(el),
        DomNode::Element(el) => find_first_in(&el.children, name),
        _ => None,
    })
}

fn retain_in(nodes: &mut Vec<DomNode>, keep: &dyn Fn(&DomNode) -> bool) {
    nodes.retain(|node| keep(node));
    for node in nodes.iter_mut() {
        if let DomNode::Element(el) = node {
            retain_in(&mut el.children, keep);
        }
    }
}

fn for_each_in(nodes: &mut [DomNode], visit: &mut dyn FnMut(&mut ElementNode)) {
    for node in nodes.iter_mut() {
        if let DomNode::Element(el) = node {
            visit(el);
            for_each_in(&mut el.children, visit);
        }
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(text) => out.push_str(text),
            DomNode::Element(el) => collect_text(&el.children, out),
            DomNode::Comment(_) => {}
        }
    }
}

/// Serialize one node the way html5ever does for HTML documents.
pub fn serialize(node: &DomNode) -> String {
    let mut out = String::new();
    write_node(node, None, &mut out);
    out
}

fn write_node(node: &DomNode, parent: Option<&str>, out: &mut String) {
    match node {
        DomNode::Text(text) => {
            if parent.is_some_and(|p| RAW_TEXT_ELEMENTS.contains(&p)) {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        DomNode::Comment(comment) => {
            let _ = write!(out, "<!--{comment}-->");
        }
        DomNode::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (key, value) in &el.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.name.as_str()) {
                return;
            }
            for child in &el.children {
                write_node(child, Some(&el.name), out);
            }
            let _ = write!(out, "</{}>", el.name);
        }
    }
}

/// Escape `text` for use as HTML text content.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, false, &mut out);
    out
}

fn escape_into(text: &str, attr_mode: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attr_mode => out.push_str("&quot;"),
            '<' if !attr_mode => out.push_str("&lt;"),
            '>' if !attr_mode => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(doc: &DomDocument) -> &ElementNode {
        doc.find_first("body").expect("html5ever always builds a body")
    }

    #[test]
    fn malformed_markup_still_parses() {
        let doc = DomDocument::parse("<p>open <b>bold <i>both</p> tail");
        assert!(doc.text_content().contains("open bold both"));
        assert!(doc.text_content().contains("tail"));
    }

    #[test]
    fn title_is_trimmed_and_optional() {
        let doc = DomDocument::parse("<title>  Hello \n</title><p>x</p>");
        assert_eq!(doc.title().as_deref(), Some("Hello"));
        assert_eq!(DomDocument::parse("<p>x</p>").title(), None);
    }

    #[test]
    fn attributes_are_typed_accessors() {
        let mut el = ElementNode::new("a");
        assert_eq!(el.attr("href"), None);
        el.set_attr("href", "x");
        el.set_attr("href", "y");
        assert_eq!(el.attr("href"), Some("y"));
        assert_eq!(el.remove_attr("href").as_deref(), Some("y"));
        assert_eq!(el.remove_attr("href"), None);
    }

    #[test]
    fn serializer_escapes_text_and_attributes() {
        let doc = DomDocument::parse(r#"<body><p title="a &quot;q&quot;">1 &lt; 2 &amp; 3</p><br></body>"#);
        let html: Vec<String> = body_of(&doc).children.iter().map(serialize).collect();
        assert_eq!(html[0], r#"<p title="a &quot;q&quot;">1 &lt; 2 &amp; 3</p>"#);
        assert_eq!(html[1], "<br>");
    }

    #[test]
    fn raw_text_is_not_escaped() {
        let doc = DomDocument::parse("<body><style>a > b { color: red }</style></body>");
        let html = serialize(&body_of(&doc).children[0]);
        assert_eq!(html, "<style>a > b { color: red }</style>");
    }
}
