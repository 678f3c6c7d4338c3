//! Table-of-contents extraction for EPUB files.
//!
//! The archive is unpacked into a temporary directory that lives as long as
//! the returned [`ExtractedEpub`], so the chapter paths stay readable while a
//! batch imports them.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use ingest_logging::ingest_debug;
use roxmltree::{Document, Node, ParsingOptions};
use scraper::{Html, Selector};
use tempfile::TempDir;
use thiserror::Error;
use url::Url;

const CONTAINER_PATH: &str = "META-INF/container.xml";
const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";

#[derive(Debug, Error)]
pub enum EpubError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid xml in {path}: {message}")]
    Xml { path: String, message: String },
    #[error("missing {0}")]
    Missing(String),
}

/// One navigable chapter of a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub text: Option<String>,
    pub book_title: Option<String>,
    pub author: Option<String>,
    /// Absolute path of the chapter file, fragment removed.
    pub href: PathBuf,
}

#[derive(Debug)]
pub struct ExtractedEpub {
    dir: TempDir,
    pub title: Option<String>,
    pub author: Option<String>,
    pub entries: Vec<TocEntry>,
}

impl ExtractedEpub {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: String,
}

/// Unpack `path` and read its table of contents in reading order.
pub fn extract_epub(path: &Path) -> Result<ExtractedEpub, EpubError> {
    let dir = tempfile::Builder::new().prefix("ingest-epub-").tempdir()?;
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    archive.extract(dir.path())?;
    // Canonical so file URLs built from it resolve `..` against the real layout.
    let root = fs::canonicalize(dir.path())?;

    let container = read_xml_text(&root.join(CONTAINER_PATH))?;
    let container_doc = parse_xml(&container, CONTAINER_PATH)?;
    let opf_rel = container_doc
        .descendants()
        .find(|node| node.has_tag_name("rootfile"))
        .and_then(|node| node.attribute("full-path"))
        .ok_or_else(|| EpubError::Missing("rootfile in container.xml".to_string()))?;
    let opf_path = root.join(opf_rel);
    let opf_dir = opf_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.clone());

    let opf = read_xml_text(&opf_path)?;
    let opf_doc = parse_xml(&opf, opf_rel)?;
    let title = metadata_text(&opf_doc, "title");
    let author = metadata_text(&opf_doc, "creator");
    let manifest = manifest_items(&opf_doc);
    let spine_toc = opf_doc
        .descendants()
        .find(|node| node.has_tag_name("spine"))
        .and_then(|node| node.attribute("toc"));

    let ncx = manifest
        .iter()
        .find(|item| Some(item.id.as_str()) == spine_toc)
        .or_else(|| manifest.iter().find(|item| item.media_type == NCX_MEDIA_TYPE));
    let nav = manifest
        .iter()
        .find(|item| item.properties.split_whitespace().any(|p| p == "nav"));

    let links = match (ncx, nav) {
        (Some(item), _) => {
            let toc_path = opf_dir.join(&item.href);
            let text = read_xml_text(&toc_path)?;
            let links = ncx_links(&parse_xml(&text, &item.href)?);
            resolve_links(&toc_path, links)
        }
        (None, Some(item)) => {
            let toc_path = opf_dir.join(&item.href);
            let text = read_xml_text(&toc_path)?;
            resolve_links(&toc_path, nav_links(&text))
        }
        (None, None) => Vec::new(),
    };
    ingest_debug!("{}: {} toc entries", path.display(), links.len());

    let entries = links
        .into_iter()
        .map(|(text, href)| TocEntry {
            text,
            book_title: title.clone(),
            author: author.clone(),
            href,
        })
        .collect();

    Ok(ExtractedEpub {
        dir,
        title,
        author,
        entries,
    })
}

fn read_xml_text(path: &Path) -> Result<String, EpubError> {
    if !path.is_file() {
        return Err(EpubError::Missing(path.display().to_string()));
    }
    Ok(fs::read_to_string(path)?)
}

fn parse_xml<'a>(text: &'a str, name: &str) -> Result<Document<'a>, EpubError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Document::parse_with_options(text, options).map_err(|err| EpubError::Xml {
        path: name.to_string(),
        message: err.to_string(),
    })
}

fn metadata_text(doc: &Document<'_>, local_name: &str) -> Option<String> {
    let metadata = doc
        .descendants()
        .find(|node| node.tag_name().name() == "metadata")?;
    metadata
        .descendants()
        .find(|node| node.tag_name().name() == local_name)
        .map(node_text)
        .filter(|text| !text.is_empty())
}

fn manifest_items(doc: &Document<'_>) -> Vec<ManifestItem> {
    doc.descendants()
        .filter(|node| node.tag_name().name() == "item")
        .filter_map(|node| {
            Some(ManifestItem {
                id: node.attribute("id")?.to_string(),
                href: node.attribute("href")?.to_string(),
                media_type: node.attribute("media-type").unwrap_or_default().to_string(),
                properties: node.attribute("properties").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// EPUB 2 navigation: every `navPoint`, nested ones included, in document order.
fn ncx_links(doc: &Document<'_>) -> Vec<(Option<String>, String)> {
    doc.descendants()
        .filter(|node| node.tag_name().name() == "navPoint")
        .filter_map(|point| {
            let src = child_element(point, "content")?.attribute("src")?.to_string();
            let text = child_element(point, "navLabel")
                .and_then(|label| child_element(label, "text"))
                .map(node_text)
                .filter(|text| !text.is_empty());
            Some((text, src))
        })
        .collect()
}

/// EPUB 3 navigation document. Parsed as HTML since these files routinely
/// carry entities an XML parser rejects.
fn nav_links(text: &str) -> Vec<(Option<String>, String)> {
    let Ok(nav_selector) = Selector::parse("nav") else {
        return Vec::new();
    };
    let Ok(link_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let html = Html::parse_document(text);
    let navs: Vec<_> = html.select(&nav_selector).collect();
    let toc = navs
        .iter()
        .find(|nav| {
            nav.value().attrs().any(|(key, value)| {
                key.ends_with("type") && value.split_whitespace().any(|v| v == "toc")
            })
        })
        .or_else(|| navs.first());

    let Some(toc) = toc else {
        return Vec::new();
    };
    toc.select(&link_selector)
        .filter_map(|link| {
            let href = link.value().attr("href")?.to_string();
            let text = link.text().collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            Some(((!text.is_empty()).then_some(text), href))
        })
        .collect()
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

fn node_text(node: Node<'_, '_>) -> String {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    text.trim().to_string()
}

/// Resolve hrefs against the directory of the TOC file and drop fragments.
fn resolve_links(
    toc_path: &Path,
    links: Vec<(Option<String>, String)>,
) -> Vec<(Option<String>, PathBuf)> {
    let Ok(base) = Url::from_file_path(toc_path) else {
        return Vec::new();
    };
    links
        .into_iter()
        .filter_map(|(text, href)| {
            let mut url = base.join(&href).ok()?;
            url.set_fragment(None);
            let path = url.to_file_path().ok()?;
            Some((text, path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ncx_reads_nested_points_in_order() {
        let ncx = r#"<?xml version="1.0"?>
<!DOCTYPE ncx PUBLIC "-//NISO//DTD ncx 2005-1//EN" "http://www.daisy.org/z3986/2005/ncx-2005-1.dtd">
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/"><navMap>
  <navPoint id="a"><navLabel><text>One</text></navLabel><content src="one.xhtml"/>
    <navPoint id="b"><navLabel><text>One.1</text></navLabel><content src="one.xhtml#s1"/></navPoint>
  </navPoint>
  <navPoint id="c"><navLabel><text> </text></navLabel><content src="two.xhtml"/></navPoint>
</navMap></ncx>"#;
        let doc = parse_xml(ncx, "toc.ncx").unwrap();
        assert_eq!(
            ncx_links(&doc),
            vec![
                (Some("One".to_string()), "one.xhtml".to_string()),
                (Some("One.1".to_string()), "one.xhtml#s1".to_string()),
                (None, "two.xhtml".to_string()),
            ]
        );
    }

    #[test]
    fn nav_document_prefers_the_toc_nav() {
        let nav = r#"<html xmlns:epub="http://www.idpf.org/2007/ops"><body>
<nav epub:type="landmarks"><a href="cover.xhtml">Cover</a></nav>
<nav epub:type="toc"><ol><li><a href="text/ch1.xhtml">Chapter&nbsp;1</a></li></ol></nav>
</body></html>"#;
        assert_eq!(
            nav_links(nav),
            vec![(Some("Chapter 1".to_string()), "text/ch1.xhtml".to_string())]
        );
    }

    #[test]
    fn hrefs_resolve_against_toc_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let toc = root.join("OEBPS").join("toc.ncx");
        let resolved = resolve_links(
            &toc,
            vec![
                (None, "text/ch%201.xhtml#frag".to_string()),
                (None, "../other.xhtml".to_string()),
            ],
        );
        assert_eq!(resolved[0].1, root.join("OEBPS").join("text").join("ch 1.xhtml"));
        assert_eq!(resolved[1].1, root.join("other.xhtml"));
    }
}
