use std::path::PathBuf;

use url::Url;

/// HTML as handed over by a fetcher, before sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub html: String,
    pub base_url: Url,
    pub is_local: bool,
}

impl RawDocument {
    pub fn remote(html: impl Into<String>, base_url: Url) -> Self {
        Self {
            html: html.into(),
            base_url,
            is_local: false,
        }
    }

    pub fn local(html: impl Into<String>, base_url: Url) -> Self {
        Self {
            html: html.into(),
            base_url,
            is_local: true,
        }
    }
}

/// The unit handed to the document store. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub title: String,
    pub body: String,
    pub source_citation: String,
    pub priority: Option<String>,
    pub tags: Vec<String>,
}

/// What a source adapter asks the orchestrator to import for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRequest {
    Remote {
        url: String,
        /// Overrides the page `<title>` when present.
        title: Option<String>,
    },
    Local {
        path: PathBuf,
        /// Display title of the stored document.
        front: String,
        /// Used for the source citation and the tag.
        title: String,
    },
}
