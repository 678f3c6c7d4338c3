use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ingest_core::{CandidateEntry, ImportError, ImportRequest, Notifier};
use ingest_logging::ingest_info;

use crate::epub::{extract_epub, ExtractedEpub, TocEntry};
use crate::sources::{EntryPlan, SourceAdapter};

const UNKNOWN: &str = "Unknown";

/// `"<chapter> -- <book> by <author>"`, with `Unknown` for missing parts.
pub fn display_title(entry: &TocEntry) -> String {
    let part = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };
    format!(
        "{} -- {} by {}",
        part(&entry.text),
        part(&entry.book_title),
        part(&entry.author)
    )
}

/// Chapters of one unpacked e-book.
///
/// Several TOC entries often point at the same file; only the first selected
/// one is imported per batch.
pub struct EbookAdapter {
    source: PathBuf,
    book: ExtractedEpub,
    imported: HashSet<PathBuf>,
}

impl EbookAdapter {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let book = extract_epub(path).map_err(|err| ImportError::Ebook(err.to_string()))?;
        ingest_info!(
            "opened {} ({:?} by {:?}, {} toc entries)",
            path.display(),
            book.title,
            book.author,
            book.entries.len()
        );
        Ok(Self {
            source: path.to_path_buf(),
            book,
            imported: HashSet::new(),
        })
    }

    pub fn book(&self) -> &ExtractedEpub {
        &self.book
    }
}

#[async_trait::async_trait]
impl SourceAdapter for EbookAdapter {
    type Entry = TocEntry;

    fn progress_label(&self) -> &str {
        "Importing Epub articles..."
    }

    fn empty_message(&self) -> String {
        format!("No articles found in {}.", self.source.display())
    }

    async fn list_candidates(
        &mut self,
        _notifier: &dyn Notifier,
    ) -> Result<Vec<CandidateEntry<TocEntry>>, ImportError> {
        self.imported.clear();
        Ok(self
            .book
            .entries
            .iter()
            .map(|entry| {
                let label = entry.text.clone().unwrap_or_else(|| UNKNOWN.to_string());
                CandidateEntry::new(label, entry.clone())
            })
            .collect())
    }

    fn plan(&self, entry: &TocEntry) -> EntryPlan {
        if self.imported.contains(&entry.href) {
            return EntryPlan::Skip(format!(
                "{} already imported, skipping",
                entry.href.display()
            ));
        }
        let book_title = entry
            .book_title
            .clone()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        EntryPlan::Import(ImportRequest::Local {
            path: entry.href.clone(),
            front: display_title(entry),
            title: book_title,
        })
    }

    async fn record_success(&mut self, entry: &TocEntry, _notifier: &dyn Notifier) {
        self.imported.insert(entry.href.clone());
    }
}
