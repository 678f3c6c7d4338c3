use std::path::Path;

use thiserror::Error;

use crate::NormalizedDocument;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("destination {0:?} does not exist")]
    DestinationMissing(String),
    #[error("media file {path} could not be imported: {message}")]
    Media { path: String, message: String },
    #[error("io error: {0}")]
    Io(String),
}

/// Persists normalized documents and local media.
pub trait DocumentStore: Send + Sync {
    /// Store a document and return the name of the destination it landed in.
    fn create_document(&self, doc: &NormalizedDocument) -> Result<String, StoreError>;

    /// Copy a local file into managed media and return the reference to use in `src`/`href`.
    fn import_local_media(&self, path: &Path) -> Result<String, StoreError>;
}

/// Multi-select and single-choice prompts. The core never builds widgets.
pub trait Selector: Send + Sync {
    /// Returns the indices of the chosen labels, in any order. Empty means cancelled.
    fn select(&self, labels: &[String]) -> Vec<usize>;

    /// Pick one option; `None` when the prompt is dismissed.
    fn choose(&self, prompt: &str, options: &[String]) -> Option<usize>;
}

/// Purely observational progress sink.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, label: &str, total: usize);
    fn update(&self, current: usize);
    fn finish(&self);
}

/// Non-blocking user notices.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}
