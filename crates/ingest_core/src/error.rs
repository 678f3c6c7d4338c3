use thiserror::Error;

use crate::StoreError;

/// Everything that can go wrong while importing one entry or listing a source.
///
/// None of these abort a batch; the orchestrator turns them into notices.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("There was a problem connecting to the website: {0}")]
    Network(String),
    #[error("The remote server has returned an error: HTTP Error {code} ({reason})")]
    RemoteStatus { code: u16, reason: String },
    #[error("The remote server has returned an unexpected status: {0}")]
    UnexpectedFeedStatus(u16),
    #[error("Destination deck {0:?} no longer exists. Please update your settings.")]
    DestinationMissing(String),
    #[error("{0}")]
    NoContent(String),
    #[error("invalid url {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("Only HTTP requests are supported (got {0:?}).")]
    UnsupportedScheme(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("response too large (max {max_bytes} bytes)")]
    TooLarge { max_bytes: u64 },
    #[error("unsupported content type {0}")]
    UnsupportedContentType(String),
    #[error("cannot read local file {path}: {message}")]
    LocalFile { path: String, message: String },
    #[error("cannot decode page: {0}")]
    Decode(String),
    #[error("cannot parse feed: {0}")]
    Feed(String),
    #[error("cannot read e-book: {0}")]
    Ebook(String),
    #[error("read-later service error: {0}")]
    Service(String),
    #[error("storage error: {0}")]
    Store(String),
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DestinationMissing(deck) => ImportError::DestinationMissing(deck),
            other => ImportError::Store(other.to_string()),
        }
    }
}
