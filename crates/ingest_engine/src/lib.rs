//! Ingest engine: fetching, sanitizing, source adapters, and the batch orchestrator.
mod decode;
mod document;
mod dom;
mod epub;
mod fetch;
mod importer;
mod math;
mod persistence;
mod sanitize;
mod sources;
mod store;
mod types;

pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use document::{normalize_page_url, DocumentFetcher};
pub use dom::{serialize, DomDocument, DomNode, ElementNode};
pub use epub::{extract_epub, EpubError, ExtractedEpub, TocEntry};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use importer::{Clock, Collaborators, Importer};
pub use math::{detect_math_usage, normalize_delimiters, MathDetection};
pub use persistence::{
    load_settings, ConfigError, SourceLogStore, SETTINGS_FILENAME, SOURCE_LOG_FILENAME,
};
pub use sanitize::{CleanedPage, Sanitizer};
pub use sources::{
    display_title, EbookAdapter, EntryPlan, FeedAdapter, FeedEntry, PocketClient,
    ReadLaterAdapter, ReadLaterService, SavedArticle, SourceAdapter, ACCEPTED_FEED_STATUSES,
    POCKET_API_BASE,
};
pub use store::{
    build_record, ensure_dir, record_filename, AtomicFileWriter, DirectoryStore, PersistError,
    DEFAULT_DECK, MEDIA_DIR,
};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput, Validators};
