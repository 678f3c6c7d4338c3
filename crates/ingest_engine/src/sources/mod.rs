//! List-producing sources driven by the batch orchestrator.
mod ebook;
mod feed;
mod read_later;

pub use ebook::{display_title, EbookAdapter};
pub use feed::{FeedAdapter, FeedEntry, ACCEPTED_FEED_STATUSES};
pub use read_later::{
    PocketClient, ReadLaterAdapter, ReadLaterService, SavedArticle, POCKET_API_BASE,
};

use ingest_core::{CandidateEntry, ImportError, ImportRequest, Notifier};

/// What to do with one selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryPlan {
    Import(ImportRequest),
    /// Not imported; the reason is logged, not reported as a failure.
    Skip(String),
}

/// A source of candidate entries plus its per-source state.
///
/// State is only changed through [`SourceAdapter::record_success`] and
/// [`SourceAdapter::finish_batch`], both called by the orchestrator.
#[async_trait::async_trait]
pub trait SourceAdapter: Send {
    type Entry: Send + Sync;

    /// Label shown while the batch runs.
    fn progress_label(&self) -> &str;

    /// Informational message for an empty candidate list.
    fn empty_message(&self) -> String;

    async fn list_candidates(
        &mut self,
        notifier: &dyn Notifier,
    ) -> Result<Vec<CandidateEntry<Self::Entry>>, ImportError>;

    fn plan(&self, entry: &Self::Entry) -> EntryPlan;

    /// Called once per entry whose document was stored.
    async fn record_success(&mut self, entry: &Self::Entry, notifier: &dyn Notifier);

    /// Called after every selected entry has been attempted.
    fn finish_batch(&mut self) {}
}
