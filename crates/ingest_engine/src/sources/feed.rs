use std::sync::Arc;

use ingest_core::{CandidateEntry, FeedState, ImportError, ImportRequest, Notifier, SourceLog};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};

use crate::document::normalize_page_url;
use crate::fetch::Fetcher;
use crate::sources::{EntryPlan, SourceAdapter};
use crate::Validators;

/// Statuses accepted without a warning. Anything else is reported and the
/// returned entries, if any, are still offered.
pub const ACCEPTED_FEED_STATUSES: [u16; 3] = [200, 301, 302];

const NOT_MODIFIED: u16 = 304;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
}

/// RSS/Atom entries not yet imported from one feed URL.
pub struct FeedAdapter {
    url: String,
    fetcher: Arc<dyn Fetcher>,
    state: FeedState,
    /// Validators from the latest response, applied in `finish_batch`.
    latest: Option<Validators>,
}

impl FeedAdapter {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn Fetcher>, state: FeedState) -> Self {
        Self {
            url: url.into(),
            fetcher,
            state,
            latest: None,
        }
    }

    /// Normalize `url` and take its state out of `log`. A URL without a
    /// scheme gets `http://`, and the normalized form is the log key.
    pub fn open(
        url: &str,
        fetcher: Arc<dyn Fetcher>,
        log: &mut SourceLog,
    ) -> Result<Self, ImportError> {
        let url = normalize_page_url(url)?;
        let state = log.take_feed(&url);
        Ok(Self::new(url, fetcher, state))
    }

    /// Put the state back into `log` under the normalized URL.
    pub fn store_into(self, log: &mut SourceLog) {
        log.put_feed(self.url, self.state);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn into_state(self) -> FeedState {
        self.state
    }
}

#[async_trait::async_trait]
impl SourceAdapter for FeedAdapter {
    type Entry = FeedEntry;

    fn progress_label(&self) -> &str {
        "Importing feed entries..."
    }

    fn empty_message(&self) -> String {
        "There are no new items in this feed.".to_string()
    }

    async fn list_candidates(
        &mut self,
        notifier: &dyn Notifier,
    ) -> Result<Vec<CandidateEntry<FeedEntry>>, ImportError> {
        let validators = Validators {
            etag: self.state.etag().map(str::to_string),
            last_modified: self.state.modified().map(str::to_string),
        };
        let output = self.fetcher.fetch_feed(&self.url, &validators).await?;
        let status = output.metadata.status;
        self.latest = Some(Validators {
            etag: output.metadata.etag.clone(),
            last_modified: output.metadata.last_modified.clone(),
        });

        if !ACCEPTED_FEED_STATUSES.contains(&status) {
            let warning = ImportError::UnexpectedFeedStatus(status);
            ingest_warn!("feed {}: {}", self.url, warning);
            notifier.warn(&warning.to_string());
        }
        if status == NOT_MODIFIED || output.bytes.is_empty() {
            ingest_debug!("feed {} returned no body (status {})", self.url, status);
            return Ok(Vec::new());
        }

        let feed = feed_rs::parser::parse(output.bytes.as_slice())
            .map_err(|err| ImportError::Feed(err.to_string()))?;

        let total = feed.entries.len();
        let entries: Vec<_> = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let link = entry.links.first()?.href.clone();
                let title = entry
                    .title
                    .map(|text| text.content.trim().to_string())
                    .filter(|title| !title.is_empty())
                    .unwrap_or_else(|| link.clone());
                Some(FeedEntry { title, link })
            })
            .filter(|entry| !self.state.has_seen(&entry.link))
            .map(|entry| CandidateEntry::new(entry.title.clone(), entry))
            .collect();
        ingest_info!(
            "feed {}: {} of {} entries are new",
            self.url,
            entries.len(),
            total
        );
        Ok(entries)
    }

    fn plan(&self, entry: &FeedEntry) -> EntryPlan {
        EntryPlan::Import(ImportRequest::Remote {
            url: entry.link.clone(),
            title: None,
        })
    }

    async fn record_success(&mut self, entry: &FeedEntry, _notifier: &dyn Notifier) {
        self.state.mark_seen(&entry.link);
    }

    fn finish_batch(&mut self) {
        if let Some(latest) = self.latest.take() {
            self.state.etag = latest.etag.unwrap_or_default();
            self.state.modified = latest.last_modified.unwrap_or_default();
        }
    }
}
