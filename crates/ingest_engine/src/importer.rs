use std::path::Path;
use std::sync::Arc;

use ingest_core::{
    format_citation, remote_link, select_candidates, title_tag, BatchOutcome, BatchTally,
    DocumentStore, ImportError, ImportRequest, NormalizedDocument, Notifier, ProgressReporter,
    Selector, Settings,
};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};

use crate::document::{normalize_page_url, DocumentFetcher};
use crate::sanitize::CleanedPage;
use crate::sources::{EntryPlan, SourceAdapter};

/// Returns today's date as it appears in source citations.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// User-facing collaborators; none of them return errors.
#[derive(Clone)]
pub struct Collaborators {
    pub selector: Arc<dyn Selector>,
    pub progress: Arc<dyn ProgressReporter>,
    pub notifier: Arc<dyn Notifier>,
}

/// Runs single-document imports and whole batches against one settings snapshot.
pub struct Importer {
    settings: Settings,
    documents: DocumentFetcher,
    store: Arc<dyn DocumentStore>,
    ui: Collaborators,
    today: Clock,
}

impl Importer {
    pub fn new(
        settings: Settings,
        documents: DocumentFetcher,
        store: Arc<dyn DocumentStore>,
        ui: Collaborators,
    ) -> Self {
        Self {
            settings,
            documents,
            store,
            ui,
            today: Arc::new(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
        }
    }

    pub fn with_clock(mut self, today: Clock) -> Self {
        self.today = today;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// List, select, import sequentially, finalize, summarize.
    ///
    /// Per-entry failures are reported as warnings and never stop the loop.
    pub async fn run_batch<A: SourceAdapter>(
        &self,
        adapter: &mut A,
        priority: Option<String>,
    ) -> BatchOutcome {
        let notifier = self.ui.notifier.as_ref();
        let candidates = match adapter.list_candidates(notifier).await {
            Ok(candidates) => candidates,
            Err(err) => {
                ingest_warn!("listing candidates failed: {}", err);
                notifier.warn(&err.to_string());
                return BatchOutcome::SourceUnavailable(err);
            }
        };
        if candidates.is_empty() {
            let message = adapter.empty_message();
            notifier.info(&message);
            return BatchOutcome::NothingToImport(message);
        }

        let selected = select_candidates(self.ui.selector.as_ref(), candidates);
        if selected.is_empty() {
            ingest_debug!("selection cancelled");
            return BatchOutcome::Cancelled;
        }

        let priority = match priority {
            Some(priority) => Some(priority),
            None => self.prompt_priority(None),
        };

        let progress = self.ui.progress.as_ref();
        progress.start(adapter.progress_label(), selected.len());
        let mut tally = BatchTally::new();
        for entry in &selected {
            let position = match adapter.plan(&entry.payload) {
                EntryPlan::Skip(reason) => {
                    ingest_info!("{}", reason);
                    tally.record_skip()
                }
                EntryPlan::Import(request) => {
                    let result = self.import_request(&request, priority.clone()).await;
                    match &result {
                        Ok(_) => adapter.record_success(&entry.payload, notifier).await,
                        Err(err) => {
                            ingest_warn!("import of {:?} failed: {}", entry.label, err);
                            notifier.warn(&err.to_string());
                        }
                    }
                    tally.record(&entry.label, result)
                }
            };
            progress.update(position);
        }
        adapter.finish_batch();
        progress.finish();

        let summary = tally.finish();
        notifier.info(&format!(
            "Added {} item(s) to deck: {}",
            summary.imported,
            summary.last_destination.as_deref().unwrap_or("-")
        ));
        BatchOutcome::Completed(summary)
    }

    /// Import one page. A blank `url` is a silent no-op; failures are
    /// reported as a warning and returned.
    ///
    /// When priorities are enabled and none is given, the prompt names the
    /// page title, so it happens after the page is fetched.
    pub async fn import_webpage(
        &self,
        url: &str,
        priority: Option<String>,
        title: Option<String>,
    ) -> Result<Option<String>, ImportError> {
        if url.trim().is_empty() {
            return Ok(None);
        }
        let result = self.import_single_webpage(url, priority, title).await;
        match &result {
            Ok(deck) => self.ui.notifier.info(&format!("Added to deck: {deck}")),
            Err(err) => self.ui.notifier.warn(&err.to_string()),
        }
        result.map(Some)
    }

    async fn import_single_webpage(
        &self,
        url: &str,
        priority: Option<String>,
        title: Option<String>,
    ) -> Result<String, ImportError> {
        let (url, title, page) = self.fetch_titled_page(url, title).await?;
        let priority = match priority {
            Some(priority) => Some(priority),
            None => self.prompt_priority(Some(&title)),
        };
        self.persist_remote(&url, title, page, priority)
    }

    /// Import one local HTML file. `front` becomes the document title, `title`
    /// the citation text and tag.
    pub fn import_local_file(
        &self,
        path: &Path,
        priority: Option<String>,
        front: Option<String>,
        title: &str,
    ) -> Result<String, ImportError> {
        let page = self.documents.fetch_local(path, self.store.as_ref())?;
        let front = front
            .filter(|front| !front.trim().is_empty())
            .or_else(|| page.title())
            .unwrap_or_else(|| path.display().to_string());
        let tags = Some(title_tag(title))
            .filter(|tag| !tag.is_empty())
            .into_iter()
            .collect();
        let doc = NormalizedDocument {
            title: front,
            body: page.body,
            source_citation: format_citation(&self.settings.source_format, &(self.today)(), title),
            priority,
            tags,
        };
        Ok(self.store.create_document(&doc)?)
    }

    async fn import_request(
        &self,
        request: &ImportRequest,
        priority: Option<String>,
    ) -> Result<String, ImportError> {
        match request {
            ImportRequest::Remote { url, title } => {
                let (url, title, page) = self.fetch_titled_page(url, title.clone()).await?;
                self.persist_remote(&url, title, page, priority)
            }
            ImportRequest::Local { path, front, title } => {
                self.import_local_file(path, priority, Some(front.clone()), title)
            }
        }
    }

    /// The explicit title wins, then the page `<title>`, then the URL.
    async fn fetch_titled_page(
        &self,
        url: &str,
        title: Option<String>,
    ) -> Result<(String, String, CleanedPage), ImportError> {
        let url = normalize_page_url(url)?;
        let page = self.documents.fetch_remote(&url).await?;
        let title = title
            .filter(|title| !title.trim().is_empty())
            .or_else(|| page.title())
            .unwrap_or_else(|| url.clone());
        Ok((url, title, page))
    }

    fn persist_remote(
        &self,
        url: &str,
        title: String,
        page: CleanedPage,
        priority: Option<String>,
    ) -> Result<String, ImportError> {
        let doc = NormalizedDocument {
            title,
            body: page.body,
            source_citation: format_citation(
                &self.settings.source_format,
                &(self.today)(),
                &remote_link(url),
            ),
            priority,
            tags: Vec::new(),
        };
        Ok(self.store.create_document(&doc)?)
    }

    /// `None` when priorities are disabled or the prompt is dismissed.
    fn prompt_priority(&self, name: Option<&str>) -> Option<String> {
        if !self.settings.prio_enabled || self.settings.priorities.is_empty() {
            return None;
        }
        let prompt = match name {
            Some(name) => format!("Select priority for <b>{name}</b>"),
            None => "Select priority for import".to_string(),
        };
        let choice = self.ui.selector.choose(&prompt, &self.settings.priorities)?;
        self.settings.priorities.get(choice).cloned()
    }
}
