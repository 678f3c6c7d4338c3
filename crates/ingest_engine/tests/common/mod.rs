#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ingest_core::{
    DocumentStore, NormalizedDocument, Notifier, ProgressReporter, Selector, Settings, StoreError,
};
use ingest_engine::{
    Collaborators, DocumentFetcher, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher,
    Importer, Sanitizer, Validators,
};

pub const TODAY: &str = "2024-03-01";

/// Serves canned responses by URL; unknown URLs fail as network errors.
#[derive(Default)]
pub struct StubFetcher {
    pages: Mutex<HashMap<String, Result<FetchOutput, FetchError>>>,
    pub feed_requests: Mutex<Vec<Validators>>,
}

impl StubFetcher {
    pub fn page(self, url: &str, html: &str) -> Self {
        self.response(url, 200, html, &[])
    }

    pub fn response(self, url: &str, status: u16, body: &str, headers: &[(&str, &str)]) -> Self {
        let header = |name: &str| {
            headers
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
        };
        let output = FetchOutput {
            bytes: body.as_bytes().to_vec(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                status,
                redirect_count: 0,
                content_type: Some("text/html; charset=utf-8".to_string()),
                etag: header("etag"),
                last_modified: header("last-modified"),
                byte_len: body.len() as u64,
            },
        };
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(output));
        self
    }

    pub fn failure(self, url: &str, kind: FailureKind, message: &str) -> Self {
        self.pages.lock().unwrap().insert(
            url.to_string(),
            Err(FetchError {
                kind,
                message: message.to_string(),
            }),
        );
        self
    }

    fn lookup(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError {
                    kind: FailureKind::Network,
                    message: format!("no route to {url}"),
                })
            })
    }
}

#[async_trait::async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.lookup(url)
    }

    async fn fetch_feed(
        &self,
        url: &str,
        validators: &Validators,
    ) -> Result<FetchOutput, FetchError> {
        self.feed_requests.lock().unwrap().push(validators.clone());
        self.lookup(url)
    }
}

/// Keeps stored documents in memory; media imports return `media:<file name>`.
#[derive(Default)]
pub struct MemoryStore {
    pub documents: Mutex<Vec<NormalizedDocument>>,
    pub media: Mutex<Vec<PathBuf>>,
    pub missing_destination: bool,
}

impl MemoryStore {
    pub fn titles(&self) -> Vec<String> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .map(|doc| doc.title.clone())
            .collect()
    }
}

impl DocumentStore for MemoryStore {
    fn create_document(&self, doc: &NormalizedDocument) -> Result<String, StoreError> {
        if self.missing_destination {
            return Err(StoreError::DestinationMissing("Reading".to_string()));
        }
        self.documents.lock().unwrap().push(doc.clone());
        Ok("Reading".to_string())
    }

    fn import_local_media(&self, path: &Path) -> Result<String, StoreError> {
        self.media.lock().unwrap().push(path.to_path_buf());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(format!("media:{name}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Select(Vec<String>),
    Choose(String),
    Start(String, usize),
    Update(usize),
    Finish,
    Info(String),
    Warn(String),
}

/// Records every collaborator call. Selects all candidates unless told
/// otherwise and picks `choice` for single-choice prompts.
pub struct RecordingUi {
    pub events: Mutex<Vec<UiEvent>>,
    pub selection: Option<Vec<usize>>,
    pub choice: Option<usize>,
}

impl RecordingUi {
    pub fn selecting_all() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            selection: None,
            choice: None,
        }
    }

    pub fn selecting(indices: Vec<usize>) -> Self {
        Self {
            selection: Some(indices),
            ..Self::selecting_all()
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Update(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Warn(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                UiEvent::Info(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Selector for RecordingUi {
    fn select(&self, labels: &[String]) -> Vec<usize> {
        self.push(UiEvent::Select(labels.to_vec()));
        match &self.selection {
            Some(indices) => indices.clone(),
            None => (0..labels.len()).collect(),
        }
    }

    fn choose(&self, prompt: &str, _options: &[String]) -> Option<usize> {
        self.push(UiEvent::Choose(prompt.to_string()));
        self.choice
    }
}

impl ProgressReporter for RecordingUi {
    fn start(&self, label: &str, total: usize) {
        self.push(UiEvent::Start(label.to_string(), total));
    }

    fn update(&self, current: usize) {
        self.push(UiEvent::Update(current));
    }

    fn finish(&self) {
        self.push(UiEvent::Finish);
    }
}

impl Notifier for RecordingUi {
    fn info(&self, message: &str) {
        self.push(UiEvent::Info(message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.push(UiEvent::Warn(message.to_string()));
    }
}

pub fn importer(
    settings: Settings,
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn DocumentStore>,
    ui: Arc<RecordingUi>,
) -> Importer {
    ingest_logging::initialize_for_tests();
    let documents = DocumentFetcher::new(fetcher, Sanitizer::new(&settings.bad_tags));
    let collaborators = Collaborators {
        selector: ui.clone(),
        progress: ui.clone(),
        notifier: ui,
    };
    Importer::new(settings, documents, store, collaborators)
        .with_clock(Arc::new(|| TODAY.to_string()))
}
