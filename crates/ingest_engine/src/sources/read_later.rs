use std::collections::BTreeMap;
use std::sync::Arc;

use ingest_core::{CandidateEntry, ImportError, ImportRequest, Notifier, PocketCredentials};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use crate::fetch::FetchSettings;
use crate::sources::{EntryPlan, SourceAdapter};

pub const POCKET_API_BASE: &str = "https://getpocket.com/v3";

/// One unread article from the read-later service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArticle {
    pub item_id: String,
    pub url: String,
    /// Title resolved by the service; may be empty.
    pub title: String,
}

/// Read-later account access.
#[async_trait::async_trait]
pub trait ReadLaterService: Send + Sync {
    async fn saved_articles(&self) -> Result<Vec<SavedArticle>, ImportError>;
    async fn archive(&self, article: &SavedArticle) -> Result<(), ImportError>;
}

/// Pocket v3 client using pre-provisioned credentials.
#[derive(Debug, Clone)]
pub struct PocketClient {
    base_url: String,
    credentials: PocketCredentials,
    client: reqwest::Client,
}

impl PocketClient {
    pub fn new(
        credentials: PocketCredentials,
        settings: &FetchSettings,
    ) -> Result<Self, ImportError> {
        Self::with_base_url(POCKET_API_BASE, credentials, settings)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: PocketCredentials,
        settings: &FetchSettings,
    ) -> Result<Self, ImportError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ImportError::Service(err.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            client,
        })
    }

    async fn post(
        &self,
        endpoint: &str,
        payload: serde_json::Value,
    ) -> Result<Vec<u8>, ImportError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let body =
            serde_json::to_vec(&payload).map_err(|err| ImportError::Service(err.to_string()))?;
        let response = self
            .client
            .post(&url)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=UTF-8"),
            )
            .header("X-Accept", HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|err| ImportError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::RemoteStatus {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ImportError::Network(err.to_string()))?;
        ingest_debug!("pocket {} returned {} bytes", endpoint, bytes.len());
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    list: ItemList,
}

/// The service sends `[]` instead of `{}` when nothing is saved.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemList {
    Items(BTreeMap<String, PocketItem>),
    Empty(Vec<serde_json::Value>),
}

impl Default for ItemList {
    fn default() -> Self {
        ItemList::Empty(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct PocketItem {
    item_id: String,
    #[serde(default)]
    given_url: String,
    #[serde(default)]
    resolved_title: String,
    #[serde(default)]
    sort_id: Option<u64>,
}

#[async_trait::async_trait]
impl ReadLaterService for PocketClient {
    async fn saved_articles(&self) -> Result<Vec<SavedArticle>, ImportError> {
        let payload = json!({
            "consumer_key": self.credentials.consumer_key,
            "access_token": self.credentials.access_token,
            "state": "unread",
            "detailType": "simple",
        });
        let bytes = self.post("get", payload).await?;
        let response: GetResponse =
            serde_json::from_slice(&bytes).map_err(|err| ImportError::Service(err.to_string()))?;

        let mut items = match response.list {
            ItemList::Items(items) => items.into_values().collect::<Vec<_>>(),
            ItemList::Empty(_) => Vec::new(),
        };
        items.sort_by_key(|item| item.sort_id.unwrap_or(u64::MAX));
        Ok(items
            .into_iter()
            .filter(|item| !item.given_url.is_empty())
            .map(|item| SavedArticle {
                item_id: item.item_id,
                url: item.given_url,
                title: item.resolved_title,
            })
            .collect())
    }

    async fn archive(&self, article: &SavedArticle) -> Result<(), ImportError> {
        let payload = json!({
            "consumer_key": self.credentials.consumer_key,
            "access_token": self.credentials.access_token,
            "actions": [{ "action": "archive", "item_id": article.item_id }],
        });
        self.post("send", payload).await.map(|_| ())
    }
}

/// Unread read-later articles, optionally archived once imported.
pub struct ReadLaterAdapter {
    service: Arc<dyn ReadLaterService>,
    archive_on_import: bool,
}

impl ReadLaterAdapter {
    pub fn new(service: Arc<dyn ReadLaterService>, archive_on_import: bool) -> Self {
        Self {
            service,
            archive_on_import,
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for ReadLaterAdapter {
    type Entry = SavedArticle;

    fn progress_label(&self) -> &str {
        "Importing Pocket articles..."
    }

    fn empty_message(&self) -> String {
        "There are no unread articles in your reading list.".to_string()
    }

    async fn list_candidates(
        &mut self,
        _notifier: &dyn Notifier,
    ) -> Result<Vec<CandidateEntry<SavedArticle>>, ImportError> {
        let articles = self.service.saved_articles().await?;
        ingest_info!("read-later service offered {} articles", articles.len());
        Ok(articles
            .into_iter()
            .map(|article| {
                let label = if article.title.trim().is_empty() {
                    article.url.clone()
                } else {
                    article.title.clone()
                };
                CandidateEntry::new(label, article)
            })
            .collect())
    }

    fn plan(&self, article: &SavedArticle) -> EntryPlan {
        let title = Some(article.title.trim().to_string()).filter(|title| !title.is_empty());
        EntryPlan::Import(ImportRequest::Remote {
            url: article.url.clone(),
            title,
        })
    }

    async fn record_success(&mut self, article: &SavedArticle, notifier: &dyn Notifier) {
        if !self.archive_on_import {
            return;
        }
        if let Err(err) = self.service.archive(article).await {
            let message = format!("Could not archive {}: {}", article.url, err);
            ingest_warn!("{}", message);
            notifier.warn(&message);
        }
    }
}
