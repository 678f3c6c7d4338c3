use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Revalidation and dedup bookkeeping for one feed URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedState {
    /// Links already imported, in import order. Each link appears once.
    pub downloaded: Vec<String>,
    pub etag: String,
    pub modified: String,
}

impl FeedState {
    pub fn has_seen(&self, link: &str) -> bool {
        self.downloaded.iter().any(|seen| seen == link)
    }

    /// Records a link; returns false if it was already present.
    pub fn mark_seen(&mut self, link: &str) -> bool {
        if self.has_seen(link) {
            return false;
        }
        self.downloaded.push(link.to_string());
        true
    }

    pub fn etag(&self) -> Option<&str> {
        Some(self.etag.as_str()).filter(|v| !v.is_empty())
    }

    pub fn modified(&self) -> Option<&str> {
        Some(self.modified.as_str()).filter(|v| !v.is_empty())
    }
}

/// Source state that survives across batches.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLog {
    pub feeds: BTreeMap<String, FeedState>,
}

impl SourceLog {
    pub fn feed(&self, url: &str) -> Option<&FeedState> {
        self.feeds.get(url)
    }

    /// Removes and returns the state for `url`, or a fresh one.
    pub fn take_feed(&mut self, url: &str) -> FeedState {
        self.feeds.remove(url).unwrap_or_default()
    }

    pub fn put_feed(&mut self, url: impl Into<String>, state: FeedState) {
        self.feeds.insert(url.into(), state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_seen_keeps_links_unique_and_ordered() {
        let mut state = FeedState::default();
        assert!(state.mark_seen("https://a/1"));
        assert!(state.mark_seen("https://a/2"));
        assert!(!state.mark_seen("https://a/1"));
        assert_eq!(state.downloaded, vec!["https://a/1", "https://a/2"]);
    }

    #[test]
    fn empty_validators_read_as_absent() {
        let state = FeedState::default();
        assert_eq!(state.etag(), None);
        assert_eq!(state.modified(), None);
    }

    #[test]
    fn take_feed_defaults_for_unknown_url() {
        let mut log = SourceLog::default();
        log.put_feed(
            "https://known/feed",
            FeedState {
                etag: "\"v1\"".into(),
                ..FeedState::default()
            },
        );
        assert_eq!(log.take_feed("https://other/feed"), FeedState::default());
        assert_eq!(log.take_feed("https://known/feed").etag, "\"v1\"");
        assert!(log.feed("https://known/feed").is_none());
    }
}
