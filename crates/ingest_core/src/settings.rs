use serde::{Deserialize, Serialize};

/// Read-only settings snapshot passed into each component.
///
/// Every field has a default so a partial settings file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    /// Elements removed together with their descendants before rewriting.
    pub bad_tags: Vec<String>,
    /// Destination deck; `None` means the store's current/default deck.
    pub import_deck: Option<String>,
    pub fields: FieldNames,
    /// Citation template; `{date}` and `{url}` are substituted.
    pub source_format: String,
    pub prio_enabled: bool,
    /// Ordered priority labels offered when `prio_enabled` is set.
    pub priorities: Vec<String>,
    /// Archive read-later articles after a successful import.
    pub pocket_archive: bool,
    pub pocket: Option<PocketCredentials>,
    pub fetch: FetchLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: format!("ingest/{}", env!("CARGO_PKG_VERSION")),
            bad_tags: vec!["iframe".to_string(), "script".to_string()],
            import_deck: None,
            fields: FieldNames::default(),
            source_format: "{url} ({date})".to_string(),
            prio_enabled: false,
            priorities: ["Very high", "High", "Medium", "Low", "Very low"]
                .iter()
                .map(|label| label.to_string())
                .collect(),
            pocket_archive: true,
            pocket: None,
            fetch: FetchLimits::default(),
        }
    }
}

/// Names under which the store records each part of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub title: String,
    pub text: String,
    pub source: String,
    pub priority: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            text: "Text".to_string(),
            source: "Source".to_string(),
            priority: "Priority".to_string(),
        }
    }
}

/// Pre-provisioned read-later credentials. Obtaining them is not handled here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketCredentials {
    pub consumer_key: String,
    pub access_token: String,
}

/// Transport limits for page and feed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchLimits {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
        }
    }
}
