use std::fs;
use std::path::Path;
use std::sync::Arc;

use ingest_core::{DocumentStore, ImportError, RawDocument};
use ingest_logging::ingest_debug;
use url::Url;

use crate::decode::decode_html;
use crate::fetch::Fetcher;
use crate::sanitize::{CleanedPage, Sanitizer};

/// Retrieves raw HTML from the network or disk and hands it to the sanitizer.
#[derive(Clone)]
pub struct DocumentFetcher {
    fetcher: Arc<dyn Fetcher>,
    sanitizer: Sanitizer,
}

impl DocumentFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher>, sanitizer: Sanitizer) -> Self {
        Self { fetcher, sanitizer }
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    /// Relative references resolve against the final URL after redirects.
    pub async fn fetch_remote(&self, url: &str) -> Result<CleanedPage, ImportError> {
        let output = self.fetcher.fetch(url).await?;
        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref())
            .map_err(|err| ImportError::Decode(err.to_string()))?;
        ingest_debug!(
            "decoded {} as {} ({} bytes)",
            output.metadata.final_url,
            decoded.encoding_label,
            output.metadata.byte_len
        );
        let base_url =
            Url::parse(&output.metadata.final_url).map_err(|err| ImportError::InvalidUrl {
                url: output.metadata.final_url.clone(),
                message: err.to_string(),
            })?;
        Ok(self
            .sanitizer
            .clean(&RawDocument::remote(decoded.html, base_url), None))
    }

    /// Reads a UTF-8 file; `media` receives the local images and stylesheets it references.
    pub fn fetch_local(
        &self,
        path: &Path,
        media: &dyn DocumentStore,
    ) -> Result<CleanedPage, ImportError> {
        let local_err = |message: String| ImportError::LocalFile {
            path: path.display().to_string(),
            message,
        };
        let absolute = fs::canonicalize(path).map_err(|err| local_err(err.to_string()))?;
        if !absolute.is_file() {
            return Err(local_err("not a file".to_string()));
        }
        let html = fs::read_to_string(&absolute).map_err(|err| local_err(err.to_string()))?;
        let base_url = Url::from_file_path(&absolute)
            .map_err(|_| local_err("cannot build a file URL".to_string()))?;
        Ok(self
            .sanitizer
            .clean(&RawDocument::local(html, base_url), Some(media)))
    }
}

/// Prefix a bare host with `http://`; refuse schemes other than http(s).
pub fn normalize_page_url(input: &str) -> Result<String, ImportError> {
    let input = input.trim();
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url.to_string()),
        Ok(url) => Err(ImportError::UnsupportedScheme(url.scheme().to_string())),
        Err(url::ParseError::RelativeUrlWithoutBase) => with_http_prefix(input),
        Err(err) => Err(ImportError::InvalidUrl {
            url: input.to_string(),
            message: err.to_string(),
        }),
    }
}

fn with_http_prefix(input: &str) -> Result<String, ImportError> {
    let prefixed = format!("http://{input}");
    Url::parse(&prefixed)
        .map(|url| url.to_string())
        .map_err(|err| ImportError::InvalidUrl {
            url: input.to_string(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_http() {
        assert_eq!(
            normalize_page_url("example.com/a").unwrap(),
            "http://example.com/a"
        );
        assert_eq!(
            normalize_page_url("https://example.com/a").unwrap(),
            "https://example.com/a"
        );
    }

    #[test]
    fn other_schemes_are_refused() {
        assert_eq!(
            normalize_page_url("ftp://example.com/file").unwrap_err(),
            ImportError::UnsupportedScheme("ftp".to_string())
        );
    }
}
