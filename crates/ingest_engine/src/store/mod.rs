//! Directory-backed document store.
//!
//! Layout under the root:
//! - `<deck>/<title>--<hash>.md`: one record per imported document
//! - `collection.media/`: local images and stylesheets copied from imported files
mod filename;
mod frontmatter;
mod persist;

pub use filename::record_filename;
use filename::{disambiguated_media_name, media_name};
pub use frontmatter::build_record;
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};

use std::fs;
use std::path::{Path, PathBuf};

use ingest_core::{DocumentStore, FieldNames, NormalizedDocument, Settings, StoreError};
use ingest_logging::{ingest_debug, ingest_info};

pub const DEFAULT_DECK: &str = "Default";
pub const MEDIA_DIR: &str = "collection.media";

#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    deck: Option<String>,
    fields: FieldNames,
}

impl DirectoryStore {
    /// A configured deck must already exist below `root`; without one,
    /// records go to [`DEFAULT_DECK`], created on demand.
    pub fn new(root: impl Into<PathBuf>, settings: &Settings) -> Self {
        Self {
            root: root.into(),
            deck: settings
                .import_deck
                .clone()
                .filter(|deck| !deck.trim().is_empty()),
            fields: settings.fields.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn media_dir(&self) -> PathBuf {
        self.root.join(MEDIA_DIR)
    }

    fn destination(&self) -> Result<(String, PathBuf), StoreError> {
        match &self.deck {
            Some(deck) => {
                let dir = self.root.join(deck);
                if !dir.is_dir() {
                    return Err(StoreError::DestinationMissing(deck.clone()));
                }
                Ok((deck.clone(), dir))
            }
            None => {
                let dir = self.root.join(DEFAULT_DECK);
                ensure_dir(&dir).map_err(|err| StoreError::Io(err.to_string()))?;
                Ok((DEFAULT_DECK.to_string(), dir))
            }
        }
    }
}

impl DocumentStore for DirectoryStore {
    fn create_document(&self, doc: &NormalizedDocument) -> Result<String, StoreError> {
        let (deck, dir) = self.destination()?;
        let key = format!("{}\n{}", doc.source_citation, doc.body);
        let filename = record_filename(&doc.title, &key);
        let record = build_record(&self.fields, doc);
        let path = AtomicFileWriter::new(dir)
            .write(&filename, record)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        ingest_info!("stored {:?} at {}", doc.title, path.display());
        Ok(deck)
    }

    fn import_local_media(&self, path: &Path) -> Result<String, StoreError> {
        let media_err = |message: String| StoreError::Media {
            path: path.display().to_string(),
            message,
        };
        let bytes = fs::read(path).map_err(|err| media_err(err.to_string()))?;
        let dir = self.media_dir();

        let mut name = media_name(path);
        let existing = dir.join(&name);
        if existing.exists() {
            if fs::read(&existing).is_ok_and(|current| current == bytes) {
                ingest_debug!("media {} already present", name);
                return Ok(name);
            }
            name = disambiguated_media_name(path, &bytes);
            if dir.join(&name).exists() {
                return Ok(name);
            }
        }

        AtomicFileWriter::new(dir)
            .write(&name, &bytes)
            .map_err(|err| media_err(err.to_string()))?;
        Ok(name)
    }
}
