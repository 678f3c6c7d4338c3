//! RON files for the settings snapshot and the per-source import log.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ingest_core::{Settings, SourceLog};
use ingest_logging::{ingest_info, ingest_warn};
use thiserror::Error;

use crate::store::{AtomicFileWriter, PersistError};

pub const SETTINGS_FILENAME: &str = "settings.ron";
pub const SOURCE_LOG_FILENAME: &str = ".ingest_sources.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("invalid settings in {path}: {message}")]
    Parse { path: String, message: String },
}

/// Missing file means defaults; a malformed file is an error.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            ingest_info!("no settings at {:?}, using defaults", path);
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };
    ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Import log persisted next to the store.
#[derive(Debug, Clone)]
pub struct SourceLogStore {
    dir: PathBuf,
}

impl SourceLogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SOURCE_LOG_FILENAME)
    }

    /// Where an unparsable log is moved before starting over.
    pub fn backup_path(&self) -> PathBuf {
        self.dir.join(format!("{SOURCE_LOG_FILENAME}.corrupt"))
    }

    /// An unreadable log is reported and replaced by an empty one. A log
    /// that fails to parse is first moved to [`Self::backup_path`].
    pub fn load(&self) -> SourceLog {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return SourceLog::default(),
            Err(err) => {
                ingest_warn!("Failed to read source log from {:?}: {}", path, err);
                return SourceLog::default();
            }
        };
        match ron::from_str(&content) {
            Ok(log) => {
                ingest_info!("Loaded source log from {:?}", path);
                log
            }
            Err(err) => {
                ingest_warn!("Failed to parse source log from {:?}: {}", path, err);
                let backup = self.backup_path();
                match fs::rename(&path, &backup) {
                    Ok(()) => ingest_warn!("Moved unreadable source log to {:?}", backup),
                    Err(err) => ingest_warn!("Could not move {:?} aside: {}", path, err),
                }
                SourceLog::default()
            }
        }
    }

    pub fn save(&self, log: &SourceLog) -> Result<PathBuf, PersistError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content =
            ron::ser::to_string_pretty(log, pretty).map_err(|err| PersistError::Encode {
                what: "source log",
                message: err.to_string(),
            })?;
        AtomicFileWriter::new(self.dir.clone()).write(SOURCE_LOG_FILENAME, content)
    }
}
