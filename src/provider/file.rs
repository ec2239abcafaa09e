//! Append-only NDJSON file sink.
//!
//! Entries are serialized with serde_json, one object per line, and
//! flushed after every write so an acknowledged entry survives a crash.
//! The file is opened at construction, so a bad path surfaces as a
//! configuration error instead of a log-time failure.

use super::{LoggingProvider, ProviderCore, SharedProvider, WriteError};
use crate::config::{AttributeBag, ConfigError, LoggingProviderCollection};
use crate::domain::{LogEntry, Severity};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const KIND: &str = "FileLoggingProvider";
const DEFAULT_DESCRIPTION: &str = "File logging provider";

pub struct FileLoggingProvider {
    core: ProviderCore,
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl std::fmt::Debug for FileLoggingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLoggingProvider")
            .field("name", &self.core.name())
            .field("path", &self.path)
            .finish()
    }
}

impl FileLoggingProvider {
    /// Open (creating if needed) the log file in append mode.
    pub fn new(
        name: &str,
        threshold: Severity,
        path: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let core = ProviderCore::new(name, DEFAULT_DESCRIPTION, threshold, None);
        Self::open(core, path.as_ref())
    }

    pub fn from_attributes(name: &str, mut attributes: AttributeBag) -> Result<Self, ConfigError> {
        let core = ProviderCore::from_attributes(KIND, name, DEFAULT_DESCRIPTION, &mut attributes)?;
        let path = attributes
            .take("path")
            .ok_or_else(|| ConfigError::MissingAttribute {
                kind: KIND,
                name: name.to_string(),
                attribute: "path".to_string(),
            })?;
        attributes.finish(KIND, name)?;
        Self::open(core, Path::new(&path))
    }

    fn open(core: ProviderCore, path: &Path) -> Result<Self, ConfigError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            core,
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LoggingProvider for FileLoggingProvider {
    fn name(&self) -> &str {
        self.core.name()
    }

    fn description(&self) -> &str {
        self.core.description()
    }

    fn threshold(&self) -> Severity {
        self.core.threshold()
    }

    fn fallback(&self) -> Option<SharedProvider> {
        self.core.fallback()
    }

    fn write(&self, entry: &LogEntry) -> Result<(), WriteError> {
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, entry).map_err(|source| {
            WriteError::Serialization {
                provider: self.core.name().to_string(),
                source,
            }
        })?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|source| WriteError::Io {
                provider: self.core.name().to_string(),
                source,
            })
    }

    fn referenced_names(&self) -> Vec<String> {
        self.core.referenced_names()
    }

    fn complete_initialization(
        &self,
        registry: &LoggingProviderCollection,
        _default_provider: &SharedProvider,
    ) -> Result<(), ConfigError> {
        self.core.resolve_fallback(KIND, registry)
    }
}
