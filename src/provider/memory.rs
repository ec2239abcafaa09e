//! In-memory sink. Keeps accepted entries in a buffer for later
//! inspection; the primary test double for composition scenarios.

use super::{LoggingProvider, ProviderCore, SharedProvider, WriteError};
use crate::config::{AttributeBag, ConfigError, LoggingProviderCollection};
use crate::domain::{LogEntry, Severity};
use parking_lot::Mutex;

const KIND: &str = "MemoryLoggingProvider";
const DEFAULT_DESCRIPTION: &str = "Memory logging provider";

#[derive(Debug)]
pub struct MemoryLoggingProvider {
    core: ProviderCore,
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLoggingProvider {
    /// Provider named `name` that accepts every severity.
    pub fn new(name: &str) -> Self {
        Self::with_threshold(name, Severity::Debug)
    }

    pub fn with_threshold(name: &str, threshold: Severity) -> Self {
        Self {
            core: ProviderCore::new(name, DEFAULT_DESCRIPTION, threshold, None),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn from_attributes(name: &str, mut attributes: AttributeBag) -> Result<Self, ConfigError> {
        let core = ProviderCore::from_attributes(KIND, name, DEFAULT_DESCRIPTION, &mut attributes)?;
        attributes.finish(KIND, name)?;
        Ok(Self {
            core,
            entries: Mutex::new(Vec::new()),
        })
    }

    /// Snapshot of everything logged so far.
    pub fn logged_entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl LoggingProvider for MemoryLoggingProvider {
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
        self.entries.lock().push(entry.clone());
        Ok(())
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
