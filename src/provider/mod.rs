//! Provider capability contract and the built-in sinks.
//!
//! Every provider, concrete sinks and the composite alike, implements
//! [`LoggingProvider`]. The trait's provided `log` method enforces the
//! severity threshold and the fallback-on-failure behavior uniformly, so
//! implementations only supply the sink-specific `write` operation.

pub mod composite;
pub mod console;
pub mod error;
pub mod file;
pub mod memory;

pub use composite::CompositeLoggingProvider;
pub use console::{ConsoleLoggingProvider, ConsoleStream};
pub use error::{AggregateError, ChildFailure, UninitializedError, WriteError};
pub use file::FileLoggingProvider;
pub use memory::MemoryLoggingProvider;

use crate::config::{AttributeBag, ConfigError, LoggingProviderCollection};
use crate::domain::{ExceptionInfo, LogEntry, Severity};
use std::sync::{Arc, OnceLock};

/// Shared handle to a configured provider.
///
/// Providers are registered once and then shared: the composite holds its
/// children for fan-out but never owns their lifetimes.
pub type SharedProvider = Arc<dyn LoggingProvider>;

/// Capability contract implemented by every logging provider.
pub trait LoggingProvider: Send + Sync + std::fmt::Debug {
    /// Unique name of this provider within a registry.
    fn name(&self) -> &str;

    /// Human-readable description from configuration.
    fn description(&self) -> &str;

    /// Minimum severity this provider acts on.
    fn threshold(&self) -> Severity;

    /// Provider consulted when `write` fails, if any.
    fn fallback(&self) -> Option<SharedProvider>;

    /// Provider-specific write operation.
    fn write(&self, entry: &LogEntry) -> Result<(), WriteError>;

    /// Names of providers this instance still has to resolve during
    /// completion: the fallback reference and, for composites, the
    /// referenced children. Feeds the resolver's reference graph.
    fn referenced_names(&self) -> Vec<String>;

    /// Second initialization phase: resolve recorded names against the
    /// registry of all configured providers. Runs once, after every
    /// provider in the configuration has been constructed.
    fn complete_initialization(
        &self,
        registry: &LoggingProviderCollection,
        default_provider: &SharedProvider,
    ) -> Result<(), ConfigError>;

    /// Log an entry, honoring the threshold and fallback contract.
    ///
    /// Entries below the threshold succeed without touching the sink. On
    /// a write failure the entry is re-dispatched exactly once to the
    /// fallback provider; if that also fails, or no fallback is
    /// configured, the original failure is returned.
    fn log(&self, entry: &LogEntry) -> Result<(), WriteError> {
        if entry.severity() < self.threshold() {
            return Ok(());
        }
        match self.write(entry) {
            Ok(()) => Ok(()),
            Err(primary) => {
                if let Some(fallback) = self.fallback() {
                    tracing::warn!(
                        provider = self.name(),
                        fallback = fallback.name(),
                        error = %primary,
                        "write failed, redirecting entry to fallback provider"
                    );
                    if fallback.log(entry).is_ok() {
                        return Ok(());
                    }
                }
                Err(primary)
            }
        }
    }

    /// Log a plain message at `Severity::Information`.
    fn log_message(&self, message: &str) -> Result<(), WriteError> {
        self.log(&LogEntry::new(Severity::Information, message, None, None))
    }

    /// Log a message at an explicit severity, with an optional source.
    fn log_event(
        &self,
        severity: Severity,
        message: &str,
        source: Option<&str>,
    ) -> Result<(), WriteError> {
        self.log(&LogEntry::new(
            severity,
            message,
            None,
            source.map(str::to_owned),
        ))
    }

    /// Log a structured error at `Severity::Error`.
    fn log_exception(&self, exception: &ExceptionInfo) -> Result<(), WriteError> {
        self.log(&LogEntry::new(
            Severity::Error,
            exception.message.clone(),
            Some(exception.clone()),
            None,
        ))
    }
}

/// Settings shared by every provider implementation: identity, threshold,
/// and the fallback reference in both its pending (name) and resolved
/// forms.
#[derive(Debug)]
pub struct ProviderCore {
    name: String,
    description: String,
    threshold: Severity,
    pending_fallback: Option<String>,
    fallback: OnceLock<SharedProvider>,
}

impl ProviderCore {
    /// Core for a directly constructed provider; no completion step
    /// needed for the fallback reference.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        threshold: Severity,
        fallback: Option<SharedProvider>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            threshold,
            pending_fallback: None,
            fallback: match fallback {
                Some(provider) => OnceLock::from(provider),
                None => OnceLock::new(),
            },
        }
    }

    /// Core parsed from a declarative attribute bag. Consumes the common
    /// `description`, `threshold` and `fallbackProvider` attributes;
    /// kind-specific attributes stay in the bag for the caller.
    pub fn from_attributes(
        kind: &'static str,
        name: &str,
        default_description: &str,
        attributes: &mut AttributeBag,
    ) -> Result<Self, ConfigError> {
        let description = attributes
            .take("description")
            .unwrap_or_else(|| default_description.to_string());

        let threshold = match attributes.take("threshold") {
            Some(value) => {
                value
                    .parse::<Severity>()
                    .map_err(|err| ConfigError::InvalidAttribute {
                        kind,
                        name: name.to_string(),
                        attribute: "threshold".to_string(),
                        value: value.clone(),
                        reason: err.to_string(),
                    })?
            }
            None => Severity::Debug,
        };

        Ok(Self {
            name: name.to_string(),
            description,
            threshold,
            pending_fallback: attributes.take("fallbackProvider"),
            fallback: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn fallback(&self) -> Option<SharedProvider> {
        self.fallback.get().cloned()
    }

    /// Names still unresolved on this core (the pending fallback, if any).
    pub fn referenced_names(&self) -> Vec<String> {
        self.pending_fallback.iter().cloned().collect()
    }

    /// Resolve the pending fallback reference against the registry.
    pub fn resolve_fallback(
        &self,
        kind: &'static str,
        registry: &LoggingProviderCollection,
    ) -> Result<(), ConfigError> {
        let Some(referenced) = &self.pending_fallback else {
            return Ok(());
        };
        let provider =
            registry
                .get(referenced)
                .ok_or_else(|| ConfigError::MissingReference {
                    kind,
                    name: self.name.clone(),
                    referenced: referenced.clone(),
                })?;
        // Completion runs once before logging starts; a repeated
        // resolution attempt leaves the first reference in place.
        let _ = self.fallback.set(provider);
        Ok(())
    }
}
