//! Fans a single log entry out to an ordered list of child providers.

use super::error::{AggregateError, ChildFailure, UninitializedError, WriteError};
use super::{LoggingProvider, ProviderCore, SharedProvider};
use crate::config::{AttributeBag, ConfigError, LoggingProviderCollection};
use crate::domain::{LogEntry, Severity};
use regex::Regex;
use std::sync::{Arc, OnceLock};

const KIND: &str = "CompositeLoggingProvider";
const DEFAULT_DESCRIPTION: &str = "Composite logging provider";

fn provider_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^provider([0-9]+)$").expect("provider key pattern compiles"))
}

/// A provider that dispatches every log entry to all of its children and
/// aggregates their failures.
///
/// Two construction paths exist: direct construction from live child
/// providers, usable immediately, and declarative construction from an
/// attribute map, which records child *names* and stays pending until
/// [`complete_initialization`](LoggingProvider::complete_initialization)
/// resolves them against the registry.
#[derive(Debug)]
pub struct CompositeLoggingProvider {
    core: ProviderCore,
    /// Referenced child names in ascending provider<N> order; empty for
    /// directly constructed instances.
    pending: Vec<String>,
    children: OnceLock<Vec<SharedProvider>>,
}

impl CompositeLoggingProvider {
    /// Directly construct a completed composite from live child
    /// providers.
    ///
    /// The child list must contain at least one provider and no duplicate
    /// references (compared by identity).
    pub fn new(
        threshold: Severity,
        fallback: Option<SharedProvider>,
        children: Vec<SharedProvider>,
    ) -> Result<Self, ConfigError> {
        if children.is_empty() {
            return Err(ConfigError::EmptyChildList { kind: KIND });
        }
        for (position, child) in children.iter().enumerate() {
            if children[..position]
                .iter()
                .any(|earlier| Arc::ptr_eq(earlier, child))
            {
                return Err(ConfigError::DuplicateChild { kind: KIND });
            }
        }

        Ok(Self {
            core: ProviderCore::new("composite", DEFAULT_DESCRIPTION, threshold, fallback),
            pending: Vec::new(),
            children: OnceLock::from(children),
        })
    }

    /// Declaratively construct a pending composite from an attribute map.
    ///
    /// At least one `provider<N>` attribute is required; each value is
    /// the name of another configured provider. N need not be contiguous;
    /// the referenced names are recorded in ascending-N order. A name
    /// referenced twice is rejected here, before any registry lookup.
    pub fn from_attributes(
        name: &str,
        mut attributes: AttributeBag,
    ) -> Result<Self, ConfigError> {
        let core = ProviderCore::from_attributes(KIND, name, DEFAULT_DESCRIPTION, &mut attributes)?;

        let mut referenced: Vec<(u64, String)> = Vec::new();
        for (key, value) in attributes.take_matching(provider_key_pattern()) {
            let index: u64 = key["provider".len()..].parse().map_err(|_| {
                ConfigError::InvalidAttribute {
                    kind: KIND,
                    name: name.to_string(),
                    attribute: key.clone(),
                    value: value.clone(),
                    reason: "provider index out of range".to_string(),
                }
            })?;
            referenced.push((index, value));
        }
        attributes.finish(KIND, name)?;

        if referenced.is_empty() {
            return Err(ConfigError::NoChildProviders {
                kind: KIND,
                name: name.to_string(),
            });
        }

        referenced.sort_by_key(|(index, _)| *index);

        let mut pending = Vec::with_capacity(referenced.len());
        for (_, child) in referenced {
            if pending.contains(&child) {
                return Err(ConfigError::DuplicateReference {
                    kind: KIND,
                    name: name.to_string(),
                    referenced: child,
                });
            }
            pending.push(child);
        }

        Ok(Self {
            core,
            pending,
            children: OnceLock::new(),
        })
    }

    /// The resolved children, in ascending provider<N> order.
    ///
    /// Errors until initialization has completed.
    pub fn providers(&self) -> Result<&[SharedProvider], UninitializedError> {
        self.children
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| self.uninitialized())
    }

    fn uninitialized(&self) -> UninitializedError {
        UninitializedError {
            kind: KIND,
            name: self.core.name().to_string(),
        }
    }
}

impl LoggingProvider for CompositeLoggingProvider {
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

    /// Fan the entry out to every child unconditionally and aggregate
    /// whatever failed. A single failing child never short-circuits the
    /// others, and even a lone failure is wrapped so the caller learns
    /// which siblings were attempted.
    fn write(&self, entry: &LogEntry) -> Result<(), WriteError> {
        let Some(children) = self.children.get() else {
            return Err(self.uninitialized().into());
        };

        let mut failures = Vec::new();
        for child in children {
            if let Err(error) = child.log(entry) {
                failures.push(ChildFailure {
                    provider: child.name().to_string(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregateError { failures }.into())
        }
    }

    fn referenced_names(&self) -> Vec<String> {
        let mut names = self.core.referenced_names();
        names.extend(self.pending.iter().cloned());
        names
    }

    fn complete_initialization(
        &self,
        registry: &LoggingProviderCollection,
        _default_provider: &SharedProvider,
    ) -> Result<(), ConfigError> {
        self.core.resolve_fallback(KIND, registry)?;

        if self.children.get().is_some() {
            // Directly constructed; the child list is already live.
            return Ok(());
        }

        let mut resolved = Vec::with_capacity(self.pending.len());
        for referenced in &self.pending {
            let provider =
                registry
                    .get(referenced)
                    .ok_or_else(|| ConfigError::MissingReference {
                        kind: KIND,
                        name: self.core.name().to_string(),
                        referenced: referenced.clone(),
                    })?;
            resolved.push(provider);
        }

        tracing::debug!(
            provider = self.core.name(),
            children = resolved.len(),
            "composite provider completed initialization"
        );
        let _ = self.children.set(resolved);
        Ok(())
    }
}
