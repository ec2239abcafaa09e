//! Two-phase initialization of the configured provider graph.
//!
//! Providers are constructed in declaration order but may reference
//! providers declared later, so phase 1 only records names; phase 2 runs
//! once after every provider exists and resolves names into live
//! references. Cycle detection treats "fallback provider" and "composite
//! child" references as the same kind of directed edge.

use super::registry::LoggingProviderCollection;
use super::{AttributeBag, ConfigError, LoggingConfig, ProviderDeclaration};
use crate::domain::LogEntry;
use crate::provider::composite::CompositeLoggingProvider;
use crate::provider::console::ConsoleLoggingProvider;
use crate::provider::file::FileLoggingProvider;
use crate::provider::memory::MemoryLoggingProvider;
use crate::provider::{LoggingProvider, SharedProvider, WriteError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Builds one provider from its declared name and attributes.
pub type ProviderBuilder = fn(&str, AttributeBag) -> Result<SharedProvider, ConfigError>;

/// Maps declarative `kind` strings to provider constructors.
pub struct ProviderFactory {
    builders: HashMap<String, ProviderBuilder>,
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::with_builtin_kinds()
    }
}

impl ProviderFactory {
    /// Factory with the built-in kinds: `composite`, `memory`, `console`
    /// and `file`.
    pub fn with_builtin_kinds() -> Self {
        let mut factory = Self::empty();
        factory.register("composite", |name, attributes| {
            Ok(Arc::new(CompositeLoggingProvider::from_attributes(
                name, attributes,
            )?))
        });
        factory.register("memory", |name, attributes| {
            Ok(Arc::new(MemoryLoggingProvider::from_attributes(
                name, attributes,
            )?))
        });
        factory.register("console", |name, attributes| {
            Ok(Arc::new(ConsoleLoggingProvider::from_attributes(
                name, attributes,
            )?))
        });
        factory.register("file", |name, attributes| {
            Ok(Arc::new(FileLoggingProvider::from_attributes(
                name, attributes,
            )?))
        });
        factory
    }

    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register a builder for a kind, replacing any existing
    /// registration. External sink crates hook in here.
    pub fn register(&mut self, kind: &str, builder: ProviderBuilder) {
        tracing::debug!(kind, "registered provider kind");
        self.builders.insert(kind.to_string(), builder);
    }

    fn build(&self, declaration: &ProviderDeclaration) -> Result<SharedProvider, ConfigError> {
        let builder =
            self.builders
                .get(&declaration.kind)
                .ok_or_else(|| ConfigError::UnknownKind {
                    name: declaration.name.clone(),
                    kind: declaration.kind.clone(),
                })?;
        builder(
            &declaration.name,
            AttributeBag::new(declaration.attributes.clone()),
        )
    }
}

/// A fully resolved logging configuration: every provider completed, the
/// reference graph validated, and the default provider resolved.
pub struct LoggingSystem {
    providers: LoggingProviderCollection,
    default_provider: SharedProvider,
}

impl std::fmt::Debug for LoggingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingSystem")
            .field("providers", &self.providers.len())
            .field("default_provider", &self.default_provider.name())
            .finish()
    }
}

impl LoggingSystem {
    /// Initialize from a parsed configuration using the built-in kinds.
    pub fn initialize(config: &LoggingConfig) -> Result<Self, ConfigError> {
        Self::initialize_with(config, &ProviderFactory::default())
    }

    /// Initialize with a caller-supplied factory.
    pub fn initialize_with(
        config: &LoggingConfig,
        factory: &ProviderFactory,
    ) -> Result<Self, ConfigError> {
        // Phase 1: construct every declared provider; only names are
        // recorded for cross-provider references.
        let mut providers = LoggingProviderCollection::new();
        for declaration in &config.providers {
            providers.add(factory.build(declaration)?)?;
        }

        let default_provider = providers.get(&config.default_provider).ok_or_else(|| {
            ConfigError::MissingDefaultProvider {
                name: config.default_provider.clone(),
            }
        })?;

        // Phase 2: resolve recorded names into live references.
        for provider in providers.iter() {
            provider.complete_initialization(&providers, &default_provider)?;
        }

        detect_circular_references(&providers)?;

        tracing::debug!(
            providers = providers.len(),
            default = default_provider.name(),
            "logging system initialized"
        );

        Ok(Self {
            providers,
            default_provider,
        })
    }

    pub fn default_provider(&self) -> &SharedProvider {
        &self.default_provider
    }

    pub fn provider(&self, name: &str) -> Option<SharedProvider> {
        self.providers.get(name)
    }

    pub fn providers(&self) -> &LoggingProviderCollection {
        &self.providers
    }

    /// Log through the configured default provider.
    pub fn log(&self, entry: &LogEntry) -> Result<(), WriteError> {
        self.default_provider.log(entry)
    }
}

/// Depth-first walk over the name graph. The current path doubles as the
/// in-progress marker set; revisiting a node on that path is a cycle.
fn detect_circular_references(
    providers: &LoggingProviderCollection,
) -> Result<(), ConfigError> {
    let mut done: HashSet<String> = HashSet::new();
    for provider in providers.iter() {
        let mut path: Vec<String> = Vec::new();
        visit(provider.name(), providers, &mut done, &mut path)?;
    }
    Ok(())
}

fn visit(
    name: &str,
    providers: &LoggingProviderCollection,
    done: &mut HashSet<String>,
    path: &mut Vec<String>,
) -> Result<(), ConfigError> {
    if done.contains(name) {
        return Ok(());
    }
    if path.iter().any(|visited| visited == name) {
        path.push(name.to_string());
        return Err(ConfigError::CircularReference {
            chain: path.join(" -> "),
        });
    }

    path.push(name.to_string());
    if let Some(provider) = providers.get(name) {
        for referenced in provider.referenced_names() {
            visit(&referenced, providers, done, path)?;
        }
    }
    path.pop();
    done.insert(name.to_string());
    Ok(())
}
