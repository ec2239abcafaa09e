//! Ordered, name-keyed collection of configured providers.

use super::ConfigError;
use crate::provider::{LoggingProvider, SharedProvider};
use std::collections::HashMap;

/// The full set of configured providers, keyed by unique name.
///
/// Insertion order is preserved; the collection is read-only during the
/// resolution pass and afterwards.
#[derive(Default, Clone, Debug)]
pub struct LoggingProviderCollection {
    providers: Vec<SharedProvider>,
    index: HashMap<String, usize>,
}

impl LoggingProviderCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collection built from an ordered list of providers.
    pub fn from_providers(
        providers: impl IntoIterator<Item = SharedProvider>,
    ) -> Result<Self, ConfigError> {
        let mut collection = Self::new();
        for provider in providers {
            collection.add(provider)?;
        }
        Ok(collection)
    }

    /// Register a provider under its unique name.
    pub fn add(&mut self, provider: SharedProvider) -> Result<(), ConfigError> {
        let name = provider.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ConfigError::DuplicateProviderName { name });
        }
        tracing::debug!(provider = %name, "registered logging provider");
        self.index.insert(name, self.providers.len());
        self.providers.push(provider);
        Ok(())
    }

    /// Look a provider up by exact, case-sensitive name.
    pub fn get(&self, name: &str) -> Option<SharedProvider> {
        self.index
            .get(name)
            .map(|&position| self.providers[position].clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Providers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SharedProvider> {
        self.providers.iter()
    }
}
