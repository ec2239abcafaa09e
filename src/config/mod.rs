//! Declarative configuration: provider declarations, attribute handling,
//! and the errors raised while turning configuration into live providers.

pub mod loader;
pub mod registry;
pub mod resolver;

pub use registry::LoggingProviderCollection;
pub use resolver::{LoggingSystem, ProviderBuilder, ProviderFactory};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("provider name '{name}' is declared more than once; provider names must be unique")]
    DuplicateProviderName { name: String },

    #[error("provider '{name}' declares unknown kind '{kind}'")]
    UnknownKind { name: String, kind: String },

    #[error("unrecognized attribute '{attribute}' on {kind} '{name}'")]
    UnknownAttribute {
        kind: &'static str,
        name: String,
        attribute: String,
    },

    #[error("invalid value '{value}' for attribute '{attribute}' on {kind} '{name}': {reason}")]
    InvalidAttribute {
        kind: &'static str,
        name: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("missing required attribute '{attribute}' on {kind} '{name}'")]
    MissingAttribute {
        kind: &'static str,
        name: String,
        attribute: String,
    },

    #[error("{kind} '{name}' must reference at least one provider through a provider<N> attribute")]
    NoChildProviders { kind: &'static str, name: String },

    #[error("the 'providers' collection passed to {kind} must contain at least one provider")]
    EmptyChildList { kind: &'static str },

    #[error("the 'providers' collection passed to {kind} contains duplicate references")]
    DuplicateChild { kind: &'static str },

    #[error(
        "{kind} '{name}' references provider '{referenced}' multiple times; \
         a provider should only be referenced once"
    )]
    DuplicateReference {
        kind: &'static str,
        name: String,
        referenced: String,
    },

    #[error(
        "{kind} '{name}' references a provider '{referenced}' that does not exist \
         in the provider collection; make sure the name is spelled correctly"
    )]
    MissingReference {
        kind: &'static str,
        name: String,
        referenced: String,
    },

    #[error(
        "the default provider '{name}' does not exist in the provider collection; \
         make sure the name is spelled correctly"
    )]
    MissingDefaultProvider { name: String },

    #[error("circular provider reference detected: {chain}")]
    CircularReference { chain: String },

    #[error("file error: {0}")]
    File(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One provider block from the declarative configuration: a unique name,
/// the provider kind, and the kind-specific attribute map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDeclaration {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Fully parsed logging configuration: the default provider plus every
/// declared provider, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub default_provider: String,
    #[serde(default)]
    pub providers: Vec<ProviderDeclaration>,
}

/// Attribute map for one declarative provider block.
///
/// Recognized attributes are taken out one by one; whatever remains when
/// `finish` is called is unrecognized and rejected.
#[derive(Debug, Default, Clone)]
pub struct AttributeBag {
    attributes: BTreeMap<String, String>,
}

impl AttributeBag {
    pub fn new(attributes: BTreeMap<String, String>) -> Self {
        Self { attributes }
    }

    /// Remove and return the value of `key`, if present.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.attributes.remove(key)
    }

    /// Remove and return every attribute whose key matches `pattern`, in
    /// key order.
    pub fn take_matching(&mut self, pattern: &Regex) -> Vec<(String, String)> {
        let keys: Vec<String> = self
            .attributes
            .keys()
            .filter(|key| pattern.is_match(key))
            .cloned()
            .collect();

        let mut taken = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.attributes.remove(&key) {
                taken.push((key, value));
            }
        }
        taken
    }

    /// Reject whatever was not consumed as an unrecognized attribute.
    pub fn finish(self, kind: &'static str, name: &str) -> Result<(), ConfigError> {
        match self.attributes.into_keys().next() {
            Some(attribute) => Err(ConfigError::UnknownAttribute {
                kind,
                name: name.to_string(),
                attribute,
            }),
            None => Ok(()),
        }
    }
}
