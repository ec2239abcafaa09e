//! Console sink writing human-readable lines to stdout or stderr.

use super::{LoggingProvider, ProviderCore, SharedProvider, WriteError};
use crate::config::{AttributeBag, ConfigError, LoggingProviderCollection};
use crate::domain::{LogEntry, Severity};
use std::io::Write;

const KIND: &str = "ConsoleLoggingProvider";
const DEFAULT_DESCRIPTION: &str = "Console logging provider";

/// Output stream the console sink writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug)]
pub struct ConsoleLoggingProvider {
    core: ProviderCore,
    stream: ConsoleStream,
}

impl ConsoleLoggingProvider {
    pub fn new(name: &str, threshold: Severity, stream: ConsoleStream) -> Self {
        Self {
            core: ProviderCore::new(name, DEFAULT_DESCRIPTION, threshold, None),
            stream,
        }
    }

    pub fn from_attributes(name: &str, mut attributes: AttributeBag) -> Result<Self, ConfigError> {
        let core = ProviderCore::from_attributes(KIND, name, DEFAULT_DESCRIPTION, &mut attributes)?;

        let stream = match attributes.take("stream") {
            None => ConsoleStream::default(),
            Some(value) => {
                if value == "stdout" {
                    ConsoleStream::Stdout
                } else if value == "stderr" {
                    ConsoleStream::Stderr
                } else {
                    return Err(ConfigError::InvalidAttribute {
                        kind: KIND,
                        name: name.to_string(),
                        attribute: "stream".to_string(),
                        value,
                        reason: "expected 'stdout' or 'stderr'".to_string(),
                    });
                }
            }
        };
        attributes.finish(KIND, name)?;

        Ok(Self { core, stream })
    }

    fn render(entry: &LogEntry) -> String {
        let mut line = format!(
            "{} [{}]",
            entry.timestamp().to_rfc3339(),
            entry.severity()
        );
        if let Some(source) = entry.source() {
            line.push_str(&format!(" {source}:"));
        }
        line.push(' ');
        line.push_str(entry.message());
        if let Some(exception) = entry.exception() {
            line.push_str(&format!(" ({exception})"));
        }
        line
    }
}

impl LoggingProvider for ConsoleLoggingProvider {
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
        let line = Self::render(entry);
        let result = match self.stream {
            ConsoleStream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            ConsoleStream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
        result.map_err(|source| WriteError::Io {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExceptionInfo;

    #[test]
    fn render_includes_severity_source_and_message() {
        let entry = LogEntry::new(
            Severity::Warning,
            "disk almost full",
            None,
            Some("monitor".to_string()),
        );

        let line = ConsoleLoggingProvider::render(&entry);
        assert!(line.contains("[Warning]"));
        assert!(line.contains("monitor:"));
        assert!(line.contains("disk almost full"));
    }

    #[test]
    fn render_appends_the_exception_chain() {
        let entry = LogEntry::new(
            Severity::Error,
            "write failed",
            Some(ExceptionInfo::new("io::Error", "broken pipe")),
            None,
        );

        let line = ConsoleLoggingProvider::render(&entry);
        assert!(line.contains("broken pipe"));
    }

    #[test]
    fn invalid_stream_attribute_is_rejected() {
        let mut attributes = std::collections::BTreeMap::new();
        attributes.insert("stream".to_string(), "syslog".to_string());

        let error =
            ConsoleLoggingProvider::from_attributes("console", AttributeBag::new(attributes))
                .unwrap_err();

        assert!(error.to_string().contains("syslog"));
    }
}
