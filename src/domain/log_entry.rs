use super::exception::ExceptionInfo;
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single log event.
///
/// This is the canonical representation of an event throughout the
/// framework, from the logging call through fan-out to sink output.
/// Immutable once constructed; the timestamp is assigned at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    severity: Severity,
    message: String,
    #[serde(default)]
    exception: Option<ExceptionInfo>,
    #[serde(default)]
    source: Option<String>,
    timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// The message may be empty but is always present.
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        exception: Option<ExceptionInfo>,
        source: Option<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            exception,
            source,
            timestamp: Utc::now(),
        }
    }

    /// Plain informational entry with nothing but a message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::new(Severity::Information, message, None, None)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exception(&self) -> Option<&ExceptionInfo> {
        self.exception.as_ref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
