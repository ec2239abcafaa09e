use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

/// Structured description of an error attached to a log entry.
///
/// Carries what a sink needs to persist: the error's type name, its
/// message, an optional stack trace, and the chain of underlying causes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub message: String,
    #[serde(default)]
    pub stack_trace: Option<String>,
    #[serde(default)]
    pub inner: Option<Box<ExceptionInfo>>,
}

impl ExceptionInfo {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            stack_trace: None,
            inner: None,
        }
    }

    pub fn with_stack_trace(mut self, stack_trace: impl Into<String>) -> Self {
        self.stack_trace = Some(stack_trace.into());
        self
    }

    pub fn with_inner(mut self, inner: ExceptionInfo) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Capture a live error, including its `source()` chain, as nested
    /// `inner` records.
    pub fn from_error<E: StdError>(error: &E) -> Self {
        let mut info = Self::new(std::any::type_name::<E>(), error.to_string());
        info.inner = error.source().map(|cause| Box::new(Self::from_cause(cause)));
        info
    }

    fn from_cause(cause: &(dyn StdError + 'static)) -> Self {
        // Type names are erased behind `dyn Error`; only the top-level
        // capture knows the concrete type.
        let mut info = Self::new("error", cause.to_string());
        info.inner = cause.source().map(|next| Box::new(Self::from_cause(next)));
        info
    }
}

impl fmt::Display for ExceptionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if let Some(inner) = &self.inner {
            write!(f, "; caused by {inner}")?;
        }
        Ok(())
    }
}
