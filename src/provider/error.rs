use std::fmt;
use thiserror::Error;

/// Operation attempted on a provider that has not completed the
/// applicable initialization path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "the provider has not been initialized: {kind} '{name}' must complete \
     initialization before it can be used"
)]
pub struct UninitializedError {
    pub kind: &'static str,
    pub name: String,
}

/// Failure raised while writing a log entry to a sink.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error(transparent)]
    Uninitialized(#[from] UninitializedError),

    #[error("I/O failure in provider '{provider}': {source}")]
    Io {
        provider: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize entry in provider '{provider}': {source}")]
    Serialization {
        provider: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("provider '{provider}' failed: {message}")]
    Sink { provider: String, message: String },

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// One child failure collected during composite fan-out.
#[derive(Debug)]
pub struct ChildFailure {
    pub provider: String,
    pub error: WriteError,
}

/// Every failure collected during one composite fan-out.
///
/// Even a single child failure is wrapped: re-raising it directly would
/// discard which sibling providers were attempted.
#[derive(Debug)]
pub struct AggregateError {
    pub failures: Vec<ChildFailure>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} provider(s) failed during fan-out:",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, " [{}: {}]", failure.provider, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}
