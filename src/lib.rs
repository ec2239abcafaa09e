#![deny(rust_2024_compatibility)]
// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::missing_errors_doc,      // Internal API
    clippy::missing_panics_doc,      // Internal API
    clippy::module_name_repetitions, // e.g. ConfigError in config module
    clippy::must_use_candidate,      // Annotated selectively on critical APIs
    clippy::doc_markdown             // Internal API
)]

pub mod config;
pub mod domain;
pub mod provider;

// Re-export main types for easy access
pub use config::{
    AttributeBag, ConfigError, LoggingConfig, LoggingProviderCollection, LoggingSystem,
    ProviderDeclaration, ProviderFactory,
};
pub use domain::{ExceptionInfo, LogEntry, Severity};
pub use provider::{
    AggregateError, CompositeLoggingProvider, ConsoleLoggingProvider, FileLoggingProvider,
    LoggingProvider, MemoryLoggingProvider, ProviderCore, SharedProvider, UninitializedError,
    WriteError,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
