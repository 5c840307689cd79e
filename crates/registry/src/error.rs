use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised while resolving, switching, or probing registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The named registry is not known to the catalog or the record file.
    ///
    /// Command handlers treat this as a lenient no-op rather than a failure.
    #[error("Registry '{0}' not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid registry URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Writing one key into the package manager configuration failed.
    ///
    /// Keys after `key` in the same propagation were not attempted.
    #[error("Failed to propagate '{key}' to the package manager config: {source}")]
    Propagation {
        key: String,
        #[source]
        source: Box<RegistryError>,
    },

    #[error("Current registry '{name}' has no repository field, can't execute publish")]
    PublishPrecondition { name: String },

    #[error("Probe of '{url}' failed: {message}")]
    Probe { url: String, message: String },

    #[error("`{command}` exited with {status}: {stderr}")]
    Backend {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO operation '{operation}' failed on path '{path}': {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record file '{path}': {message}")]
    RecordParse { path: PathBuf, message: String },
}

impl RegistryError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Whether this error is the lenient "unknown name" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
