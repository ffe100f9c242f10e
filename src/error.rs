//! Error types for contract verification.
//!
//! Incompatibilities between a mock and the provider schema are not errors:
//! they are reported as [`Issue`](crate::Issue) data inside a
//! [`MatchResult`](crate::MatchResult). The types here cover environment
//! failures only.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading or converting a provider schema. Fatal to a run.
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    // IO errors (exit code 3)
    #[error("schema file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid schema at {path}: {message}")]
    InvalidSchema { path: String, message: String },
}

impl SchemaLoadError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaLoadError::InvalidSchema {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchemaLoadError::FileNotFound { .. } | SchemaLoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            SchemaLoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// A single mock record that could not be loaded. Never fatal to a run.
#[derive(Debug, Error)]
pub enum MockError {
    #[error("cannot read mock {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mock {path}: {source}")]
    InvalidMock {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl MockError {
    /// Location of the offending record.
    pub fn path(&self) -> &std::path::Path {
        match self {
            MockError::ReadError { path, .. } | MockError::InvalidMock { path, .. } => path,
        }
    }
}

/// Failures of the mock repository itself (not of a single record).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("mock repository not found: {path}")]
    NotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize mock: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

impl RepositoryError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RepositoryError::Serialize { .. } => 2,
            _ => 3,
        }
    }
}

/// Errors that abort a verification run.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Schema(#[from] SchemaLoadError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("cannot derive provider name from {schema}: pass a provider explicitly")]
    MissingProvider { schema: String },
}

impl VerifyError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            VerifyError::Schema(e) => e.exit_code(),
            VerifyError::Repository(e) => e.exit_code(),
            VerifyError::MissingProvider { .. } => 2,
        }
    }
}

/// Errors while persisting or loading stored validation results.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot read results {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid results file: {source}")]
    InvalidResults {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize results: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported report format: {format}")]
    UnsupportedFormat { format: String },
}

impl ReportError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::ReadError { .. } | ReportError::WriteError { .. } => 3,
            _ => 2,
        }
    }
}
