//! Mock sources.
//!
//! A [`MockSource`] lists the mocks recorded against a provider. Records
//! that can't be read or parsed are returned as `Err` items so one bad file
//! never hides the rest; only a failure to enumerate at all is an error.
//!
//! On-disk layout used by [`ContractRepository`]:
//!
//! ```text
//! <base>/providers/<provider>/openapi.yaml
//! <base>/consumers/<consumer>/mocks/*.json
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MockError, RepositoryError, SchemaLoadError};
use crate::loader::{load_mock, load_schema};
use crate::mock::Mock;
use crate::schema::Schema;

/// Outcome of loading one mock record.
pub type MockRecord = Result<Mock, MockError>;

/// File name of a provider schema inside its provider directory.
pub const PROVIDER_SCHEMA_FILE: &str = "openapi.yaml";

/// Something that can enumerate consumer mocks.
pub trait MockSource {
    /// List the mocks recorded against `provider`, in a stable order.
    ///
    /// Loaded mocks of other providers are left out. Records that failed to
    /// load are included as `Err`, since their provider is unknown.
    fn list_mocks_for_provider(&self, provider: &str) -> Result<Vec<MockRecord>, RepositoryError>;
}

/// Mocks held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMockSource {
    mocks: Vec<Mock>,
}

impl MemoryMockSource {
    pub fn new(mocks: Vec<Mock>) -> Self {
        Self { mocks }
    }

    pub fn push(&mut self, mock: Mock) {
        self.mocks.push(mock);
    }
}

impl From<Vec<Mock>> for MemoryMockSource {
    fn from(mocks: Vec<Mock>) -> Self {
        Self::new(mocks)
    }
}

impl MockSource for MemoryMockSource {
    fn list_mocks_for_provider(&self, provider: &str) -> Result<Vec<MockRecord>, RepositoryError> {
        Ok(self
            .mocks
            .iter()
            .filter(|m| m.provider == provider)
            .cloned()
            .map(Ok)
            .collect())
    }
}

/// All `*.json` files below a directory, read as mocks.
#[derive(Debug, Clone)]
pub struct DirectoryMockSource {
    root: PathBuf,
}

impl DirectoryMockSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl MockSource for DirectoryMockSource {
    fn list_mocks_for_provider(&self, provider: &str) -> Result<Vec<MockRecord>, RepositoryError> {
        if !self.root.is_dir() {
            return Err(RepositoryError::NotFound {
                path: self.root.clone(),
            });
        }

        let files = collect_mock_files(&self.root)?;
        Ok(load_for_provider(&files, provider, None))
    }
}

/// Provider schemas and consumer mocks under one base directory.
#[derive(Debug, Clone)]
pub struct ContractRepository {
    base: PathBuf,
}

impl ContractRepository {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn consumers_dir(&self) -> PathBuf {
        self.base.join("consumers")
    }

    fn mocks_dir(&self, consumer: &str) -> PathBuf {
        self.consumers_dir().join(consumer).join("mocks")
    }

    /// Where the schema of `provider` lives.
    pub fn provider_schema_path(&self, provider: &str) -> PathBuf {
        self.base
            .join("providers")
            .join(provider)
            .join(PROVIDER_SCHEMA_FILE)
    }

    pub fn load_provider_schema(&self, provider: &str) -> Result<Schema, SchemaLoadError> {
        load_schema(&self.provider_schema_path(provider))
    }

    /// Write a provider schema document, creating directories as needed.
    pub fn save_provider_schema(
        &self,
        provider: &str,
        content: &str,
    ) -> Result<PathBuf, RepositoryError> {
        let path = self.provider_schema_path(provider);
        write_file(&path, content)?;
        Ok(path)
    }

    /// Store a mock as `<consumer>/mocks/<name>.json`.
    ///
    /// The stored mock's `consumer` is set to `consumer`.
    pub fn store_mock(
        &self,
        consumer: &str,
        name: &str,
        mock: &Mock,
    ) -> Result<PathBuf, RepositoryError> {
        let mut mock = mock.clone();
        mock.consumer = consumer.to_string();

        let content = serde_json::to_string_pretty(&mock)
            .map_err(|source| RepositoryError::Serialize { source })?;
        let path = self.mocks_dir(consumer).join(format!("{}.json", name));
        write_file(&path, &content)?;
        Ok(path)
    }

    /// Consumer directory names, sorted.
    pub fn list_consumers(&self) -> Result<Vec<String>, RepositoryError> {
        let dir = self.consumers_dir();
        if !dir.is_dir() {
            return Err(RepositoryError::NotFound { path: dir });
        }

        let entries = std::fs::read_dir(&dir).map_err(|source| RepositoryError::ReadError {
            path: dir.clone(),
            source,
        })?;

        let mut consumers: Vec<String> = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        consumers.sort();
        Ok(consumers)
    }
}

impl MockSource for ContractRepository {
    /// Consumers without a `mocks` directory are skipped. A mock with an
    /// empty `consumer` belongs to the consumer directory it was found in.
    fn list_mocks_for_provider(&self, provider: &str) -> Result<Vec<MockRecord>, RepositoryError> {
        let mut records = Vec::new();

        for consumer in self.list_consumers()? {
            let mocks_dir = self.mocks_dir(&consumer);
            if !mocks_dir.is_dir() {
                debug!(consumer = %consumer, "no mocks directory");
                continue;
            }

            let files = json_files_in(&mocks_dir)?;
            records.extend(load_for_provider(&files, provider, Some(consumer.as_str())));
        }

        Ok(records)
    }
}

/// Load mock files, keeping those of `provider` and every failed record.
///
/// `owner` names the consumer to assign to mocks that don't declare one.
fn load_for_provider(files: &[PathBuf], provider: &str, owner: Option<&str>) -> Vec<MockRecord> {
    let mut records = Vec::new();

    for file in files {
        match load_mock(file) {
            Ok(mut mock) => {
                if mock.provider != provider {
                    debug!(file = %file.display(), provider = %mock.provider, "mock targets another provider");
                    continue;
                }
                if mock.consumer.is_empty() {
                    if let Some(consumer) = owner {
                        mock.consumer = consumer.to_string();
                    }
                }
                records.push(Ok(mock));
            }
            Err(e) => records.push(Err(e)),
        }
    }

    records
}

/// Collect all .json files below `root`, sorted.
///
/// Unreadable subdirectories are skipped with a warning; an unreadable root
/// is an error.
fn collect_mock_files(root: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
    let entries = std::fs::read_dir(root).map_err(|source| RepositoryError::ReadError {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, &mut files);
        } else if is_json(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_json(&path) {
            files.push(path);
        }
    }
}

/// `.json` files directly inside `dir`, sorted.
fn json_files_in(dir: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
    let entries = std::fs::read_dir(dir).map_err(|source| RepositoryError::ReadError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_json(p))
        .collect();
    files.sort();
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

fn write_file(path: &Path, content: &str) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RepositoryError::WriteError {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| RepositoryError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}
