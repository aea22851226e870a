//! Configuration document persistence keyed by application id

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ConfigurationDocument;
use crate::constants::config::JSON_EXTENSION;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid application id '{0}'")]
    InvalidAppId(String),
    #[error("failed to read configuration document: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write configuration document: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse configuration document")]
    Parse(#[from] serde_json::Error),
    #[error("configuration store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persists one configuration document per application id
pub trait ConfigStore {
    fn get(&self, app_id: &str) -> impl Future<Output = StoreResult<Option<ConfigurationDocument>>>;

    fn update(
        &self,
        app_id: &str,
        document: &ConfigurationDocument,
    ) -> impl Future<Output = StoreResult<()>>;
}

fn validate_app_id(app_id: &str) -> StoreResult<()> {
    let invalid = app_id.is_empty()
        || app_id == "."
        || app_id == ".."
        || app_id.contains(['/', '\\'])
        || app_id.contains('\0');
    if invalid {
        return Err(StoreError::InvalidAppId(app_id.to_string()));
    }
    Ok(())
}

/// Stores documents as `<dir>/<app_id>.json`
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    dir: PathBuf,
}

impl FileConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn document_path(&self, app_id: &str) -> StoreResult<PathBuf> {
        validate_app_id(app_id)?;
        Ok(self.dir.join(format!("{app_id}.{JSON_EXTENSION}")))
    }
}

impl ConfigStore for FileConfigStore {
    async fn get(&self, app_id: &str) -> StoreResult<Option<ConfigurationDocument>> {
        let path = self.document_path(app_id)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(app_id = %app_id, path = %path.display(), "No stored configuration document");
                return Ok(None);
            }
            Err(e) => return Err(StoreError::Read { path, source: e }),
        };
        let document = serde_json::from_str(&contents)?;
        Ok(Some(document))
    }

    async fn update(&self, app_id: &str, document: &ConfigurationDocument) -> StoreResult<()> {
        let path = self.document_path(app_id)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Write {
                path: self.dir.clone(),
                source: e,
            })?;

        let json = serde_json::to_string_pretty(document)?;

        // Write then rename so readers never see a half-written document
        let tmp_path = path.with_extension(format!("{JSON_EXTENSION}.tmp"));
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| StoreError::Write {
                path: tmp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| StoreError::Write {
                path: path.clone(),
                source: e,
            })?;

        info!(app_id = %app_id, path = %path.display(), "Saved configuration document");
        Ok(())
    }
}

/// In-process store for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    documents: Mutex<HashMap<String, ConfigurationDocument>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(app_id: impl Into<String>, document: ConfigurationDocument) -> Self {
        let store = Self::new();
        store
            .documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(app_id.into(), document);
        store
    }

    pub fn snapshot(&self, app_id: &str) -> Option<ConfigurationDocument> {
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(app_id)
            .cloned()
    }
}

impl ConfigStore for MemoryConfigStore {
    async fn get(&self, app_id: &str) -> StoreResult<Option<ConfigurationDocument>> {
        validate_app_id(app_id)?;
        Ok(self.snapshot(app_id))
    }

    async fn update(&self, app_id: &str, document: &ConfigurationDocument) -> StoreResult<()> {
        validate_app_id(app_id)?;
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(app_id.to_string(), document.clone());
        Ok(())
    }
}
