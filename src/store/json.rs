//! JSON document file backend for the profile store.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;

use super::{Database, ProfileStore};

/// File-backed store holding the whole user document as pretty-printed JSON.
///
/// Saves go through a sibling temp file and a rename, so a failed write
/// never leaves a half-written document behind.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories and seeding an
    /// empty document when the file does not exist yet. An existing file is
    /// left untouched even if it no longer parses — replacing it would
    /// discard every user's record.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let store = Self { path };
        if !fs::try_exists(&store.path).await? {
            store.save(&Database::default()).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load(&self) -> Result<Database, StoreError> {
        let raw = fs::read_to_string(&self.path).await?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, db: &Database) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(db)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
