//! Persistence layer — the profile record store.
//!
//! One JSON document holds every user: `{"users": {<id>: <Profile>}}`.
//! The store is not safely reentrant; the dispatcher owns each
//! read-modify-write cycle and serializes turns around it.

pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::profile::Profile;

/// The persisted document: every known user keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    pub users: HashMap<String, Profile>,
}

/// Backend-agnostic profile store.
///
/// `get_or_create` and `update` are whole read-modify-write cycles built on
/// `load`/`save`; every mutation path completes a synchronous save before
/// the triggering turn is acknowledged, so state survives a restart
/// mid-conversation.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Parse the persisted document. `StoreError::Corrupt` if unparseable.
    async fn load(&self) -> Result<Database, StoreError>;

    /// Persist the document. Must not leave behind a file that fails a
    /// subsequent `load` even when the write itself errors.
    async fn save(&self, db: &Database) -> Result<(), StoreError>;

    /// Return the existing record for `id`, or materialize and persist the
    /// seed. The boolean is true when the record was just created.
    async fn get_or_create(&self, id: &str, seed: Profile) -> Result<(Profile, bool), StoreError> {
        let mut db = self.load().await?;
        if let Some(existing) = db.users.get(id) {
            return Ok((existing.clone(), false));
        }
        db.users.insert(id.to_string(), seed.clone());
        self.save(&db).await?;
        Ok((seed, true))
    }

    /// Write one user's record back into the document.
    async fn update(&self, profile: Profile) -> Result<(), StoreError> {
        let mut db = self.load().await?;
        db.users.insert(profile.id.clone(), profile);
        self.save(&db).await
    }
}
