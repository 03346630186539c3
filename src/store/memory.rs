//! In-memory store double for tests and ephemeral runs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StoreError;

use super::{Database, ProfileStore};

/// Keeps the whole document in memory behind a mutex. Same trait contract
/// as the file backend, nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Database>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load(&self) -> Result<Database, StoreError> {
        Ok(self.inner.lock().await.clone())
    }

    async fn save(&self, db: &Database) -> Result<(), StoreError> {
        *self.inner.lock().await = db.clone();
        Ok(())
    }
}
