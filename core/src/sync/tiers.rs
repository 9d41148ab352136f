use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::storage::{self, DiskMirror};
use crate::store::NoteStore;

use super::cache::LocalCache;

/// The durable tier a session writes through to.
#[async_trait]
pub trait Mirror: Send + Sync {
    /// Reads the last mirrored store. `Ok(None)` means nothing has been mirrored yet.
    async fn read_store(&self) -> storage::Result<Option<NoteStore>>;

    /// Writes the whole store, returning the number of notes written.
    async fn batch_write(&self, store: &NoteStore) -> storage::Result<usize>;
}

#[async_trait]
impl Mirror for DiskMirror {
    async fn read_store(&self) -> storage::Result<Option<NoteStore>> {
        DiskMirror::read_store(self).await
    }

    async fn batch_write(&self, store: &NoteStore) -> storage::Result<usize> {
        DiskMirror::batch_write(self, store).await
    }
}

/// Which tier the startup state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Mirror,
    Cache,
    Empty,
}

/// Loads the startup store: the local cache first, then the mirror, which replaces the cached
/// state in full whenever it has a readable store.
///
/// Failures in either tier are logged and treated as that tier having no state.
pub async fn load_tiers(cache: &dyn LocalCache, mirror: &dyn Mirror) -> (NoteStore, LoadSource) {
    let mut loaded = match cache.load() {
        Ok(Some(store)) => {
            debug!("Loaded {} notes from local cache", store.note_count());
            (store, LoadSource::Cache)
        }
        Ok(None) => (NoteStore::new(), LoadSource::Empty),
        Err(e) => {
            warn!("Ignoring unreadable local cache: {}", e);
            (NoteStore::new(), LoadSource::Empty)
        }
    };

    match mirror.read_store().await {
        Ok(Some(store)) => {
            debug!("Loaded {} notes from disk mirror", store.note_count());
            loaded = (store, LoadSource::Mirror);
        }
        Ok(None) => info!("No mirrored store found (normal on first run)"),
        Err(e) => warn!("Ignoring unreadable mirrored store: {}", e),
    }

    loaded
}
