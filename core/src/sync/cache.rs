use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

use crate::codec::{self, CodecError};
use crate::store::NoteStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Cached payload could not be encoded or decoded")]
    Codec(#[from] CodecError),
}

/// Fast local copy of the store, written synchronously on every mutation.
///
/// The cache is the fallback tier on startup: it is only used when the disk mirror has no
/// readable whole-store file.
pub trait LocalCache: Send + Sync {
    fn load(&self) -> Result<Option<NoteStore>, CacheError>;

    fn save(&self, store: &NoteStore) -> Result<(), CacheError>;
}

/// Cache kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCache { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LocalCache for FileCache {
    fn load(&self) -> Result<Option<NoteStore>, CacheError> {
        match fs::read(&self.path) {
            Ok(payload) => Ok(Some(codec::decode(&payload)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e)),
        }
    }

    fn save(&self, store: &NoteStore) -> Result<(), CacheError> {
        let payload = codec::encode(store)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Replace via rename so a crash mid-write leaves the previous copy intact.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, payload)?;
        fs::rename(&staging, &self.path)?;
        debug!("Local cache written to {}", self.path.display());
        Ok(())
    }
}

/// Cache held in memory, for sessions that should leave no trace and for tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    payload: Mutex<Option<Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes currently cached, if anything has been saved.
    pub fn cached_len(&self) -> Option<usize> {
        self.payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Vec::len)
    }
}

impl LocalCache for MemoryCache {
    fn load(&self) -> Result<Option<NoteStore>, CacheError> {
        let payload = self.payload.lock().unwrap_or_else(PoisonError::into_inner);
        match payload.as_deref() {
            Some(bytes) => Ok(Some(codec::decode(bytes)?)),
            None => Ok(None),
        }
    }

    fn save(&self, store: &NoteStore) -> Result<(), CacheError> {
        let bytes = codec::encode(store)?;
        *self.payload.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        Ok(())
    }
}
