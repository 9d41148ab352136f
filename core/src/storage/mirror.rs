use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use futures::future::join_all;
use tokio::fs;
use tracing::{debug, error, instrument, warn};

use crate::codec;
use crate::storage::{
    folder_dir_name, note_file_name, Error, Result, NOTE_EXTENSION, STORE_FILE_NAME,
};
use crate::store::NoteStore;

/// On-disk projection of a [`NoteStore`] under a notes root directory.
#[derive(Debug, Clone)]
pub struct DiskMirror {
    root: PathBuf,
}

/// Result of a one-level scan of the notes root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskListing {
    /// Note files, as `name.snote` at the root or `folder/name.snote` one level down.
    pub files: Vec<String>,
    /// Immediate subdirectories of the root.
    pub folders: Vec<String>,
}

impl DiskMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskMirror { root: root.into() }
    }

    /// Returns the notes root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the whole-store file.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_FILE_NAME)
    }

    /// Where a note with this name (in this folder) is written.
    pub fn note_path(&self, folder: Option<&str>, name: &str) -> PathBuf {
        let dir = match folder {
            Some(folder) => self.root.join(folder_dir_name(folder)),
            None => self.root.clone(),
        };
        dir.join(note_file_name(name, NOTE_EXTENSION))
    }

    /// Creates the notes root (and any missing parents) if it does not exist yet.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn ensure_root(&self) -> Result<&Path> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(Error::RootNotADirectory(self.root.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Creating notes root");
                fs::create_dir_all(&self.root).await?;
            }
            Err(e) => return Err(Error::Io(e)),
        }
        Ok(&self.root)
    }

    /// Overwrites the whole-store file with the encoded store.
    #[instrument(skip_all, fields(root = %self.root.display()))]
    pub async fn write_store(&self, store: &NoteStore) -> Result<()> {
        self.ensure_root().await?;
        let payload = codec::encode(store)?;
        fs::write(self.store_path(), payload).await?;
        debug!("Whole-store file written");
        Ok(())
    }

    /// Writes a single note's text, creating its folder directory if needed.
    #[instrument(skip(self, content), fields(root = %self.root.display()))]
    pub async fn write_note(&self, folder: Option<&str>, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.note_path(folder, name);
        write_creating_parent(&path, &codec::encode_note(content)).await?;
        debug!("Note written to {}", path.display());
        Ok(path)
    }

    /// Reads back the whole-store file.
    ///
    /// A missing file is the normal first-run state and yields `Ok(None)`.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn read_store(&self) -> Result<Option<NoteStore>> {
        let payload = match fs::read(self.store_path()).await {
            Ok(payload) => payload,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No whole-store file yet");
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };
        let store = codec::decode(&payload)?;
        debug!("Loaded {} folders and {} notes", store.folder_count(), store.note_count());
        Ok(Some(store))
    }

    /// Writes the whole-store file and every note file concurrently, then removes note files
    /// that no longer belong to any note.
    ///
    /// Notes that map to the same file (same sanitized name in the same folder) produce a single
    /// write holding one of them (normally the newest). Returns the number of note files written. If any write
    /// or removal fails, the others still run to completion; the failed paths are returned in
    /// [`Error::PartialBatch`].
    #[instrument(skip_all, fields(root = %self.root.display(), notes = store.note_count()))]
    pub async fn batch_write(&self, store: &NoteStore) -> Result<usize> {
        self.ensure_root().await?;
        let payload = codec::encode(store)?;
        let store_path = self.store_path();

        let mut targets: BTreeMap<PathBuf, Vec<u8>> = BTreeMap::new();
        for note in store.notes() {
            let path = self.note_path(store.folder_name_of(note), &note.name);
            if targets.insert(path.clone(), codec::encode_note(&note.content)).is_some() {
                warn!("Several notes map to {}; mirroring only one", path.display());
            }
        }

        let note_writes = targets.iter().map(|(path, bytes)| async move {
            (path, write_creating_parent(path, bytes).await)
        });

        let (store_result, note_results) = futures::join!(
            fs::write(&store_path, &payload),
            join_all(note_writes),
        );

        let mut failed = Vec::new();
        if let Err(e) = store_result {
            error!("Failed to write whole-store file {}: {}", store_path.display(), e);
            failed.push(store_path);
        }
        let mut written = 0;
        for (path, result) in note_results {
            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    error!("Failed to write note {}: {}", path.display(), e);
                    failed.push(path.clone());
                }
            }
        }

        let folder_dirs: HashSet<PathBuf> = store.folders()
            .map(|folder| self.root.join(folder_dir_name(&folder.name)))
            .collect();
        failed.extend(self.prune_stale(&targets, &folder_dirs).await);

        if failed.is_empty() {
            debug!("Batch wrote {} notes", written);
            Ok(written)
        } else {
            Err(Error::PartialBatch { written, failed })
        }
    }

    /// Deletes note files that are not in `keep`, then any folder directory left empty that no
    /// folder owns. Returns the files that could not be deleted.
    async fn prune_stale(
        &self,
        keep: &BTreeMap<PathBuf, Vec<u8>>,
        folder_dirs: &HashSet<PathBuf>,
    ) -> Vec<PathBuf> {
        let listing = match self.list_notes().await {
            Ok(listing) => listing,
            Err(e) => {
                warn!("Skipping cleanup of stale note files: {}", e);
                return Vec::new();
            }
        };

        let stale = listing.files.iter()
            .map(|file| self.root.join(file))
            .filter(|path| !keep.contains_key(path));
        let removals = stale.map(|path| async move {
            let result = fs::remove_file(&path).await;
            (path, result)
        });

        let mut failed = Vec::new();
        for (path, result) in join_all(removals).await {
            match result {
                Ok(()) => debug!("Removed stale note file {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    error!("Failed to remove stale note file {}: {}", path.display(), e);
                    failed.push(path);
                }
            }
        }

        for folder in &listing.folders {
            let dir = self.root.join(folder);
            if folder_dirs.contains(&dir) {
                continue;
            }
            // Only succeeds when empty; anything else in it is left alone.
            if fs::remove_dir(&dir).await.is_ok() {
                debug!("Removed empty folder directory {}", dir.display());
            }
        }
        failed
    }

    /// Lists note files at the root and one folder level down (not deeper).
    ///
    /// Subfolders that cannot be read are skipped and logged as warnings. A missing root lists
    /// as empty.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn list_notes(&self) -> Result<DiskListing> {
        let mut listing = DiskListing::default();
        let mut read_dir = match fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Notes root not found, returning empty listing.");
                return Ok(listing);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().await?;
            if file_type.is_file() && is_note_file(&name) {
                listing.files.push(name);
            } else if file_type.is_dir() {
                match list_note_files(&entry.path()).await {
                    Ok(inner) => listing.files.extend(
                        inner.into_iter().map(|file| format!("{}/{}", name, file))
                    ),
                    Err(e) => warn!("Skipping unreadable folder '{}': {}", name, e),
                }
                listing.folders.push(name);
            }
        }

        listing.files.sort();
        listing.folders.sort();
        debug!("Listed {} note files in {} folders", listing.files.len(), listing.folders.len());
        Ok(listing)
    }
}

fn is_note_file(name: &str) -> bool {
    name.ends_with(&format!(".{}", NOTE_EXTENSION))
}

async fn list_note_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_note_file(&name) {
            files.push(name);
        }
    }
    Ok(files)
}

async fn write_creating_parent(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes).await
}
