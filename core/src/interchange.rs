//! Bulk import and export between the note tree and plain files chosen by the user.
//!
//! Two interchange shapes are supported:
//!
//! *   A **folder tree** of `.txt` files, one subdirectory per folder ([`export_all`],
//!     [`scan_folder`]). Scanning never touches the store; the caller merges the returned
//!     [`ImportedNote`]s (see [`NoteStore::merge_imported`]).
//! *   A single **database file** holding the whole store as pretty JSON
//!     ([`export_database`], [`import_database`]).

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, instrument};

use crate::codec::{self, CodecError};
use crate::storage::{folder_dir_name, note_file_name, NOTE_EXTENSION, TEXT_EXTENSION};
use crate::store::NoteStore;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Interchange data could not be encoded or decoded")]
    Codec(#[from] CodecError),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A note found by [`scan_folder`], not yet part of any store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedNote {
    pub name: String,
    pub content: String,
    /// Parent directory relative to the scan root, `/`-separated. `None` at the root.
    pub folder: Option<String>,
}

/// Writes every note as `<name>.txt`, inside a directory named after its folder.
///
/// Returns the number of notes written.
#[instrument(skip(store, export_root), fields(export_root = %export_root.display()))]
pub async fn export_all(store: &NoteStore, export_root: &Path) -> Result<usize> {
    fs::create_dir_all(export_root).await?;
    try_join_all(store.folders().map(|folder| {
        fs::create_dir_all(export_root.join(folder_dir_name(&folder.name)))
    })).await?;

    let writes = store.notes().map(|note| {
        let dir = match store.folder_name_of(note) {
            Some(folder) => export_root.join(folder_dir_name(folder)),
            None => export_root.to_path_buf(),
        };
        let path = dir.join(note_file_name(&note.name, TEXT_EXTENSION));
        fs::write(path, note.content.as_bytes())
    });
    let count = try_join_all(writes).await?.len();
    debug!("Exported {} notes", count);
    Ok(count)
}

/// Suggested file name when exporting a single note as text.
pub fn default_export_name(name: &str) -> String {
    match name.strip_suffix(&format!(".{}", NOTE_EXTENSION)) {
        Some(stem) => format!("{}.{}", stem, TEXT_EXTENSION),
        None => name.to_string(),
    }
}

/// Writes one note's text to a user-chosen path.
#[instrument(skip(content, dest), fields(dest = %dest.display()))]
pub async fn export_note(content: &str, dest: &Path) -> Result<()> {
    fs::write(dest, content.as_bytes()).await?;
    debug!("Exported note");
    Ok(())
}

/// Recursively collects `.txt` and `.snote` files under `root`.
///
/// `.snote` files are renamed to `.txt` in the result. Other files are ignored. The result is
/// sorted by folder, then name.
#[instrument(skip(root), fields(root = %root.display()))]
pub async fn scan_folder(root: &Path) -> Result<Vec<ImportedNote>> {
    let meta = fs::metadata(root).await?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let note_suffix = format!(".{}", NOTE_EXTENSION);
    let text_suffix = format!(".{}", TEXT_EXTENSION);
    let mut notes = Vec::new();
    let mut pending: Vec<(PathBuf, Option<String>)> = vec![(root.to_path_buf(), None)];

    while let Some((dir, folder)) = pending.pop() {
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                let child = match &folder {
                    Some(parent) => format!("{}/{}", parent, file_name),
                    None => file_name,
                };
                pending.push((entry.path(), Some(child)));
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            let name = if let Some(stem) = file_name.strip_suffix(&note_suffix) {
                format!("{}{}", stem, text_suffix)
            } else if file_name.ends_with(&text_suffix) {
                file_name
            } else {
                continue;
            };
            let content = codec::decode_note(&fs::read(entry.path()).await?);
            notes.push(ImportedNote { name, content, folder: folder.clone() });
        }
    }

    notes.sort_by(|a, b| (&a.folder, &a.name).cmp(&(&b.folder, &b.name)));
    debug!("Found {} importable notes", notes.len());
    Ok(notes)
}

/// Writes the whole store as pretty JSON.
#[instrument(skip(store, path), fields(path = %path.display()))]
pub async fn export_database(store: &NoteStore, path: &Path) -> Result<()> {
    let json = codec::to_interchange_json(store)?;
    fs::write(path, json).await?;
    debug!("Database exported");
    Ok(())
}

/// Reads a store written by [`export_database`]. The caller decides whether to replace
/// its current tree with it.
#[instrument(skip(path), fields(path = %path.display()))]
pub async fn import_database(path: &Path) -> Result<NoteStore> {
    let json = fs::read_to_string(path).await?;
    let store = codec::from_interchange_json(&json)?;
    debug!("Database read: {} folders, {} notes", store.folder_count(), store.note_count());
    Ok(store)
}
