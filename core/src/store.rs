//! The in-memory note tree.
//!
//! [`NoteStore`] is the single source of truth for a running session. It holds a flat map of
//! [`Folder`]s and a flat map of [`Note`]s; the tree shape comes from each note's optional
//! `folder_id`. The mutation methods on [`NoteStore`] are the only write path, and each one
//! either applies completely or returns a [`StoreError`] without touching anything.
//!
//! # Invariant
//!
//! Every `folder_id` held by a note names a folder that currently exists. Deleting a folder
//! reparents its notes to the root instead of deleting them, and moving a note into an unknown
//! folder is rejected.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::interchange::ImportedNote;

pub const DEFAULT_FOLDER_NAME: &str = "New Folder";
pub const DEFAULT_NOTE_NAME: &str = "New File.txt";

const FOLDER_ID_PREFIX: &str = "folder";
const NOTE_ID_PREFIX: &str = "file";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("No folder with id {0}")]
    UnknownFolder(ItemId),

    #[error("No note with id {0}")]
    UnknownNote(ItemId),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Identifier of a folder or a note.
///
/// Fresh ids are a kind prefix plus a time-ordered UUID, so iteration over a store's maps
/// follows creation order. Ids read back from older payloads are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    fn generate(prefix: &str) -> Self {
        ItemId(format!("{}_{}", prefix, Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        ItemId(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    Note,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Folder => f.write_str("folder"),
            ItemKind::Note => f.write_str("note"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: ItemId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub content: String,
    /// `None` places the note at the root.
    #[serde(default)]
    pub folder_id: Option<ItemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteStore {
    #[serde(default)]
    folders: BTreeMap<ItemId, Folder>,
    #[serde(rename = "files", default)]
    notes: BTreeMap<ItemId, Note>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(&self, id: &ItemId) -> Option<&Folder> {
        self.folders.get(id)
    }

    pub fn note(&self, id: &ItemId) -> Option<&Note> {
        self.notes.get(id)
    }

    pub fn folders(&self) -> impl Iterator<Item = &Folder> {
        self.folders.values()
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values()
    }

    /// Notes placed directly in the given folder.
    pub fn notes_in<'a>(&'a self, folder_id: &'a ItemId) -> impl Iterator<Item = &'a Note> {
        self.notes
            .values()
            .filter(move |note| note.folder_id.as_ref() == Some(folder_id))
    }

    pub fn root_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.values().filter(|note| note.folder_id.is_none())
    }

    /// First folder (in id order) with exactly this name.
    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.values().find(|folder| folder.name == name)
    }

    pub fn note_by_name(&self, name: &str) -> Option<&Note> {
        self.notes.values().find(|note| note.name == name)
    }

    /// Name of the folder a note lives in, or `None` for root notes.
    pub fn folder_name_of(&self, note: &Note) -> Option<&str> {
        note.folder_id
            .as_ref()
            .and_then(|id| self.folders.get(id))
            .map(|folder| folder.name.as_str())
    }

    pub fn kind_of(&self, id: &ItemId) -> Option<ItemKind> {
        if self.folders.contains_key(id) {
            Some(ItemKind::Folder)
        } else if self.notes.contains_key(id) {
            Some(ItemKind::Note)
        } else {
            None
        }
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.notes.is_empty()
    }

    /// Notes whose `folder_id` points at a folder that does not exist.
    ///
    /// Always empty for stores built through the mutation methods; a decoded payload may
    /// violate this if it was edited by hand.
    pub fn dangling_references(&self) -> Vec<&Note> {
        self.notes
            .values()
            .filter(|note| {
                note.folder_id
                    .as_ref()
                    .is_some_and(|id| !self.folders.contains_key(id))
            })
            .collect()
    }

    pub fn create_folder(&mut self) -> ItemId {
        self.insert_folder(DEFAULT_FOLDER_NAME.to_string())
    }

    pub fn create_note(&mut self) -> ItemId {
        let id = ItemId::generate(NOTE_ID_PREFIX);
        self.notes.insert(id.clone(), Note {
            id: id.clone(),
            name: DEFAULT_NOTE_NAME.to_string(),
            content: String::new(),
            folder_id: None,
        });
        debug!(%id, "Created note");
        id
    }

    /// Renames a folder or note. The new name is trimmed; blank names are rejected.
    pub fn rename(&mut self, id: &ItemId, kind: ItemKind, new_name: &str) -> Result<()> {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let slot = match kind {
            ItemKind::Folder => self.folders.get_mut(id)
                .map(|folder| &mut folder.name)
                .ok_or_else(|| StoreError::UnknownFolder(id.clone()))?,
            ItemKind::Note => self.notes.get_mut(id)
                .map(|note| &mut note.name)
                .ok_or_else(|| StoreError::UnknownNote(id.clone()))?,
        };
        *slot = trimmed.to_string();
        debug!(%id, %kind, name = trimmed, "Renamed item");
        Ok(())
    }

    /// Moves a note into an existing folder.
    pub fn move_note(&mut self, note_id: &ItemId, target_folder: &ItemId) -> Result<()> {
        if !self.folders.contains_key(target_folder) {
            return Err(StoreError::UnknownFolder(target_folder.clone()));
        }
        let note = self.notes.get_mut(note_id)
            .ok_or_else(|| StoreError::UnknownNote(note_id.clone()))?;
        note.folder_id = Some(target_folder.clone());
        debug!(%note_id, %target_folder, "Moved note");
        Ok(())
    }

    pub fn delete(&mut self, id: &ItemId, kind: ItemKind) -> Result<()> {
        match kind {
            ItemKind::Folder => self.delete_folder(id).map(|_| ()),
            ItemKind::Note => self.delete_note(id).map(|_| ()),
        }
    }

    /// Removes a folder after moving its notes to the root. Returns the number of notes moved.
    pub fn delete_folder(&mut self, id: &ItemId) -> Result<usize> {
        if !self.folders.contains_key(id) {
            return Err(StoreError::UnknownFolder(id.clone()));
        }
        let mut reparented = 0;
        for note in self.notes.values_mut() {
            if note.folder_id.as_ref() == Some(id) {
                note.folder_id = None;
                reparented += 1;
            }
        }
        self.folders.remove(id);
        debug!(%id, reparented, "Deleted folder");
        Ok(reparented)
    }

    pub fn delete_note(&mut self, id: &ItemId) -> Result<Note> {
        let note = self.notes.remove(id)
            .ok_or_else(|| StoreError::UnknownNote(id.clone()))?;
        debug!(%id, "Deleted note");
        Ok(note)
    }

    pub fn set_content(&mut self, note_id: &ItemId, content: impl Into<String>) -> Result<()> {
        let note = self.notes.get_mut(note_id)
            .ok_or_else(|| StoreError::UnknownNote(note_id.clone()))?;
        note.content = content.into();
        Ok(())
    }

    /// Adds notes produced by a folder import.
    ///
    /// Each note gets a fresh id. A folder name is resolved to the first existing folder with
    /// that name, or a new folder is created for it (and reused by later notes in the batch).
    pub fn merge_imported(&mut self, imported: Vec<ImportedNote>) -> usize {
        let count = imported.len();
        for entry in imported {
            let folder_id = entry.folder.map(|name| match self.folder_by_name(&name) {
                Some(existing) => existing.id.clone(),
                None => self.insert_folder(name),
            });
            let id = ItemId::generate(NOTE_ID_PREFIX);
            self.notes.insert(id.clone(), Note {
                id,
                name: entry.name,
                content: entry.content,
                folder_id,
            });
        }
        debug!(count, "Merged imported notes");
        count
    }

    /// Swaps in an entirely new tree, returning the previous one.
    pub fn replace_with(&mut self, store: NoteStore) -> NoteStore {
        std::mem::replace(self, store)
    }

    fn insert_folder(&mut self, name: String) -> ItemId {
        let id = ItemId::generate(FOLDER_ID_PREFIX);
        self.folders.insert(id.clone(), Folder { id: id.clone(), name });
        debug!(%id, "Created folder");
        id
    }
}
