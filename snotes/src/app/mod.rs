use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use snotes_core::config::NotesConfig;
use snotes_core::storage::DiskMirror;
use snotes_core::store::{ItemId, ItemKind, Note, NoteStore};
use snotes_core::sync::{FileCache, LoadSource, Session};
use tracing::info;

mod prompt;
pub use prompt::confirm;

/// A loaded notes session together with the configuration it was opened from.
pub struct Notes {
    pub config: NotesConfig,
    pub mirror: DiskMirror,
    pub session: Session,
}

impl Notes {
    /// Creates the notes directory if needed and loads the latest state (disk first, then cache).
    pub async fn open(config: NotesConfig) -> anyhow::Result<Self> {
        let mirror = DiskMirror::new(&config.notes_root);
        mirror.ensure_root().await
            .with_context(|| format!("Cannot use notes directory {}", config.notes_root.display()))?;

        let cache = FileCache::new(&config.cache_file);
        let (session, source) = Session::load(
            Arc::new(mirror.clone()),
            Arc::new(cache),
            config.quiescence,
        ).await;
        if source == LoadSource::Empty {
            info!("Starting with an empty notes tree");
        }
        info!(root = %config.notes_root.display(), ?source, "Notes loaded");

        Ok(Notes { config, mirror, session })
    }

    pub fn note(&self, id: &ItemId) -> anyhow::Result<Note> {
        self.session.read(|store| store.note(id).cloned())
            .with_context(|| format!("No note with ID {}", id))
    }

    pub fn kind_of(&self, id: &ItemId) -> anyhow::Result<ItemKind> {
        self.session.read(|store| store.kind_of(id))
            .with_context(|| format!("No note or folder with ID {}", id))
    }

    /// Flushes any pending edit and ends the session.
    pub async fn close(self) -> anyhow::Result<()> {
        self.session.shutdown().await
            .context("Failed to write pending changes to the notes directory")
    }
}

/// Folders (alphabetically, each with its notes) followed by top-level notes.
pub fn render_tree(store: &NoteStore) -> String {
    fn sorted<'a>(mut notes: Vec<&'a Note>) -> Vec<&'a Note> {
        notes.sort_by(|a, b| a.name.cmp(&b.name));
        notes
    }

    let mut folders: Vec<_> = store.folders().collect();
    folders.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    for folder in folders {
        let _ = writeln!(out, "{}/  [{}]", folder.name, folder.id);
        for note in sorted(store.notes_in(&folder.id).collect()) {
            let _ = writeln!(out, "    {}  [{}]", note.name, note.id);
        }
    }
    for note in sorted(store.root_notes().collect()) {
        let _ = writeln!(out, "{}  [{}]", note.name, note.id);
    }
    out
}
