//! Decides when the in-memory note tree is written to its durable tiers.
//!
//! A [`Session`] owns the running [`NoteStore`] and keeps two downstream copies of it:
//!
//! *   the **local cache** ([`LocalCache`]), written synchronously after every mutation and
//!     every content edit, so a crash between edits loses nothing the cache saw;
//! *   the **disk mirror** ([`Mirror`]), written through [`Mirror::batch_write`].
//!
//! # When the mirror is written
//!
//! *   Structural mutations (create, rename, move, delete, import) write immediately. Their
//!     result carries the outcome of that write in an [`Outcome`].
//! *   Content edits are debounced: each [`Session::edit`] restarts a quiet period
//!     (`quiescence`), and only when it elapses is the edited text committed to the store and
//!     the store mirrored. A burst of edits produces exactly one write.
//! *   [`Session::save`] and [`Session::shutdown`] flush any pending edit at once.
//!
//! Progress is published as a [`SyncStatus`] on a `watch` channel: `Idle → Saving → Saved →
//! Idle`, or `Saving → Error → Idle`. The status is advisory only; it never blocks edits.
//!
//! # Startup
//!
//! [`Session::load`] reads the cache, then the mirror; a readable mirror replaces the cached
//! state in full (see [`load_tiers`]).

pub use self::cache::{CacheError, FileCache, LocalCache, MemoryCache};
pub use self::debounce::Debouncer;
pub use self::tiers::{load_tiers, LoadSource, Mirror};

mod cache;
mod debounce;
mod tiers;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, instrument, warn};

use crate::interchange::ImportedNote;
use crate::storage;
use crate::store::{ItemId, ItemKind, NoteStore, StoreError};

/// How long `Saved` or `Error` stays visible before the status falls back to `Idle`.
pub const STATUS_RESET_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error(String),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Disk mirror write failed")]
    Storage(#[from] storage::Error),
}

/// A mutation that was applied, together with the result of mirroring it.
///
/// A failed write does not undo the mutation: the store and the local cache keep it, and the
/// next successful write brings the mirror up to date.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub persisted: storage::Result<usize>,
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        self.persisted.is_ok()
    }

    pub fn into_result(self) -> Result<T, SyncError> {
        self.persisted?;
        Ok(self.value)
    }
}

#[derive(Debug, Clone)]
struct Draft {
    note_id: ItemId,
    content: String,
}

struct Shared {
    store: Mutex<NoteStore>,
    draft: Mutex<Option<Draft>>,
    mirror: Arc<dyn Mirror>,
    cache: Arc<dyn LocalCache>,
    /// Held for the whole of a mirror write so batches never overlap.
    writing: tokio::sync::Mutex<()>,
    status: watch::Sender<SyncStatus>,
    /// Bumped on every status change; a pending reset only fires if it is still current.
    status_generation: AtomicU64,
}

impl Shared {
    fn store(&self) -> MutexGuard<'_, NoteStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn draft(&self) -> MutexGuard<'_, Option<Draft>> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> NoteStore {
        self.store().clone()
    }

    /// Applies a mutation and writes the result to the local cache.
    fn update<T>(&self, f: impl FnOnce(&mut NoteStore) -> T) -> T {
        let mut store = self.store();
        let value = f(&mut *store);
        self.save_cache(&store);
        value
    }

    /// Like [`Shared::update`], but a rejected mutation leaves the cache untouched.
    fn try_update<T>(&self, f: impl FnOnce(&mut NoteStore) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut store = self.store();
        let value = f(&mut *store)?;
        self.save_cache(&store);
        Ok(value)
    }

    /// Caches the store as the editor sees it: any uncommitted edit is applied on top.
    fn save_cache(&self, store: &NoteStore) {
        let draft = self.draft().clone();
        let result = match draft {
            Some(draft) if store.note(&draft.note_id).is_some() => {
                let mut overlay = store.clone();
                let _ = overlay.set_content(&draft.note_id, draft.content);
                self.cache.save(&overlay)
            }
            _ => self.cache.save(store),
        };
        if let Err(e) = result {
            warn!("Failed to update local cache: {}", e);
        }
    }

    /// Records an uncommitted edit and caches the store as it would look with it applied.
    fn stage_draft(&self, draft: Draft) {
        *self.draft() = Some(draft);
        let store = self.store();
        self.save_cache(&store);
    }

    /// Moves the pending edit, if any, into the store. Returns whether anything was committed.
    fn commit_draft(&self) -> bool {
        let Some(draft) = self.draft().take() else {
            return false;
        };
        match self.try_update(|store| store.set_content(&draft.note_id, draft.content)) {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping edit for a note that no longer exists: {}", e);
                false
            }
        }
    }

    fn discard_draft(&self) {
        self.draft().take();
    }

    async fn persist(self: &Arc<Self>) -> storage::Result<usize> {
        let _writing = self.writing.lock().await;
        let snapshot = self.snapshot();
        self.set_status(SyncStatus::Saving);
        let result = self.mirror.batch_write(&snapshot).await;
        match &result {
            Ok(count) => {
                debug!("Mirrored {} notes", count);
                self.set_status(SyncStatus::Saved);
            }
            Err(e) => {
                error!("Failed to mirror note store: {}", e);
                self.set_status(SyncStatus::Error(e.to_string()));
            }
        }
        result
    }

    fn set_status(self: &Arc<Self>, status: SyncStatus) {
        let settles = matches!(status, SyncStatus::Saved | SyncStatus::Error(_));
        let mut generation = 0;
        self.status.send_modify(|current| {
            generation = self.status_generation.fetch_add(1, Ordering::SeqCst) + 1;
            *current = status;
        });
        if settles {
            let shared: Weak<Self> = Arc::downgrade(self);
            tokio::spawn(async move {
                tokio::time::sleep(STATUS_RESET_DELAY).await;
                let Some(shared) = shared.upgrade() else {
                    return;
                };
                shared.status.send_if_modified(|current| {
                    if shared.status_generation.load(Ordering::SeqCst) != generation {
                        return false;
                    }
                    *current = SyncStatus::Idle;
                    true
                });
            });
        }
    }
}

/// An editing session over one note tree.
///
/// Must be used from within a tokio runtime.
pub struct Session {
    shared: Arc<Shared>,
    active: Option<ItemId>,
    debouncer: Debouncer,
}

impl Session {
    pub fn new(
        store: NoteStore,
        mirror: Arc<dyn Mirror>,
        cache: Arc<dyn LocalCache>,
        quiescence: Duration,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Session {
            shared: Arc::new(Shared {
                store: Mutex::new(store),
                draft: Mutex::new(None),
                mirror,
                cache,
                writing: tokio::sync::Mutex::new(()),
                status,
                status_generation: AtomicU64::new(0),
            }),
            active: None,
            debouncer: Debouncer::new(quiescence),
        }
    }

    /// Builds a session from whatever the cache and mirror hold (mirror first).
    #[instrument(skip_all)]
    pub async fn load(
        mirror: Arc<dyn Mirror>,
        cache: Arc<dyn LocalCache>,
        quiescence: Duration,
    ) -> (Self, LoadSource) {
        let (store, source) = load_tiers(cache.as_ref(), mirror.as_ref()).await;
        debug!(?source, "Session loaded");
        (Session::new(store, mirror, cache, quiescence), source)
    }

    /// A copy of the committed store (pending edits excluded).
    pub fn snapshot(&self) -> NoteStore {
        self.shared.snapshot()
    }

    pub fn read<R>(&self, f: impl FnOnce(&NoteStore) -> R) -> R {
        f(&self.shared.store())
    }

    pub fn active_note(&self) -> Option<&ItemId> {
        self.active.as_ref()
    }

    /// Text of the open note as the editor sees it, including any uncommitted edit.
    pub fn editor_content(&self) -> Option<String> {
        let active = self.active.as_ref()?;
        if let Some(draft) = self.shared.draft().as_ref().filter(|d| &d.note_id == active) {
            return Some(draft.content.clone());
        }
        self.shared.store().note(active).map(|note| note.content.clone())
    }

    pub fn status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub async fn create_folder(&mut self) -> Outcome<ItemId> {
        let id = self.shared.update(NoteStore::create_folder);
        self.persisted(id).await
    }

    pub async fn create_note(&mut self) -> Outcome<ItemId> {
        let id = self.shared.update(NoteStore::create_note);
        self.persisted(id).await
    }

    /// Renames an item. A rejected rename (blank name, unknown id) changes and writes nothing.
    pub async fn rename(&mut self, id: &ItemId, kind: ItemKind, name: &str) -> Result<Outcome<()>, StoreError> {
        self.apply(|store| store.rename(id, kind, name))?;
        Ok(self.persisted(()).await)
    }

    /// Moves a note into a folder. Unknown notes or folders are rejected without a write.
    pub async fn move_note(&mut self, note_id: &ItemId, folder_id: &ItemId) -> Result<Outcome<()>, StoreError> {
        self.apply(|store| store.move_note(note_id, folder_id))?;
        Ok(self.persisted(()).await)
    }

    /// Deletes a folder (its notes move to the root) or a note. Deleting the open note closes
    /// it and drops its unsaved edit.
    pub async fn delete(&mut self, id: &ItemId, kind: ItemKind) -> Result<Outcome<()>, StoreError> {
        self.apply(|store| store.delete(id, kind))?;
        if kind == ItemKind::Note && self.active.as_ref() == Some(id) {
            debug!(%id, "Closing deleted note");
            self.debouncer.cancel();
            self.shared.discard_draft();
            self.active = None;
        }
        Ok(self.persisted(()).await)
    }

    /// Makes a note the target of [`Session::edit`] and returns its content.
    ///
    /// A pending edit to the previously open note is committed to the store and cache first;
    /// its scheduled disk write still happens.
    pub fn open_note(&mut self, id: &ItemId) -> Result<String, StoreError> {
        if self.active.as_ref() == Some(id) {
            if let Some(content) = self.editor_content() {
                return Ok(content);
            }
        }
        let content = self.shared.store().note(id)
            .map(|note| note.content.clone())
            .ok_or_else(|| StoreError::UnknownNote(id.clone()))?;
        self.shared.commit_draft();
        self.active = Some(id.clone());
        Ok(content)
    }

    /// Closes the open note, committing a pending edit to the store and cache.
    pub fn close_note(&mut self) {
        self.shared.commit_draft();
        self.active = None;
    }

    /// Replaces the open note's text.
    ///
    /// The edit is cached right away; it is committed to the store and mirrored once no further
    /// edit arrives within the quiet period. Returns `false` (and does nothing) if no note is open.
    pub fn edit(&mut self, content: impl Into<String>) -> bool {
        let Some(note_id) = self.active.clone() else {
            debug!("Ignoring edit with no open note");
            return false;
        };
        self.shared.stage_draft(Draft { note_id, content: content.into() });
        self.shared.set_status(SyncStatus::Saving);

        let shared = self.shared.clone();
        self.debouncer.schedule(async move {
            shared.commit_draft();
            let _ = shared.persist().await;
        });
        true
    }

    /// Commits any pending edit and mirrors the store now.
    pub async fn save(&mut self) -> Result<usize, SyncError> {
        self.debouncer.cancel();
        self.shared.commit_draft();
        Ok(self.shared.persist().await?)
    }

    /// Swaps in a whole new tree (database import). The open note is closed and any pending
    /// edit is dropped. Returns the previous tree.
    pub async fn replace_store(&mut self, store: NoteStore) -> Outcome<NoteStore> {
        self.debouncer.cancel();
        self.shared.discard_draft();
        self.active = None;
        let previous = self.shared.update(|current| current.replace_with(store));
        self.persisted(previous).await
    }

    /// Adds notes found by a folder import.
    pub async fn merge_imported(&mut self, notes: Vec<ImportedNote>) -> Outcome<usize> {
        let count = self.shared.update(|store| store.merge_imported(notes));
        self.persisted(count).await
    }

    /// Flushes a pending edit, if any, and ends the session.
    pub async fn shutdown(mut self) -> Result<(), SyncError> {
        let was_pending = self.debouncer.cancel();
        let committed = self.shared.commit_draft();
        if was_pending || committed {
            self.shared.persist().await?;
        }
        Ok(())
    }

    fn apply<T>(&self, f: impl FnOnce(&mut NoteStore) -> Result<T, StoreError>) -> Result<T, StoreError> {
        self.shared.try_update(f).inspect_err(|e| debug!("Rejected mutation: {}", e))
    }

    async fn persisted<T>(&self, value: T) -> Outcome<T> {
        let persisted = self.shared.persist().await;
        Outcome { value, persisted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use async_trait::async_trait;

    /// Mirror that records every batch it is asked to write.
    #[derive(Default)]
    struct RecordingMirror {
        stored: Mutex<Option<NoteStore>>,
        writes: Mutex<Vec<NoteStore>>,
        fail: AtomicBool,
        corrupt: AtomicBool,
    }

    impl RecordingMirror {
        fn with_store(store: NoteStore) -> Self {
            RecordingMirror { stored: Mutex::new(Some(store)), ..Default::default() }
        }

        fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }

        fn last_write(&self) -> NoteStore {
            self.writes.lock().unwrap().last().cloned().expect("at least one write")
        }
    }

    #[async_trait]
    impl Mirror for RecordingMirror {
        async fn read_store(&self) -> storage::Result<Option<NoteStore>> {
            if self.corrupt.load(Ordering::SeqCst) {
                return Err(storage::Error::Codec(crate::codec::CodecError::InvalidFormat));
            }
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn batch_write(&self, store: &NoteStore) -> storage::Result<usize> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(storage::Error::PartialBatch { written: 0, failed: vec!["x.snote".into()] });
            }
            self.writes.lock().unwrap().push(store.clone());
            Ok(store.note_count())
        }
    }

    const QUIET: Duration = Duration::from_millis(500);

    fn session_with(mirror: &Arc<RecordingMirror>, cache: &Arc<MemoryCache>) -> Session {
        Session::new(NoteStore::new(), mirror.clone(), cache.clone(), QUIET)
    }

    fn fixtures() -> (Arc<RecordingMirror>, Arc<MemoryCache>) {
        (Arc::new(RecordingMirror::default()), Arc::new(MemoryCache::new()))
    }

    #[tokio::test]
    async fn test_structural_mutations_write_immediately() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);

        let folder = session.create_folder().await.into_result().unwrap();
        let note = session.create_note().await.into_result().unwrap();
        session.rename(&note, ItemKind::Note, "todo.txt").await.unwrap().into_result().unwrap();
        session.move_note(&note, &folder).await.unwrap().into_result().unwrap();
        session.delete(&folder, ItemKind::Folder).await.unwrap().into_result().unwrap();

        assert_eq!(mirror.write_count(), 5);
        let last = mirror.last_write();
        assert_eq!(last.note(&note).unwrap().folder_id, None);
        assert_eq!(cache.load().unwrap(), Some(last));
        assert_eq!(session.status(), SyncStatus::Saved);
    }

    #[tokio::test]
    async fn test_rejected_mutations_write_nothing() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;

        assert_eq!(session.rename(&note, ItemKind::Note, "  ").await.unwrap_err(), StoreError::EmptyName);
        assert!(session.move_note(&note, &ItemId::from("folder_missing")).await.is_err());
        assert!(session.delete(&ItemId::from("file_missing"), ItemKind::Note).await.is_err());

        assert_eq!(mirror.write_count(), 1);
        assert_eq!(session.snapshot().note(&note).unwrap().name, "New File.txt");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_burst_produces_one_write_after_quiet_period() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;
        session.open_note(&note).unwrap();
        let before = mirror.write_count();

        for text in ["h", "he", "hel", "hell", "hello"] {
            assert!(session.edit(text));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        // Edits are cached at once but not yet committed.
        assert_eq!(cache.load().unwrap().unwrap().note(&note).unwrap().content, "hello");
        assert_eq!(session.snapshot().note(&note).unwrap().content, "");
        assert_eq!(session.editor_content().as_deref(), Some("hello"));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(mirror.write_count(), before);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(mirror.write_count(), before + 1);
        assert_eq!(mirror.last_write().note(&note).unwrap().content, "hello");
        assert_eq!(session.snapshot().note(&note).unwrap().content, "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_without_open_note_is_ignored() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);

        assert!(!session.edit("lost"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(mirror.write_count(), 0);
        assert_eq!(cache.cached_len(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_notes_commits_previous_draft() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let first = session.create_note().await.value;
        let second = session.create_note().await.value;

        session.open_note(&first).unwrap();
        session.edit("first draft");
        assert_eq!(session.open_note(&second).unwrap(), "");

        assert_eq!(session.snapshot().note(&first).unwrap().content, "first draft");
        assert_eq!(session.active_note(), Some(&second));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(mirror.last_write().note(&first).unwrap().content, "first draft");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleting_open_note_closes_it_and_cancels_flush() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;
        session.open_note(&note).unwrap();
        session.edit("doomed");

        session.delete(&note, ItemKind::Note).await.unwrap().into_result().unwrap();
        let writes = mirror.write_count();
        assert_eq!(session.active_note(), None);
        assert!(!session.edit("more"));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(mirror.write_count(), writes);
        assert!(mirror.last_write().note(&note).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_structural_change_keeps_pending_edit_in_cache() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;
        session.open_note(&note).unwrap();
        session.edit("unsaved work");

        session.create_folder().await.into_result().unwrap();
        let other = session.create_note().await.value;
        session.rename(&other, ItemKind::Note, "other.txt").await.unwrap().into_result().unwrap();

        let cached = cache.load().unwrap().unwrap();
        assert_eq!(cached.note(&note).unwrap().content, "unsaved work");
        assert_eq!(cached.note(&other).unwrap().name, "other.txt");
        // Still only staged: the committed store has no content yet.
        assert_eq!(session.snapshot().note(&note).unwrap().content, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_reset_waits_for_latest_save() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);

        session.create_note().await.into_result().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        session.create_note().await.into_result().unwrap();

        // The first save's reset is due now, but a newer save superseded it.
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(session.status(), SyncStatus::Saved);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(session.status(), SyncStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_reports_error_then_idles() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let mut status = session.subscribe();
        mirror.fail.store(true, Ordering::SeqCst);

        let outcome = session.create_note().await;

        assert!(!outcome.is_success());
        assert!(matches!(outcome.persisted, Err(storage::Error::PartialBatch { .. })));
        // The mutation stands even though the mirror write failed.
        assert_eq!(session.snapshot().note_count(), 1);
        assert_eq!(cache.load().unwrap().unwrap().note_count(), 1);
        assert!(matches!(*status.borrow_and_update(), SyncStatus::Error(_)));

        tokio::time::sleep(STATUS_RESET_DELAY + Duration::from_millis(10)).await;
        assert_eq!(session.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_explicit_save_flushes_now() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;
        session.open_note(&note).unwrap();
        session.edit("saved by hand");

        assert_eq!(session.save().await.unwrap(), 1);
        assert_eq!(mirror.last_write().note(&note).unwrap().content, "saved by hand");
    }

    #[tokio::test]
    async fn test_shutdown_flushes_pending_edit() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;
        session.open_note(&note).unwrap();
        session.edit("last words");
        let writes = mirror.write_count();

        session.shutdown().await.unwrap();

        assert_eq!(mirror.write_count(), writes + 1);
        assert_eq!(mirror.last_write().note(&note).unwrap().content, "last words");
    }

    #[tokio::test]
    async fn test_replace_store_closes_open_note() {
        let (mirror, cache) = fixtures();
        let mut session = session_with(&mirror, &cache);
        let note = session.create_note().await.value;
        session.open_note(&note).unwrap();

        let mut incoming = NoteStore::new();
        incoming.create_folder();
        let previous = session.replace_store(incoming.clone()).await.into_result().unwrap();

        assert_eq!(previous.note_count(), 1);
        assert_eq!(session.active_note(), None);
        assert_eq!(session.snapshot(), incoming);
        assert_eq!(mirror.last_write(), incoming);
    }

    #[tokio::test]
    async fn test_load_prefers_mirror_over_cache() {
        let mut mirrored = NoteStore::new();
        mirrored.create_folder();
        let mut cached = NoteStore::new();
        cached.create_note();
        let cache = Arc::new(MemoryCache::new());
        cache.save(&cached).unwrap();
        let mirror = Arc::new(RecordingMirror::with_store(mirrored.clone()));

        let (session, source) = Session::load(mirror, cache, QUIET).await;

        assert_eq!(source, LoadSource::Mirror);
        assert_eq!(session.snapshot(), mirrored);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_cache() {
        let mut cached = NoteStore::new();
        cached.create_note();
        let cache = Arc::new(MemoryCache::new());
        cache.save(&cached).unwrap();

        let empty_mirror = Arc::new(RecordingMirror::default());
        let (session, source) = Session::load(empty_mirror, cache.clone(), QUIET).await;
        assert_eq!(source, LoadSource::Cache);
        assert_eq!(session.snapshot(), cached);

        let corrupt_mirror = Arc::new(RecordingMirror::default());
        corrupt_mirror.corrupt.store(true, Ordering::SeqCst);
        let (session, source) = Session::load(corrupt_mirror, cache, QUIET).await;
        assert_eq!(source, LoadSource::Cache);
        assert_eq!(session.snapshot(), cached);
    }

    #[tokio::test]
    async fn test_load_with_nothing_is_empty() {
        let (mirror, cache) = fixtures();
        let (session, source) = Session::load(mirror, cache, QUIET).await;
        assert_eq!(source, LoadSource::Empty);
        assert!(session.snapshot().is_empty());
    }
}
