use std::path::{Path, PathBuf};
use std::time::Duration;

/// Quiet period after the last edit before a note is flushed to disk.
pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(500);

/// Directory under the platform data/cache directories owned by this application.
pub const APP_DIR_NAME: &str = "simple-notes";

const NOTES_DIR_NAME: &str = "notes";
const CACHE_FILE_NAME: &str = "notes-cache.json";

/// Where a session keeps its data and how eagerly it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesConfig {
    /// Root of the disk mirror.
    pub notes_root: PathBuf,
    /// File backing the fast local cache.
    pub cache_file: PathBuf,
    pub quiescence: Duration,
}

impl NotesConfig {
    /// Platform defaults, e.g. `~/.local/share/simple-notes/notes` and
    /// `~/.cache/simple-notes/notes-cache.json` on Linux.
    ///
    /// Returns `None` if the platform reports no data directory.
    pub fn platform_default() -> Option<Self> {
        let data = dirs::data_dir()?.join(APP_DIR_NAME);
        let cache = dirs::cache_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| data.clone());
        Some(NotesConfig {
            notes_root: data.join(NOTES_DIR_NAME),
            cache_file: cache.join(CACHE_FILE_NAME),
            quiescence: DEFAULT_QUIESCENCE,
        })
    }

    /// Keeps everything under one base directory.
    pub fn in_dir(base: &Path) -> Self {
        NotesConfig {
            notes_root: base.join(NOTES_DIR_NAME),
            cache_file: base.join(CACHE_FILE_NAME),
            quiescence: DEFAULT_QUIESCENCE,
        }
    }

    pub fn with_cache_file(mut self, cache_file: impl Into<PathBuf>) -> Self {
        self.cache_file = cache_file.into();
        self
    }

    pub fn with_quiescence(mut self, quiescence: Duration) -> Self {
        self.quiescence = quiescence;
        self
    }
}
