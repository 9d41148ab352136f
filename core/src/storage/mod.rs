//! Mirrors the note tree onto a directory the application owns.
//!
//! # Layout
//!
//! All files live under a single notes root (see [`DiskMirror::root`]):
//!
//! ```text
//! <notes root>/
//! ├── .filesystem.snotes      whole-store payload (see crate::codec)
//! ├── Loose note.snote        notes without a folder
//! └── Work/                   one directory per folder name
//!     └── todo.snote
//! ```
//!
//! *   The **whole-store file** is the authoritative copy; it is overwritten in full on every
//!     write and is what [`DiskMirror::read_store`] reads back on startup.
//! *   **Per-note files** hold raw UTF-8 note text. They exist so notes can be read with any
//!     tool, and are never read back into the store except through an explicit folder import.
//!
//! # Names
//!
//! Note and folder names are user text. Before they become path components the characters
//! `<>:"/\|?*` are replaced with `_` (see [`sanitize_name`]). A note name that already ends in
//! `.txt` or `.snote` has that suffix dropped before the note extension is appended, so
//! `todo.txt` is stored as `todo.snote` and not `todo.txt.snote`.
//!
//! # Batches
//!
//! [`DiskMirror::batch_write`] writes the whole-store file and every per-note file
//! concurrently. There is no atomicity across the batch: writes that succeed stay on disk even
//! if others fail, and the failures are reported as [`Error::PartialBatch`].
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use snotes_core::storage::DiskMirror;
//! use snotes_core::store::NoteStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mirror = DiskMirror::new("/tmp/notes");
//!     mirror.ensure_root().await?;
//!
//!     let mut store = mirror.read_store().await?.unwrap_or_default();
//!     store.create_note();
//!
//!     let written = mirror.batch_write(&store).await?;
//!     println!("{} notes on disk", written);
//!     Ok(())
//! }
//! ```

pub use self::mirror::{DiskListing, DiskMirror};
pub use self::names::{folder_dir_name, note_file_name, sanitize_name};

mod mirror;
mod names;

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;

/// Extension of per-note files, without the leading dot.
pub const NOTE_EXTENSION: &str = "snote";
/// Extension used for plain-text interchange.
pub const TEXT_EXTENSION: &str = "txt";
/// Name of the whole-store file directly under the notes root.
pub const STORE_FILE_NAME: &str = ".filesystem.snotes";

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Whole-store payload could not be encoded or decoded")]
    Codec(#[from] CodecError),

    #[error("Cannot create notes root: path exists and is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    #[error("Batch write incomplete: {} path(s) failed, {written} note(s) written", .failed.len())]
    PartialBatch {
        written: usize,
        failed: Vec<PathBuf>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
