use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Simple Notes: keep plain-text notes in folders, mirrored to a directory on disk.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Keep the notes directory and cache under this directory instead of the platform default.
    #[arg(long, global = true, env = "SNOTES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the location of the local cache file.
    #[arg(long, global = true, env = "SNOTES_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Quiet period after an edit before it is written to disk, in milliseconds.
    #[arg(long, global = true, env = "SNOTES_DEBOUNCE_MS")]
    pub debounce_ms: Option<u64>,

    /// Increase verbosity (use multiple times for more).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a note at the top level.
    NewFile(NewItemArgs),
    /// Create a folder.
    NewFolder(NewItemArgs),
    /// Rename a note or folder.
    Rename(RenameArgs),
    /// Move a note into a folder.
    Move(MoveArgs),
    /// Delete a note, or a folder (its notes move to the top level).
    Delete(DeleteArgs),
    /// Replace the text of a note.
    Edit(EditArgs),
    /// Write the whole tree to the notes directory now.
    Save,
    /// Show the folder tree.
    List,
    /// Print a note's text.
    Show(ShowArgs),
    /// Export one note as a text file.
    ExportNote(ExportNoteArgs),
    /// Export every note as text files, one directory per folder.
    ExportAll(ExportAllArgs),
    /// Import .txt and .snote files from a directory tree.
    ImportFolder(ImportArgs),
    /// Export the whole tree as a JSON database file.
    ExportDb(ExportDbArgs),
    /// Replace the whole tree with a JSON database file.
    ImportDb(ImportArgs),
    /// List the note files currently in the notes directory.
    Disk,
}

#[derive(Args, Debug)]
pub struct NewItemArgs {
    /// Name for the new item (a default name is used otherwise).
    #[arg(long, short)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// ID of the note or folder.
    pub id: String,
    /// The new name.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// ID of the note to move.
    pub file_id: String,
    /// ID of the destination folder.
    pub folder_id: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// ID of the note or folder.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// ID of the note to edit.
    pub file_id: String,

    /// New text of the note.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,

    /// Read the new text from this file.
    #[arg(long, conflicts_with = "content")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// ID of the note.
    pub file_id: String,

    /// Render the note's markup as HTML.
    #[arg(long, short)]
    pub preview: bool,
}

#[derive(Args, Debug)]
pub struct ExportNoteArgs {
    /// ID of the note.
    pub file_id: String,
    /// Destination file. Defaults to the note's name in the current directory.
    pub dest: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExportAllArgs {
    /// Directory to export into.
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Directory or file to import from.
    pub path: PathBuf,

    /// Skip the confirmation prompt.
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ExportDbArgs {
    /// Destination JSON file.
    pub path: PathBuf,
}
