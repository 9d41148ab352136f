use std::path::PathBuf;

use anyhow::{Context, Result};
use snotes_core::interchange;
use snotes_core::preview;
use snotes_core::store::{ItemId, ItemKind, StoreError};
use snotes_core::sync::Outcome;
use tracing::{debug, warn};

use crate::app::{confirm, render_tree, Notes};
use crate::cli::{
    DeleteArgs, EditArgs, ExportAllArgs, ExportDbArgs, ExportNoteArgs, ImportArgs, MoveArgs,
    NewItemArgs, RenameArgs, ShowArgs,
};

// --- Handler Functions ---

pub async fn handle_new_file(args: NewItemArgs, notes: &mut Notes) -> Result<()> {
    let id = mirrored(notes.session.create_note().await)?;
    name_new_item(notes, &id, ItemKind::Note, args.name).await?;
    println!("{}", id);
    Ok(())
}

pub async fn handle_new_folder(args: NewItemArgs, notes: &mut Notes) -> Result<()> {
    let id = mirrored(notes.session.create_folder().await)?;
    name_new_item(notes, &id, ItemKind::Folder, args.name).await?;
    println!("{}", id);
    Ok(())
}

pub async fn handle_rename(args: RenameArgs, notes: &mut Notes) -> Result<()> {
    let id = ItemId::from(args.id);
    let kind = notes.kind_of(&id)?;
    if applied(notes.session.rename(&id, kind, &args.name).await)? {
        println!("Renamed {} to '{}'", kind, args.name.trim());
    }
    Ok(())
}

pub async fn handle_move(args: MoveArgs, notes: &mut Notes) -> Result<()> {
    let note_id = ItemId::from(args.file_id);
    let folder_id = ItemId::from(args.folder_id);
    if applied(notes.session.move_note(&note_id, &folder_id).await)? {
        println!("Moved {} into {}", note_id, folder_id);
    }
    Ok(())
}

pub async fn handle_delete(args: DeleteArgs, notes: &mut Notes) -> Result<()> {
    let id = ItemId::from(args.id);
    let kind = notes.kind_of(&id)?;
    let moved = match kind {
        ItemKind::Folder => notes.session.read(|store| store.notes_in(&id).count()),
        ItemKind::Note => 0,
    };
    if applied(notes.session.delete(&id, kind).await)? {
        println!("Deleted {} {}", kind, id);
        if moved > 0 {
            println!("{} notes moved to the top level", moved);
        }
    }
    Ok(())
}

pub async fn handle_edit(args: EditArgs, notes: &mut Notes) -> Result<()> {
    let id = ItemId::from(args.file_id);
    let content = match (args.content, args.file) {
        (Some(content), _) => content,
        (None, Some(path)) => tokio::fs::read_to_string(&path).await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --content or --file is required"),
    };

    notes.session.open_note(&id).with_context(|| format!("Cannot edit {}", id))?;
    notes.session.edit(content);
    debug!(%id, "Edit staged; written on exit");
    Ok(())
}

pub async fn handle_save(notes: &mut Notes) -> Result<()> {
    let count = notes.session.save().await.context("Save failed")?;
    println!("Saved {} notes to {}", count, notes.config.notes_root.display());
    Ok(())
}

pub fn handle_list(notes: &Notes) -> Result<()> {
    let tree = notes.session.read(render_tree);
    if tree.is_empty() {
        println!("No notes yet.");
    } else {
        print!("{}", tree);
    }
    Ok(())
}

pub fn handle_show(args: ShowArgs, notes: &Notes) -> Result<()> {
    let note = notes.note(&ItemId::from(args.file_id))?;
    if args.preview {
        println!("{}", preview::render(&note.content));
    } else {
        print!("{}", note.content);
    }
    Ok(())
}

pub async fn handle_export_note(args: ExportNoteArgs, notes: &Notes) -> Result<()> {
    let note = notes.note(&ItemId::from(args.file_id))?;
    let dest = match args.dest {
        Some(dest) => dest,
        None => PathBuf::from(interchange::default_export_name(&note.name)),
    };
    interchange::export_note(&note.content, &dest).await
        .with_context(|| format!("Failed to export to {}", dest.display()))?;
    println!("Exported '{}' to {}", note.name, dest.display());
    Ok(())
}

pub async fn handle_export_all(args: ExportAllArgs, notes: &Notes) -> Result<()> {
    let snapshot = notes.session.snapshot();
    let count = interchange::export_all(&snapshot, &args.dir).await
        .with_context(|| format!("Failed to export to {}", args.dir.display()))?;
    println!("Exported {} notes to {}", count, args.dir.display());
    Ok(())
}

pub async fn handle_import_folder(args: ImportArgs, notes: &mut Notes) -> Result<()> {
    let found = interchange::scan_folder(&args.path).await
        .with_context(|| format!("Failed to scan {}", args.path.display()))?;
    if found.is_empty() {
        println!("No .txt or .snote files found in {}", args.path.display());
        return Ok(());
    }

    let question = format!("Import {} notes from {}?", found.len(), args.path.display());
    if !confirm(question, args.yes).await? {
        println!("Import cancelled.");
        return Ok(());
    }
    let count = mirrored(notes.session.merge_imported(found).await)?;
    println!("Imported {} notes", count);
    Ok(())
}

pub async fn handle_export_db(args: ExportDbArgs, notes: &Notes) -> Result<()> {
    let snapshot = notes.session.snapshot();
    interchange::export_database(&snapshot, &args.path).await
        .with_context(|| format!("Failed to export database to {}", args.path.display()))?;
    println!(
        "Exported {} folders and {} notes to {}",
        snapshot.folder_count(), snapshot.note_count(), args.path.display()
    );
    Ok(())
}

pub async fn handle_import_db(args: ImportArgs, notes: &mut Notes) -> Result<()> {
    let incoming = interchange::import_database(&args.path).await
        .with_context(|| format!("Failed to read database {}", args.path.display()))?;

    let question = format!(
        "Replace all {} current notes with {} notes from {}?",
        notes.session.read(|store| store.note_count()),
        incoming.note_count(),
        args.path.display(),
    );
    if !confirm(question, args.yes).await? {
        println!("Import cancelled.");
        return Ok(());
    }
    mirrored(notes.session.replace_store(incoming).await)?;
    println!("Database imported");
    Ok(())
}

pub async fn handle_disk(notes: &Notes) -> Result<()> {
    let listing = notes.mirror.list_notes().await
        .with_context(|| format!("Failed to list {}", notes.mirror.root().display()))?;
    println!("{}", notes.mirror.root().display());
    for folder in &listing.folders {
        println!("  {}/", folder);
    }
    for file in &listing.files {
        println!("  {}", file);
    }
    Ok(())
}

// --- Helpers ---

/// Unwraps a mutation whose disk write must have succeeded.
fn mirrored<T>(outcome: Outcome<T>) -> Result<T> {
    outcome.into_result()
        .context("Change kept in the local cache, but the notes directory could not be updated")
}

/// A rejected mutation changes nothing and is reported, not treated as a failure.
fn applied(result: std::result::Result<Outcome<()>, StoreError>) -> Result<bool> {
    match result {
        Ok(outcome) => mirrored(outcome).map(|()| true),
        Err(e) => {
            warn!("Ignoring rejected change: {}", e);
            println!("Nothing changed: {}", e);
            Ok(false)
        }
    }
}

async fn name_new_item(notes: &mut Notes, id: &ItemId, kind: ItemKind, name: Option<String>) -> Result<()> {
    if let Some(name) = name {
        applied(notes.session.rename(id, kind, &name).await)?;
    }
    Ok(())
}
